//! Chat platform integration: the Feishu REST client and inbound webhook
//! authentication.

pub mod feishu;
pub mod verify;

pub use feishu::FeishuClient;
pub use verify::{authenticate, compute_signature, Rejection};
