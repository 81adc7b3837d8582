//! vaultbot gateway: the message pipeline and the webhook HTTP server.

pub mod router;
pub mod server;

#[cfg(test)]
mod test_support;

pub use router::{system_clock, Clock, MessageRouter, Outcome, RouterDeps};
pub use server::{build_router, start_server, GatewayState, WebhookAuth};
