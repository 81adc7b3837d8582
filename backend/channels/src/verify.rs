//! Inbound webhook authentication for the Feishu event API.
//!
//! Two independent checks, each active only when configured:
//!   encrypt_key: `X-Lark-Signature` must equal
//!     hex(sha256(timestamp + nonce + encrypt_key + body))
//!   verification_token: the event's token must match
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use tracing::warn;

use vaultbot_core::EventEnvelope;

pub const SIGNATURE_HEADER: &str = "x-lark-signature";
pub const TIMESTAMP_HEADER: &str = "x-lark-request-timestamp";
pub const NONCE_HEADER: &str = "x-lark-request-nonce";

/// Why a webhook request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingSignature,
    BadSignature,
    BadToken,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MissingSignature => "missing signature headers",
            Self::BadSignature => "invalid signature",
            Self::BadToken => "invalid verification token",
        };
        write!(f, "{s}")
    }
}

pub fn compute_signature(timestamp: &str, nonce: &str, encrypt_key: &str, body: &[u8]) -> String {
    hex::encode(signature_digest(timestamp, nonce, encrypt_key, body))
}

fn signature_digest(timestamp: &str, nonce: &str, encrypt_key: &str, body: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.update(encrypt_key.as_bytes());
    hasher.update(body);
    hasher.finalize().to_vec()
}

/// Byte comparison whose running time depends only on the length.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// Check the `X-Lark-Signature` header against `body`.
pub fn verify_signature(headers: &HeaderMap, body: &[u8], encrypt_key: &str) -> Result<(), Rejection> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let (Some(signature), Some(timestamp), Some(nonce)) = (
        header(SIGNATURE_HEADER),
        header(TIMESTAMP_HEADER),
        header(NONCE_HEADER),
    ) else {
        return Err(Rejection::MissingSignature);
    };

    let expected = signature_digest(timestamp, nonce, encrypt_key, body);
    let received = hex::decode(signature.trim()).unwrap_or_default();
    if constant_time_eq(&expected, &received) {
        Ok(())
    } else {
        warn!("[Feishu] Signature mismatch");
        Err(Rejection::BadSignature)
    }
}

pub fn verify_token(envelope: &EventEnvelope, expected: &str) -> Result<(), Rejection> {
    match envelope.verification_token() {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => Err(Rejection::BadToken),
    }
}

/// Run every configured check. Unconfigured checks pass.
pub fn authenticate(
    headers: &HeaderMap,
    body: &[u8],
    envelope: &EventEnvelope,
    encrypt_key: Option<&str>,
    verification_token: Option<&str>,
) -> Result<(), Rejection> {
    if let Some(key) = encrypt_key.filter(|k| !k.is_empty()) {
        verify_signature(headers, body, key)?;
    }
    if let Some(token) = verification_token.filter(|t| !t.is_empty()) {
        verify_token(envelope, token)?;
    }
    Ok(())
}
