//! Webhook HTTP server.
//!
//! `POST <webhook_path>` receives platform events; `GET /api/health` is a
//! liveness probe. A failure while handling an event becomes a 500 with a
//! JSON error body; it never takes the process down.

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use vaultbot_channels::authenticate;
use vaultbot_core::{BotError, EventEnvelope};

use crate::router::MessageRouter;

/// Inbound authentication settings. Each check runs only when set.
#[derive(Debug, Clone, Default)]
pub struct WebhookAuth {
    pub encrypt_key: Option<String>,
    pub verification_token: Option<String>,
}

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub router: Arc<MessageRouter>,
    pub auth: WebhookAuth,
}

pub fn build_router(state: GatewayState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(handle_webhook))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, webhook_path: &str, state: GatewayState) -> Result<()> {
    let app = build_router(state, webhook_path);

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, webhook_path, "Webhook server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "vaultbot",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => return internal_error(&BotError::Parse(format!("webhook body: {e}"))),
    };

    if let Err(rejection) = authenticate(
        &headers,
        &body,
        &envelope,
        state.auth.encrypt_key.as_deref(),
        state.auth.verification_token.as_deref(),
    ) {
        warn!(%rejection, "Rejecting webhook request");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": rejection.to_string() })),
        )
            .into_response();
    }

    if envelope.is_url_verification() {
        info!("Answering URL verification challenge");
        let challenge = envelope.challenge.unwrap_or_default();
        return Json(json!({ "challenge": challenge })).into_response();
    }

    match state.router.handle_event(&envelope).await {
        Ok(outcome) => {
            info!(?outcome, "Event handled");
            Json(json!({ "code": 0, "msg": "success" })).into_response()
        }
        Err(e) => internal_error(&e),
    }
}

fn internal_error(err: &BotError) -> Response {
    error!(error = %err, kind = %err.kind(), "Webhook handling failed");
    let mut trace = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        trace.push(cause.to_string());
        source = cause.source();
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": err.to_string(),
            "error_trace": trace.join("\ncaused by: "),
            "error_type": err.kind().to_string(),
        })),
    )
        .into_response()
}
