//! Axum route handlers for the gateway.
//!
//! - `POST /webhooks/moltbook` verifies and dispatches moltbook webhooks
//! - `POST /payments` runs an x402 proof through the moltbook bridge
//! - `GET /health` reports liveness

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use molt402_http::constants::WEBHOOK_SIGNATURE_HEADER;
use molt402_http::{
    BridgeOutcome, MoltbookBridge, MoltbookWebhook, WebhookDispatcher, WebhookEvent,
    WebhookEventType,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::GatewayError;

/// Everything the handlers share.
#[derive(Debug)]
pub struct AppState {
    /// Signature verifier; `None` disables the webhook route.
    pub webhook: Option<MoltbookWebhook>,
    /// Handlers for verified events.
    pub dispatcher: WebhookDispatcher,
    /// x402 to moltbook bridge.
    pub bridge: MoltbookBridge,
}

/// Shared application state for the gateway.
pub type GatewayState = Arc<AppState>;

/// Body of `POST /payments`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    /// Amount to charge.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Receiving wallet.
    pub recipient: String,
}

/// Successful answer of `POST /payments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentAccepted {
    /// moltbook intent id.
    pub token: String,
    /// Whether the intent was confirmed.
    pub confirmed: bool,
}

/// `POST /webhooks/moltbook` — Verifies the signature, then dispatches the event.
///
/// # Errors
///
/// 401 on a missing or wrong signature, 400 on a malformed envelope,
/// 503 when no webhook secret is configured.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let webhook = state
        .webhook
        .as_ref()
        .ok_or(GatewayError::WebhooksDisabled)?;
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(GatewayError::MissingSignature)?;
    let event = webhook.parse_event(&body, signature)?;
    let handled = state.dispatcher.dispatch(&event).await;
    Ok(Json(json!({ "received": true, "handled": handled })))
}

/// `POST /payments` — Opens a moltbook intent against the request's x402 proof.
///
/// # Errors
///
/// 402 with `{"error": ...}` when the bridge rejects the payment.
pub async fn post_payment(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(body): Json<PaymentRequest>,
) -> Result<Json<PaymentAccepted>, GatewayError> {
    match state
        .bridge
        .process_payment(&headers, body.amount, &body.recipient)
        .await
    {
        BridgeOutcome::Accepted { token, confirmed } => Ok(Json(PaymentAccepted { token, confirmed })),
        BridgeOutcome::Rejected(reason) => Err(reason.into()),
    }
}

/// `GET /health` — Health check endpoint.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// A dispatcher that logs every known event type.
#[must_use]
pub fn logging_dispatcher() -> WebhookDispatcher {
    let mut dispatcher = WebhookDispatcher::new();
    for event_type in [
        WebhookEventType::PaymentSuccess,
        WebhookEventType::PaymentFailed,
        WebhookEventType::RefundProcessed,
    ] {
        dispatcher.on(event_type, |event: WebhookEvent| async move {
            tracing::info!(
                id = %event.id,
                event_type = %event.event_type,
                timestamp = %event.timestamp,
                "moltbook event"
            );
        });
    }
    dispatcher
}

/// Creates an Axum [`axum::Router`] with all gateway endpoints.
pub fn gateway_router(state: GatewayState) -> axum::Router {
    axum::Router::new()
        .route("/webhooks/moltbook", axum::routing::post(post_webhook))
        .route("/payments", axum::routing::post(post_payment))
        .route("/health", axum::routing::get(health))
        .with_state(state)
}
