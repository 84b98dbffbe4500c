//! Incoming moltbook webhooks.
//!
//! moltbook signs every delivery with HMAC-SHA256 over the raw request body
//! using the shared webhook secret, and sends the lowercase hex digest in
//! the [`WEBHOOK_SIGNATURE_HEADER`](crate::constants::WEBHOOK_SIGNATURE_HEADER)
//! header. [`MoltbookWebhook`] checks that signature before the body is
//! parsed; [`WebhookDispatcher`] routes verified events to the handlers
//! registered for their type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use molt402::UnixMillis;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::WebhookError;
use crate::transport::BoxFuture;

type HmacSha256 = Hmac<Sha256>;

/// Verifies webhook signatures against a shared secret.
#[derive(Clone)]
pub struct MoltbookWebhook {
    mac: HmacSha256,
}

impl fmt::Debug for MoltbookWebhook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoltbookWebhook")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl MoltbookWebhook {
    /// Creates a verifier for `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::EmptySecret`] if the secret is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, WebhookError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(WebhookError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| WebhookError::InvalidSecret)?;
        Ok(Self { mac })
    }

    /// Lowercase hex HMAC-SHA256 of `payload`.
    #[must_use]
    pub fn sign(&self, payload: impl AsRef<[u8]>) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_ref());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Checks `signature` against the HMAC of `payload` in constant time.
    ///
    /// The comparison is on the hex text, so an uppercase digest does not match.
    #[must_use]
    pub fn verify_signature(&self, payload: impl AsRef<[u8]>, signature: &str) -> bool {
        let expected = self.sign(payload);
        let provided = signature.as_bytes();
        if provided.len() != expected.len() {
            return false;
        }
        expected.as_bytes().ct_eq(provided).into()
    }

    /// Verifies `body` and decodes it as a [`WebhookEvent`].
    ///
    /// # Errors
    ///
    /// [`WebhookError::InvalidSignature`] if the signature does not match,
    /// [`WebhookError::Malformed`] if the body is not an event envelope.
    pub fn parse_event(
        &self,
        body: impl AsRef<[u8]>,
        signature: &str,
    ) -> Result<WebhookEvent, WebhookError> {
        let body = body.as_ref();
        if !self.verify_signature(body, signature) {
            #[cfg(feature = "telemetry")]
            tracing::warn!("rejected webhook with invalid signature");
            return Err(WebhookError::InvalidSignature);
        }
        let event: WebhookEvent = serde_json::from_slice(body)?;
        Ok(event)
    }
}

/// Kind of a [`WebhookEvent`].
///
/// Types this crate does not know are kept as [`WebhookEventType::Unknown`]
/// so the envelope still parses; they are never dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WebhookEventType {
    /// `payment.success`
    PaymentSuccess,
    /// `payment.failed`
    PaymentFailed,
    /// `refund.processed`
    RefundProcessed,
    /// Anything else.
    Unknown(String),
}

impl WebhookEventType {
    /// Wire form, e.g. `payment.success`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PaymentSuccess => "payment.success",
            Self::PaymentFailed => "payment.failed",
            Self::RefundProcessed => "refund.processed",
            Self::Unknown(other) => other,
        }
    }

    /// Whether this is one of the known event types.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for WebhookEventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "payment.success" => Self::PaymentSuccess,
            "payment.failed" => Self::PaymentFailed,
            "refund.processed" => Self::RefundProcessed,
            _ => Self::Unknown(value),
        }
    }
}

impl From<&str> for WebhookEventType {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<WebhookEventType> for String {
    fn from(value: WebhookEventType) -> Self {
        match value {
            WebhookEventType::Unknown(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Delivery id.
    pub id: String,
    /// Event kind.
    #[serde(rename = "type")]
    pub event_type: WebhookEventType,
    /// Event payload; its shape depends on the type.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// When moltbook emitted the event.
    pub timestamp: UnixMillis,
    /// Signature echoed inside the envelope, if any. Not used for verification.
    #[serde(default)]
    pub signature: String,
}

/// Reacts to verified webhook events.
pub trait WebhookHandler: Send + Sync {
    /// Handles one event.
    fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, ()>;
}

/// Adapts an async closure taking an owned event.
struct FnHandler<F>(F);

impl<F, Fut> WebhookHandler for FnHandler<F>
where
    F: Fn(WebhookEvent) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, ()> {
        Box::pin((self.0)(event.clone()))
    }
}

/// Routes events to the handlers registered for their type.
#[derive(Clone, Default)]
pub struct WebhookDispatcher {
    handlers: HashMap<WebhookEventType, Vec<Arc<dyn WebhookHandler>>>,
}

impl fmt::Debug for WebhookDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (event_type, handlers) in &self.handlers {
            map.entry(&event_type.as_str(), &handlers.len());
        }
        map.finish()
    }
}

impl WebhookDispatcher {
    /// An empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handler` for `event_type`. Handlers run in registration order.
    pub fn register<H>(&mut self, event_type: WebhookEventType, handler: H) -> &mut Self
    where
        H: WebhookHandler + 'static,
    {
        self.handlers
            .entry(event_type)
            .or_default()
            .push(Arc::new(handler));
        self
    }

    /// Adds an async closure for `event_type`.
    pub fn on<F, Fut>(&mut self, event_type: WebhookEventType, handler: F) -> &mut Self
    where
        F: Fn(WebhookEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(event_type, FnHandler(handler))
    }

    /// Number of handlers registered for `event_type`.
    #[must_use]
    pub fn handler_count(&self, event_type: &WebhookEventType) -> usize {
        self.handlers.get(event_type).map_or(0, Vec::len)
    }

    /// Runs every handler registered for the event's type, in order.
    ///
    /// Returns how many handlers ran. Unknown types are ignored.
    pub async fn dispatch(&self, event: &WebhookEvent) -> usize {
        if !event.event_type.is_known() {
            #[cfg(feature = "telemetry")]
            tracing::debug!(event_type = %event.event_type, id = %event.id, "ignoring unknown webhook event");
            return 0;
        }
        let Some(handlers) = self.handlers.get(&event.event_type) else {
            return 0;
        };
        for handler in handlers {
            handler.handle(event).await;
        }
        #[cfg(feature = "telemetry")]
        tracing::debug!(event_type = %event.event_type, id = %event.id, handlers = handlers.len(), "dispatched webhook event");
        handlers.len()
    }
}
