//! Error types for the gateway routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use molt402_http::{RejectReason, WebhookError};

/// Errors returned by the gateway handlers.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The delivery has no signature header.
    #[error("missing webhook signature")]
    MissingSignature,

    /// Signature verification or envelope decoding failed.
    #[error("{0}")]
    Webhook(#[from] WebhookError),

    /// No webhook secret is configured.
    #[error("webhooks are not configured")]
    WebhooksDisabled,

    /// The bridge did not accept the payment.
    #[error("{0}")]
    PaymentRejected(#[from] RejectReason),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingSignature
            | Self::Webhook(WebhookError::InvalidSignature) => StatusCode::UNAUTHORIZED,
            Self::Webhook(WebhookError::Malformed(_)) => StatusCode::BAD_REQUEST,
            Self::Webhook(WebhookError::EmptySecret | WebhookError::InvalidSecret)
            | Self::WebhooksDisabled => StatusCode::SERVICE_UNAVAILABLE,
            Self::PaymentRejected(_) => StatusCode::PAYMENT_REQUIRED,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GatewayError::MissingSignature, StatusCode::UNAUTHORIZED),
            (
                GatewayError::Webhook(WebhookError::InvalidSignature),
                StatusCode::UNAUTHORIZED,
            ),
            (GatewayError::WebhooksDisabled, StatusCode::SERVICE_UNAVAILABLE),
            (
                GatewayError::PaymentRejected(RejectReason::MissingProof),
                StatusCode::PAYMENT_REQUIRED,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_malformed_is_bad_request() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let resp = GatewayError::from(WebhookError::from(source)).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
