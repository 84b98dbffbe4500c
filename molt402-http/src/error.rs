//! Error types for the moltbook transport and webhook verification.

use http::StatusCode;

/// Errors that can occur while talking to the moltbook API.
#[derive(Debug, thiserror::Error)]
pub enum MoltbookClientError {
    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("base URL cannot be a base: {0}")]
    InvalidBaseUrl(String),
    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Request description, e.g. `GET /payouts`.
        context: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// JSON deserialization error.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Request description.
        context: String,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// Unexpected HTTP status code.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Request description.
        context: String,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// Failed to read response body.
    #[error("Failed to read response body: {context}: {source}")]
    ResponseBodyRead {
        /// Request description.
        context: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

/// Errors produced while verifying or decoding a webhook delivery.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The shared secret is empty.
    #[error("webhook secret must not be empty")]
    EmptySecret,
    /// The secret was rejected by the HMAC implementation.
    #[error("invalid webhook secret")]
    InvalidSecret,
    /// The signature does not match the body.
    #[error("webhook signature mismatch")]
    InvalidSignature,
    /// The body is signed correctly but is not an event envelope.
    #[error("malformed webhook event: {0}")]
    Malformed(#[from] serde_json::Error),
}
