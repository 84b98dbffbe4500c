//! Error types for the core crate.

use rust_decimal::Decimal;

/// Errors produced while decoding an `x-402-proof` header.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// The header value is not valid Base64.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not a JSON proof object.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The proof carries an empty signature.
    #[error("proof signature is empty")]
    MissingSignature,
}

/// Reasons an agent is not allowed to spend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BudgetError {
    /// The price would push total spend past the configured limit.
    #[error("price {price} exceeds remaining budget {remaining}")]
    Exceeded {
        /// The requested price.
        price: Decimal,
        /// Budget left before the request.
        remaining: Decimal,
    },

    /// The target domain is not in the allow-list.
    #[error("domain '{0}' is not allowed")]
    DomainNotAllowed(String),

    /// Negative prices are never accepted.
    #[error("price must not be negative: {0}")]
    NegativePrice(Decimal),
}
