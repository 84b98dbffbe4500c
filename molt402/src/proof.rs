//! The `x-402-proof` payment header.
//!
//! A client that has paid for a resource attaches a proof to its request.
//! The header value is Base64-encoded JSON:
//!
//! ```json
//! { "signature": "5Kd3...", "payer": "9xQe...", "nonce": "42" }
//! ```
//!
//! Only `signature` is required; it is forwarded to moltbook when a payment
//! intent is confirmed.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ProofError;

/// Name of the request header carrying a [`PaymentProof`].
pub const PROOF_HEADER: &str = "x-402-proof";

/// Decoded contents of an `x-402-proof` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    /// Payer's signature over the payment.
    pub signature: String,
    /// Paying wallet, if disclosed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    /// Client-chosen nonce, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl PaymentProof {
    /// Creates a proof carrying only a signature.
    #[must_use]
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            payer: None,
            nonce: None,
        }
    }

    /// Decodes a header value.
    ///
    /// # Errors
    ///
    /// Returns [`ProofError`] on Base64 or JSON decode failure, or when the
    /// signature is empty.
    pub fn from_header(header_value: &str) -> Result<Self, ProofError> {
        let bytes = BASE64_STANDARD.decode(header_value.trim())?;
        let proof: Self = serde_json::from_slice(&bytes)?;
        if proof.signature.trim().is_empty() {
            return Err(ProofError::MissingSignature);
        }
        Ok(proof)
    }

    /// Encodes the proof as a header value.
    ///
    /// # Errors
    ///
    /// Returns [`ProofError::Json`] if serialization fails.
    pub fn to_header(&self) -> Result<String, ProofError> {
        let json = serde_json::to_vec(self)?;
        Ok(BASE64_STANDARD.encode(json))
    }
}
