//! Bridge between x402 proof headers and moltbook payment intents.
//!
//! A paying client sends its proof in the `x-402-proof` header. The bridge
//! strips identifying headers, decodes the proof, opens a moltbook intent for
//! the requested amount and hands the intent id back as an access token.
//! With `auto_confirm` the intent is confirmed with the proof's signature in
//! the same call.

use std::borrow::Cow;

use http::HeaderMap;
use molt402::{PaymentProof, PrivacyConfig, PrivacyShield};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::constants::PROOF_HEADER;
use crate::services::MoltbookPayments;

/// Bridge switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Strip identifying headers before reading the proof.
    pub enable_privacy: bool,
    /// Confirm the intent with the proof's signature right away.
    pub auto_confirm: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enable_privacy: true,
            auto_confirm: false,
        }
    }
}

/// Why a payment was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// No `x-402-proof` header.
    #[error("payment proof required")]
    MissingProof,
    /// The header is present but does not decode.
    #[error("payment proof is invalid")]
    InvalidProof,
    /// moltbook did not create an intent.
    #[error("payment intent could not be created")]
    IntentUnavailable,
}

/// Result of [`MoltbookBridge::process_payment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// The intent exists; `token` is its id.
    Accepted {
        /// Intent id, usable as an access token.
        token: String,
        /// Whether the intent was confirmed in this call.
        confirmed: bool,
    },
    /// Nothing was charged.
    Rejected(RejectReason),
}

impl BridgeOutcome {
    /// The token, if accepted.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Accepted { token, .. } => Some(token),
            Self::Rejected(_) => None,
        }
    }
}

/// Turns x402 proofs into moltbook payment intents.
#[derive(Debug, Clone)]
pub struct MoltbookBridge {
    config: BridgeConfig,
    shield: PrivacyShield,
    payments: MoltbookPayments,
}

impl MoltbookBridge {
    /// Creates a bridge with the default privacy shield.
    #[must_use]
    pub fn new(config: BridgeConfig, payments: MoltbookPayments) -> Self {
        Self::with_shield(config, PrivacyShield::new(PrivacyConfig::default()), payments)
    }

    /// Creates a bridge with a custom privacy shield.
    #[must_use]
    pub const fn with_shield(
        config: BridgeConfig,
        shield: PrivacyShield,
        payments: MoltbookPayments,
    ) -> Self {
        Self {
            config,
            shield,
            payments,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Charges `amount` to `recipient` against the proof carried in `headers`.
    ///
    /// A failed auto-confirmation still accepts the payment with
    /// `confirmed: false`; the intent can be confirmed later.
    pub async fn process_payment(
        &self,
        headers: &HeaderMap,
        amount: Decimal,
        recipient: &str,
    ) -> BridgeOutcome {
        let headers = if self.config.enable_privacy {
            Cow::Owned(self.shield.sanitize(headers))
        } else {
            Cow::Borrowed(headers)
        };

        let Some(raw) = headers.get(PROOF_HEADER) else {
            return BridgeOutcome::Rejected(RejectReason::MissingProof);
        };
        let proof = match raw.to_str().ok().map(PaymentProof::from_header) {
            Some(Ok(proof)) => proof,
            _ => {
                #[cfg(feature = "telemetry")]
                tracing::debug!("rejected undecodable payment proof");
                return BridgeOutcome::Rejected(RejectReason::InvalidProof);
            }
        };

        let Some(intent) = self.payments.create_intent(amount, recipient, None).await else {
            return BridgeOutcome::Rejected(RejectReason::IntentUnavailable);
        };

        let confirmed = if self.config.auto_confirm {
            self.payments
                .confirm_payment(&intent.id, &proof.signature)
                .await
        } else {
            false
        };

        #[cfg(feature = "telemetry")]
        tracing::info!(intent = %intent.id, confirmed, "payment intent opened");

        BridgeOutcome::Accepted {
            token: intent.id,
            confirmed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use crate::transport::ApiResponse;
    use http::{HeaderValue, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    fn proof_headers(signature: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = PaymentProof::new(signature).to_header().unwrap();
        headers.insert(PROOF_HEADER, HeaderValue::from_str(&value).unwrap());
        headers.insert("user-agent", HeaderValue::from_static("agent/1"));
        headers
    }

    fn intent_json() -> serde_json::Value {
        json!({
            "id": "pi_7",
            "amount": 1,
            "currency": "SOL",
            "recipient": "shop",
            "status": "pending"
        })
    }

    fn bridge(mock: &Arc<MockTransport>, config: BridgeConfig) -> MoltbookBridge {
        MoltbookBridge::new(config, MoltbookPayments::new(mock.clone()))
    }

    #[test]
    fn test_config_defaults_and_partial_deserialize() {
        assert_eq!(
            BridgeConfig::default(),
            BridgeConfig {
                enable_privacy: true,
                auto_confirm: false
            }
        );
        let config: BridgeConfig = serde_json::from_value(json!({ "auto_confirm": true })).unwrap();
        assert!(config.enable_privacy);
        assert!(config.auto_confirm);
    }

    #[tokio::test]
    async fn test_missing_proof_rejected_without_remote_call() {
        let mock = MockTransport::new();
        let outcome = bridge(&mock, BridgeConfig::default())
            .process_payment(&HeaderMap::new(), Decimal::ONE, "shop")
            .await;
        assert_eq!(outcome, BridgeOutcome::Rejected(RejectReason::MissingProof));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_proof_rejected() {
        let mock = MockTransport::new();
        let mut headers = HeaderMap::new();
        headers.insert(PROOF_HEADER, HeaderValue::from_static("not-base64!"));
        let outcome = bridge(&mock, BridgeConfig::default())
            .process_payment(&headers, Decimal::ONE, "shop")
            .await;
        assert_eq!(outcome, BridgeOutcome::Rejected(RejectReason::InvalidProof));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_intent_failure_rejected() {
        let mock = MockTransport::new();
        mock.push_status(StatusCode::BAD_GATEWAY);
        let outcome = bridge(&mock, BridgeConfig::default())
            .process_payment(&proof_headers("sig"), Decimal::ONE, "shop")
            .await;
        assert_eq!(
            outcome,
            BridgeOutcome::Rejected(RejectReason::IntentUnavailable)
        );
    }

    #[tokio::test]
    async fn test_accepts_without_confirming_by_default() {
        let mock = MockTransport::new();
        mock.push_ok(intent_json());
        let outcome = bridge(&mock, BridgeConfig::default())
            .process_payment(&proof_headers("sig"), Decimal::ONE, "shop")
            .await;
        assert_eq!(
            outcome,
            BridgeOutcome::Accepted {
                token: "pi_7".to_owned(),
                confirmed: false
            }
        );
        assert_eq!(outcome.token(), Some("pi_7"));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path(), "/payments/intent");
        assert_eq!(requests[0].body.as_ref().unwrap()["recipient"], json!("shop"));
    }

    #[tokio::test]
    async fn test_auto_confirm_uses_proof_signature() {
        let mock = MockTransport::new();
        mock.push_ok(intent_json()).push(Ok(ApiResponse::ok_empty()));
        let config = BridgeConfig {
            auto_confirm: true,
            ..BridgeConfig::default()
        };
        let outcome = bridge(&mock, config)
            .process_payment(&proof_headers("sig-xyz"), Decimal::ONE, "shop")
            .await;
        assert_eq!(
            outcome,
            BridgeOutcome::Accepted {
                token: "pi_7".to_owned(),
                confirmed: true
            }
        );
        assert_eq!(
            mock.last_request().body,
            Some(json!({ "intentId": "pi_7", "signature": "sig-xyz" }))
        );
    }

    #[tokio::test]
    async fn test_failed_confirmation_still_accepts() {
        let mock = MockTransport::new();
        mock.push_ok(intent_json())
            .push(Ok(ApiResponse::failure("bad signature")));
        let config = BridgeConfig {
            auto_confirm: true,
            ..BridgeConfig::default()
        };
        let outcome = bridge(&mock, config)
            .process_payment(&proof_headers("sig"), Decimal::ONE, "shop")
            .await;
        assert_eq!(
            outcome,
            BridgeOutcome::Accepted {
                token: "pi_7".to_owned(),
                confirmed: false
            }
        );
    }

    #[tokio::test]
    async fn test_privacy_disabled_still_reads_proof() {
        let mock = MockTransport::new();
        mock.push_ok(intent_json());
        let config = BridgeConfig {
            enable_privacy: false,
            ..BridgeConfig::default()
        };
        let outcome = bridge(&mock, config)
            .process_payment(&proof_headers("sig"), Decimal::ONE, "shop")
            .await;
        assert_eq!(outcome.token(), Some("pi_7"));
    }
}
