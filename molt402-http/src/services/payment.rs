use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use super::{amount_value, execute, fetch};
use crate::constants::DEFAULT_CURRENCY;
use crate::transport::{ApiRequest, MoltbookTransport};
use crate::types::PaymentIntent;

/// Payment intents: `/payments/intent` and `/payments/confirm`.
#[derive(Clone)]
pub struct MoltbookPayments {
    transport: Arc<dyn MoltbookTransport>,
}

impl fmt::Debug for MoltbookPayments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoltbookPayments").finish_non_exhaustive()
    }
}

impl MoltbookPayments {
    /// Creates the service over a shared transport.
    #[must_use]
    pub fn new(transport: Arc<dyn MoltbookTransport>) -> Self {
        Self { transport }
    }

    /// Creates an intent to pay `amount` to `recipient`.
    ///
    /// `currency` defaults to [`DEFAULT_CURRENCY`].
    pub async fn create_intent(
        &self,
        amount: Decimal,
        recipient: &str,
        currency: Option<&str>,
    ) -> Option<PaymentIntent> {
        let body = json!({
            "amount": amount_value(amount),
            "recipient": recipient,
            "currency": currency.unwrap_or(DEFAULT_CURRENCY),
        });
        fetch(
            self.transport.as_ref(),
            ApiRequest::post(["payments", "intent"]).json(body),
        )
        .await
    }

    /// Looks an intent up by id.
    pub async fn get_intent(&self, id: &str) -> Option<PaymentIntent> {
        fetch(
            self.transport.as_ref(),
            ApiRequest::get(["payments", "intent", id]),
        )
        .await
    }

    /// Confirms an intent with the payer's signature.
    pub async fn confirm_payment(&self, intent_id: &str, signature: &str) -> bool {
        let body = json!({ "intentId": intent_id, "signature": signature });
        execute(
            self.transport.as_ref(),
            ApiRequest::post(["payments", "confirm"]).json(body),
        )
        .await
    }
}
