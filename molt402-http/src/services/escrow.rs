use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use super::{amount_value, execute, fetch};
use crate::transport::{ApiRequest, MoltbookTransport};
use crate::types::Escrow;

/// Escrow accounts under `/escrow`.
#[derive(Clone)]
pub struct MoltbookEscrow {
    transport: Arc<dyn MoltbookTransport>,
}

impl fmt::Debug for MoltbookEscrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoltbookEscrow").finish_non_exhaustive()
    }
}

impl MoltbookEscrow {
    /// Creates the service over a shared transport.
    #[must_use]
    pub fn new(transport: Arc<dyn MoltbookTransport>) -> Self {
        Self { transport }
    }

    /// Opens an escrow of `amount` from `payer` to `payee`, settled by `arbiter`.
    pub async fn create(
        &self,
        amount: Decimal,
        payer: &str,
        payee: &str,
        arbiter: &str,
    ) -> Option<Escrow> {
        let body = json!({
            "amount": amount_value(amount),
            "payer": payer,
            "payee": payee,
            "arbiter": arbiter,
        });
        fetch(self.transport.as_ref(), ApiRequest::post(["escrow"]).json(body)).await
    }

    /// Looks an escrow up by id.
    pub async fn get(&self, id: &str) -> Option<Escrow> {
        fetch(self.transport.as_ref(), ApiRequest::get(["escrow", id])).await
    }

    /// Releases the funds to the payee.
    pub async fn release(&self, id: &str, signature: &str) -> bool {
        let request = ApiRequest::post(["escrow", id, "release"]).json(json!({ "signature": signature }));
        execute(self.transport.as_ref(), request).await
    }

    /// Hands the escrow to the arbiter.
    pub async fn dispute(&self, id: &str, reason: &str) -> bool {
        let request = ApiRequest::post(["escrow", id, "dispute"]).json(json!({ "reason": reason }));
        execute(self.transport.as_ref(), request).await
    }

    /// Returns the funds to the payer.
    pub async fn refund(&self, id: &str) -> bool {
        execute(
            self.transport.as_ref(),
            ApiRequest::post(["escrow", id, "refund"]),
        )
        .await
    }
}
