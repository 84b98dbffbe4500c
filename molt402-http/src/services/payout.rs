use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use super::{amount_value, execute, fetch, fetch_list};
use crate::transport::{ApiRequest, MoltbookTransport};
use crate::types::{Payout, PayoutStatus};

/// Outgoing transfers under `/payouts`.
#[derive(Clone)]
pub struct MoltbookPayouts {
    transport: Arc<dyn MoltbookTransport>,
}

impl fmt::Debug for MoltbookPayouts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoltbookPayouts").finish_non_exhaustive()
    }
}

impl MoltbookPayouts {
    /// Creates the service over a shared transport.
    #[must_use]
    pub fn new(transport: Arc<dyn MoltbookTransport>) -> Self {
        Self { transport }
    }

    /// Schedules a payout of `amount` to `recipient`.
    pub async fn create(&self, amount: Decimal, recipient: &str) -> Option<Payout> {
        let body = json!({ "amount": amount_value(amount), "recipient": recipient });
        fetch(self.transport.as_ref(), ApiRequest::post(["payouts"]).json(body)).await
    }

    /// Current state of a payout.
    pub async fn get_status(&self, id: &str) -> Option<Payout> {
        fetch(self.transport.as_ref(), ApiRequest::get(["payouts", id])).await
    }

    /// Payouts in the given state.
    pub async fn list(&self, status: PayoutStatus) -> Vec<Payout> {
        fetch_list(
            self.transport.as_ref(),
            ApiRequest::get(["payouts"]).query("status", status.as_str()),
        )
        .await
    }

    /// Payouts that have not started processing.
    pub async fn list_pending(&self) -> Vec<Payout> {
        self.list(PayoutStatus::Pending).await
    }

    /// Cancels a payout that has not been sent yet.
    pub async fn cancel(&self, id: &str) -> bool {
        execute(
            self.transport.as_ref(),
            ApiRequest::post(["payouts", id, "cancel"]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use crate::transport::ApiResponse;
    use http::StatusCode;

    fn payout_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "amount": 1.5,
            "recipient": "dave",
            "status": status,
            "createdAt": 100,
            "completedAt": 200
        })
    }

    #[tokio::test]
    async fn test_create_and_get_status() {
        let mock = MockTransport::new();
        mock.push_ok(payout_json("po_1", "pending"))
            .push_ok(payout_json("po_1", "completed"));
        let payouts = MoltbookPayouts::new(mock.clone());

        let created = payouts.create("1.5".parse().unwrap(), "dave").await.unwrap();
        assert_eq!(created.status, PayoutStatus::Pending);
        assert_eq!(
            mock.last_request().body,
            Some(json!({ "amount": 1.5, "recipient": "dave" }))
        );

        let status = payouts.get_status("po_1").await.unwrap();
        assert_eq!(status.status, PayoutStatus::Completed);
        assert_eq!(status.completed_at.map(|t| t.as_millis()), Some(200));
        assert_eq!(mock.last_request().path(), "/payouts/po_1");
    }

    #[tokio::test]
    async fn test_list_pending_uses_status_query() {
        let mock = MockTransport::new();
        mock.push_ok(json!([payout_json("po_1", "pending"), payout_json("po_2", "pending")]));
        let payouts = MoltbookPayouts::new(mock.clone());

        let pending = payouts.list_pending().await;
        assert_eq!(pending.len(), 2);
        let req = mock.last_request();
        assert_eq!(req.path(), "/payouts");
        assert_eq!(req.query, vec![("status".to_owned(), "pending".to_owned())]);
    }

    #[tokio::test]
    async fn test_list_failure_is_empty() {
        let mock = MockTransport::new();
        mock.push_status(StatusCode::SERVICE_UNAVAILABLE)
            .push(Ok(ApiResponse::ok_empty()));
        let payouts = MoltbookPayouts::new(mock.clone());
        assert!(payouts.list_pending().await.is_empty());
        assert!(payouts.list(PayoutStatus::Failed).await.is_empty());
    }

    #[tokio::test]
    async fn test_cancel() {
        let mock = MockTransport::new();
        mock.push(Ok(ApiResponse::ok_empty()));
        let payouts = MoltbookPayouts::new(mock.clone());
        assert!(payouts.cancel("po_1").await);
        assert_eq!(mock.last_request().path(), "/payouts/po_1/cancel");
    }
}
