use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use super::{amount_value, execute, fetch, fetch_list};
use crate::transport::{ApiRequest, MoltbookTransport};
use crate::types::{BillingInterval, Subscription};

/// Recurring billing under `/subscriptions`.
#[derive(Clone)]
pub struct MoltbookSubscriptions {
    transport: Arc<dyn MoltbookTransport>,
}

impl fmt::Debug for MoltbookSubscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoltbookSubscriptions").finish_non_exhaustive()
    }
}

impl MoltbookSubscriptions {
    /// Creates the service over a shared transport.
    #[must_use]
    pub fn new(transport: Arc<dyn MoltbookTransport>) -> Self {
        Self { transport }
    }

    /// Subscribes `wallet` to `plan_id`.
    pub async fn create(
        &self,
        wallet: &str,
        plan_id: &str,
        amount: Decimal,
        interval: BillingInterval,
    ) -> Option<Subscription> {
        let body = json!({
            "wallet": wallet,
            "planId": plan_id,
            "amount": amount_value(amount),
            "interval": interval,
        });
        fetch(
            self.transport.as_ref(),
            ApiRequest::post(["subscriptions"]).json(body),
        )
        .await
    }

    /// Ends a subscription.
    pub async fn cancel(&self, id: &str) -> bool {
        self.transition(id, "cancel").await
    }

    /// Suspends billing.
    pub async fn pause(&self, id: &str) -> bool {
        self.transition(id, "pause").await
    }

    /// Resumes a paused subscription.
    pub async fn resume(&self, id: &str) -> bool {
        self.transition(id, "resume").await
    }

    /// All subscriptions of `wallet`.
    pub async fn list(&self, wallet: &str) -> Vec<Subscription> {
        fetch_list(
            self.transport.as_ref(),
            ApiRequest::get(["subscriptions"]).query("wallet", wallet),
        )
        .await
    }

    async fn transition(&self, id: &str, action: &str) -> bool {
        execute(
            self.transport.as_ref(),
            ApiRequest::post(["subscriptions", id, action]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use crate::transport::ApiResponse;
    use crate::types::SubscriptionStatus;

    fn subscription_json(status: &str) -> serde_json::Value {
        json!({
            "id": "sub_1",
            "wallet": "erin",
            "planId": "pro",
            "amount": 20,
            "interval": "weekly",
            "nextBilling": 1_700_000_000_000_u64,
            "status": status
        })
    }

    #[tokio::test]
    async fn test_create_sends_camel_case_body() {
        let mock = MockTransport::new();
        mock.push_ok(subscription_json("active"));
        let subs = MoltbookSubscriptions::new(mock.clone());

        let sub = subs
            .create("erin", "pro", Decimal::from(20), BillingInterval::Weekly)
            .await
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(
            mock.last_request().body,
            Some(json!({
                "wallet": "erin",
                "planId": "pro",
                "amount": 20.0,
                "interval": "weekly"
            }))
        );
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let mock = MockTransport::new();
        mock.push(Ok(ApiResponse::ok_empty()))
            .push(Ok(ApiResponse::ok_empty()))
            .push(Ok(ApiResponse::failure("already cancelled")));
        let subs = MoltbookSubscriptions::new(mock.clone());

        assert!(subs.pause("sub_1").await);
        assert!(subs.resume("sub_1").await);
        assert!(!subs.cancel("sub_1").await);

        let paths: Vec<String> = mock.requests().iter().map(ApiRequest::path).collect();
        assert_eq!(
            paths,
            [
                "/subscriptions/sub_1/pause",
                "/subscriptions/sub_1/resume",
                "/subscriptions/sub_1/cancel"
            ]
        );
    }

    #[tokio::test]
    async fn test_list_by_wallet() {
        let mock = MockTransport::new();
        mock.push_ok(json!([subscription_json("paused")]));
        let subs = MoltbookSubscriptions::new(mock.clone());

        let list = subs.list("erin").await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, SubscriptionStatus::Paused);
        assert_eq!(
            mock.last_request().query,
            vec![("wallet".to_owned(), "erin".to_owned())]
        );
    }
}
