//! Shapes of the entities moltbook returns.
//!
//! Their canonical state lives in moltbook; these types only mirror the
//! JSON. Amounts travel as JSON numbers and are read into [`Decimal`].

use molt402::UnixMillis;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a [`PaymentIntent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
    /// Waiting for the payer.
    Pending,
    /// Confirmed on chain.
    Completed,
    /// Abandoned or rejected.
    Failed,
}

/// A request to pay `amount` of `currency` to `recipient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Intent id.
    pub id: String,
    /// Amount in `currency` units.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Currency symbol, e.g. `SOL`.
    pub currency: String,
    /// Receiving wallet.
    pub recipient: String,
    /// Current status.
    pub status: IntentStatus,
}

/// Lifecycle of an [`Escrow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscrowStatus {
    /// Funds are held.
    Funded,
    /// Funds went to the payee.
    Released,
    /// The arbiter has to decide.
    Disputed,
    /// Funds went back to the payer.
    Refunded,
}

/// Funds held by moltbook until released, disputed or refunded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Escrow {
    /// Escrow id.
    pub id: String,
    /// Held amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Funding wallet.
    pub payer: String,
    /// Wallet paid on release.
    pub payee: String,
    /// Wallet that settles disputes.
    pub arbiter: String,
    /// Current status.
    pub status: EscrowStatus,
    /// Creation time.
    pub created_at: UnixMillis,
}

/// Lifecycle of a [`Payout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    /// Queued.
    Pending,
    /// Being sent.
    Processing,
    /// Delivered.
    Completed,
    /// Not delivered.
    Failed,
}

impl PayoutStatus {
    /// Wire form, as used in the `status` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// An outgoing transfer to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    /// Payout id.
    pub id: String,
    /// Amount sent.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Receiving wallet.
    pub recipient: String,
    /// Current status.
    pub status: PayoutStatus,
    /// Creation time.
    pub created_at: UnixMillis,
    /// Set once the payout reached a final state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<UnixMillis>,
}

/// How often a [`Subscription`] bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    /// Every day.
    Daily,
    /// Every week.
    Weekly,
    /// Every month.
    Monthly,
}

/// Lifecycle of a [`Subscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Billing.
    Active,
    /// Temporarily not billing.
    Paused,
    /// Terminated.
    Cancelled,
}

/// Recurring billing of a wallet against a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Subscription id.
    pub id: String,
    /// Billed wallet.
    pub wallet: String,
    /// Plan identifier.
    pub plan_id: String,
    /// Amount per interval.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Billing frequency.
    pub interval: BillingInterval,
    /// Next charge time.
    pub next_billing: UnixMillis,
    /// Current status.
    pub status: SubscriptionStatus,
}

/// Window covered by an [`AnalyticsReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// Last 24 hours.
    Day,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
}

impl ReportPeriod {
    /// Wire form, as used in the `period` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of [`AnalyticsReport::top_recipients`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopRecipient {
    /// Receiving wallet.
    pub wallet: String,
    /// Volume received in the period.
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
}

/// Volume statistics of a wallet over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    /// Period label as returned by moltbook.
    pub period: String,
    /// Sum of all transactions.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_volume: Decimal,
    /// Number of transactions.
    pub transaction_count: u64,
    /// Mean transaction amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub average_amount: Decimal,
    /// Largest recipients by volume.
    #[serde(default)]
    pub top_recipients: Vec<TopRecipient>,
}

/// Revenue of a wallet over rolling windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueMetrics {
    /// Last day.
    #[serde(with = "rust_decimal::serde::float")]
    pub daily: Decimal,
    /// Last week.
    #[serde(with = "rust_decimal::serde::float")]
    pub weekly: Decimal,
    /// Last month.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly: Decimal,
    /// Since the wallet was created.
    #[serde(with = "rust_decimal::serde::float")]
    pub all_time: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_payment_intent_from_wire() {
        let intent: PaymentIntent = serde_json::from_value(json!({
            "id": "pi_1",
            "amount": 1.25,
            "currency": "SOL",
            "recipient": "wallet-b",
            "status": "pending"
        }))
        .unwrap();
        assert_eq!(intent.amount, dec("1.25"));
        assert_eq!(intent.status, IntentStatus::Pending);
    }

    #[test]
    fn test_payout_completed_at_optional() {
        let payout: Payout = serde_json::from_value(json!({
            "id": "po_1",
            "amount": 3,
            "recipient": "w",
            "status": "processing",
            "createdAt": 1_700_000_000_000_u64
        }))
        .unwrap();
        assert!(payout.completed_at.is_none());
        assert_eq!(payout.created_at.as_millis(), 1_700_000_000_000);

        let out = serde_json::to_value(&payout).unwrap();
        assert!(out.get("completedAt").is_none());
        assert_eq!(out["createdAt"], json!(1_700_000_000_000_u64));
    }

    #[test]
    fn test_subscription_camel_case_fields() {
        let sub: Subscription = serde_json::from_value(json!({
            "id": "sub_1",
            "wallet": "w",
            "planId": "pro",
            "amount": 9.99,
            "interval": "monthly",
            "nextBilling": 1,
            "status": "paused"
        }))
        .unwrap();
        assert_eq!(sub.plan_id, "pro");
        assert_eq!(sub.interval, BillingInterval::Monthly);
        assert_eq!(sub.status, SubscriptionStatus::Paused);
    }

    #[test]
    fn test_escrow_rejects_unknown_status() {
        let result = serde_json::from_value::<Escrow>(json!({
            "id": "e",
            "amount": 1,
            "payer": "a",
            "payee": "b",
            "arbiter": "c",
            "status": "exploded",
            "createdAt": 0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_analytics_report_without_recipients() {
        let report: AnalyticsReport = serde_json::from_value(json!({
            "period": "week",
            "totalVolume": 100.5,
            "transactionCount": 4,
            "averageAmount": 25.125
        }))
        .unwrap();
        assert!(report.top_recipients.is_empty());
        assert_eq!(report.total_volume, dec("100.5"));
    }

    #[test]
    fn test_period_wire_strings() {
        assert_eq!(ReportPeriod::Day.as_str(), "day");
        assert_eq!(ReportPeriod::Month.to_string(), "month");
        assert_eq!(serde_json::to_value(ReportPeriod::Week).unwrap(), json!("week"));
        assert_eq!(PayoutStatus::Pending.as_str(), "pending");
    }
}
