use std::fmt;
use std::sync::Arc;

use molt402::UnixMillis;
use serde::Deserialize;

use super::fetch;
use crate::transport::{ApiRequest, MoltbookTransport};
use crate::types::{AnalyticsReport, ReportPeriod, RevenueMetrics};

/// Read-only reporting under `/analytics`.
#[derive(Clone)]
pub struct MoltbookAnalytics {
    transport: Arc<dyn MoltbookTransport>,
}

impl fmt::Debug for MoltbookAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoltbookAnalytics").finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct ExportLink {
    url: String,
}

impl MoltbookAnalytics {
    /// Creates the service over a shared transport.
    #[must_use]
    pub fn new(transport: Arc<dyn MoltbookTransport>) -> Self {
        Self { transport }
    }

    /// Volume report of `wallet` over `period`.
    pub async fn get_report(&self, wallet: &str, period: ReportPeriod) -> Option<AnalyticsReport> {
        let request = ApiRequest::get(["analytics", "report"])
            .query("wallet", wallet)
            .query("period", period.as_str());
        fetch(self.transport.as_ref(), request).await
    }

    /// Revenue of `wallet` over rolling windows.
    pub async fn get_revenue(&self, wallet: &str) -> Option<RevenueMetrics> {
        let request = ApiRequest::get(["analytics", "revenue"]).query("wallet", wallet);
        fetch(self.transport.as_ref(), request).await
    }

    /// Asks moltbook for a CSV export and returns its download URL.
    pub async fn export_csv(
        &self,
        wallet: &str,
        start: UnixMillis,
        end: UnixMillis,
    ) -> Option<String> {
        let request = ApiRequest::get(["analytics", "export"])
            .query("wallet", wallet)
            .query("start", start.to_string())
            .query("end", end.to_string());
        fetch::<ExportLink>(self.transport.as_ref(), request)
            .await
            .map(|link| link.url)
    }
}
