//! Typed wrappers over the moltbook REST endpoints.
//!
//! Each service owns an `Arc<dyn MoltbookTransport>` and turns one method
//! call into one request. Failures are not propagated: a missing entity, a
//! transport error, a non-2xx status and an undecodable body all read as
//! `None`, `false` or an empty list. The cause is logged when the
//! `telemetry` feature is enabled.

mod analytics;
mod escrow;
mod payment;
mod payout;
mod subscription;

pub use analytics::MoltbookAnalytics;
pub use escrow::MoltbookEscrow;
pub use payment::MoltbookPayments;
pub use payout::MoltbookPayouts;
pub use subscription::MoltbookSubscriptions;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::MoltbookClientError;
use crate::transport::{ApiRequest, MoltbookTransport};

/// Sends `request` and decodes the envelope's `data` as `R`.
async fn fetch<R: DeserializeOwned>(
    transport: &dyn MoltbookTransport,
    request: ApiRequest,
) -> Option<R> {
    let context = request.to_string();
    let result = transport.send(request).await.and_then(|response| {
        response
            .into_data()
            .map_err(|source| MoltbookClientError::JsonDeserialization {
                context: context.clone(),
                source,
            })
    });
    result.unwrap_or_else(|err| {
        log_failure(&err);
        None
    })
}

/// Like [`fetch`] for list endpoints; anything but a decodable list is empty.
async fn fetch_list<R: DeserializeOwned>(
    transport: &dyn MoltbookTransport,
    request: ApiRequest,
) -> Vec<R> {
    fetch::<Vec<R>>(transport, request)
        .await
        .unwrap_or_default()
}

/// Sends `request` and reports the envelope's `success` flag.
async fn execute(transport: &dyn MoltbookTransport, request: ApiRequest) -> bool {
    let context = request.to_string();
    match transport.send(request).await {
        Ok(response) => {
            if !response.success {
                log_rejected(&context, response.error.as_deref());
            }
            response.success
        }
        Err(err) => {
            log_failure(&err);
            false
        }
    }
}

/// moltbook expects amounts as JSON numbers.
fn amount_value(amount: Decimal) -> Value {
    amount
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(amount.to_string()), Value::Number)
}

#[cfg(feature = "telemetry")]
fn log_failure(err: &MoltbookClientError) {
    tracing::warn!(error = %err, "moltbook request failed");
}

#[cfg(not(feature = "telemetry"))]
fn log_failure(_err: &MoltbookClientError) {}

#[cfg(feature = "telemetry")]
fn log_rejected(context: &str, error: Option<&str>) {
    tracing::info!(request = context, error = error.unwrap_or("unspecified"), "moltbook rejected request");
}

#[cfg(not(feature = "telemetry"))]
fn log_rejected(_context: &str, _error: Option<&str>) {}
