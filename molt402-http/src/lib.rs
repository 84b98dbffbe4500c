#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP side of moltbook payments.
//!
//! Provides the moltbook API transport, thin typed services over it, webhook
//! signature verification with handler dispatch, and the bridge that turns an
//! x402 proof header into a moltbook payment intent.
//!
//! # Modules
//!
//! - [`bridge`] — x402 proof header to moltbook payment intent
//! - [`client`] — `reqwest`-backed [`client::MoltbookClient`]
//! - [`constants`] — Header names and default URLs
//! - [`error`] — Transport and webhook error types
//! - [`services`] — Payments, escrow, payouts, subscriptions, analytics
//! - [`transport`] — Request/response envelope and the [`transport::MoltbookTransport`] trait
//! - [`types`] — Remote entity shapes
//! - [`webhook`] — HMAC verification and event dispatch
//!
//! # Error handling
//!
//! The transport reports every failure as a [`error::MoltbookClientError`].
//! The services deliberately flatten those into `None`, `false` or an empty
//! list, logging the cause when the `telemetry` feature is on.

pub mod bridge;
pub mod client;
pub mod constants;
pub mod error;
pub mod services;
pub mod transport;
pub mod types;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{BridgeConfig, BridgeOutcome, MoltbookBridge, RejectReason};
pub use client::MoltbookClient;
pub use error::{MoltbookClientError, WebhookError};
pub use services::{
    MoltbookAnalytics, MoltbookEscrow, MoltbookPayments, MoltbookPayouts, MoltbookSubscriptions,
};
pub use transport::{ApiRequest, ApiResponse, BoxFuture, MoltbookTransport};
pub use webhook::{MoltbookWebhook, WebhookDispatcher, WebhookEvent, WebhookEventType, WebhookHandler};
