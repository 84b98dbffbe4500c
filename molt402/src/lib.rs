#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for moltbook-backed x402 payments.
//!
//! This crate holds everything that lives in process memory: one-shot access
//! tokens, sessions, price quotes, spent nullifiers and agent budgets. None of
//! it talks to the network; the moltbook HTTP services live in `molt402-http`.
//!
//! Every keyed store is bounded and expires its entries, see [`store::TtlStore`].
//!
//! # Modules
//!
//! - [`access`] — One-shot access tokens bound to a wallet
//! - [`agent`] — Spending budget and domain allow-list for autonomous agents
//! - [`error`] — Error types shared by this crate
//! - [`nullifier`] — Replay protection for zero-knowledge proofs
//! - [`price`] — Cached USD price quotes with a freshness window
//! - [`privacy`] — Stripping of identifying request headers
//! - [`proof`] — The `x-402-proof` payment header
//! - [`session`] — Sliding-expiry sessions with attached data
//! - [`store`] — Bounded TTL map underlying the stores above
//! - [`timestamp`] — Millisecond Unix timestamps used on the wire
//!
//! # Feature Flags
//!
//! - `telemetry` — Enables tracing instrumentation for debugging and monitoring

pub mod access;
pub mod agent;
pub mod error;
pub mod nullifier;
pub mod price;
pub mod privacy;
pub mod proof;
pub mod session;
pub mod store;
pub mod timestamp;

pub use access::{AccessController, AccessToken};
pub use agent::{AgentConfig, AgentRuntime};
pub use error::{BudgetError, ProofError};
pub use nullifier::{NullifierRegistry, ZkProof};
pub use price::{PriceData, PriceOracle};
pub use privacy::{PrivacyConfig, PrivacyShield};
pub use proof::PaymentProof;
pub use session::{Session, SessionManager};
pub use store::TtlStore;
pub use timestamp::UnixMillis;
