//! moltbook gateway server.
//!
//! Exposes the moltbook webhook receiver and the x402 payment bridge over
//! HTTP, with Axum route handlers and TOML configuration.
//!
//! # Modules
//!
//! - [`handlers`] — Axum route handlers and router builder
//! - [`error`] — Gateway error types and their HTTP mapping
//! - [`config`] — Server configuration with environment variable expansion

pub mod config;
pub mod error;
pub mod handlers;

pub use handlers::{AppState, GatewayState, gateway_router};
