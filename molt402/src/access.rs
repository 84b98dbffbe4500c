//! One-shot access tokens.
//!
//! A token is issued for a wallet after a payment clears and grants exactly
//! one access. [`AccessController::validate_token`] consumes it; a second
//! validation, or one after the TTL, fails.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::TtlStore;
use crate::timestamp::UnixMillis;

/// An issued, not yet consumed access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Token identifier handed to the client.
    pub id: String,
    /// Wallet the token was issued to.
    pub wallet: String,
    /// When the token was issued.
    pub issued_at: UnixMillis,
    /// When the token stops being accepted.
    pub expires_at: UnixMillis,
}

/// Issues and redeems [`AccessToken`]s.
#[derive(Debug)]
pub struct AccessController {
    tokens: TtlStore<String, AccessToken>,
}

impl Default for AccessController {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

impl AccessController {
    /// Default token lifetime (5 minutes).
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    /// Creates a controller whose tokens live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, TtlStore::<String, AccessToken>::DEFAULT_CAPACITY)
    }

    /// Creates a controller holding at most `capacity` outstanding tokens.
    #[must_use]
    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            tokens: TtlStore::new(ttl, capacity),
        }
    }

    /// Issues a fresh token for `wallet` and returns its id.
    pub fn issue_token(&self, wallet: impl Into<String>) -> String {
        let id = Uuid::new_v4().to_string();
        let issued_at = UnixMillis::now();
        let token = AccessToken {
            id: id.clone(),
            wallet: wallet.into(),
            issued_at,
            expires_at: issued_at.saturating_add(self.tokens.ttl()),
        };
        #[cfg(feature = "telemetry")]
        tracing::debug!(token = %id, wallet = %token.wallet, "issued access token");
        self.tokens.insert(id.clone(), token);
        id
    }

    /// Redeems a token. Returns `true` only for the first validation of a
    /// fresh token.
    pub fn validate_token(&self, id: &str) -> bool {
        let valid = self.tokens.take(id).is_some();
        #[cfg(feature = "telemetry")]
        tracing::debug!(token = %id, valid, "validated access token");
        valid
    }

    /// Returns the wallet bound to a fresh token without consuming it.
    #[must_use]
    pub fn wallet_for(&self, id: &str) -> Option<String> {
        self.tokens.get(id).map(|token| token.wallet)
    }

    /// Discards a token. Returns `true` if it was outstanding.
    pub fn revoke(&self, id: &str) -> bool {
        self.tokens.remove(id).is_some()
    }

    /// Number of tokens held, including expired ones not yet purged.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.tokens.len()
    }
}
