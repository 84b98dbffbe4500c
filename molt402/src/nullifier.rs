//! Replay protection for zero-knowledge payment proofs.
//!
//! Each proof carries a nullifier that may be spent once. The registry
//! remembers every spent nullifier for the life of the process; unlike the
//! TTL stores it never evicts, since forgetting a nullifier would re-open it
//! to replay.

use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A zero-knowledge proof as submitted by a payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    /// Opaque proof bytes, encoded by the prover.
    pub proof: String,
    /// Commitment the proof opens.
    pub commitment: String,
    /// One-time identifier preventing replay.
    pub nullifier: String,
}

/// Tracks spent nullifiers.
#[derive(Debug, Default)]
pub struct NullifierRegistry {
    spent: DashSet<String>,
}

impl NullifierRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a proof whose nullifier has not been seen and marks it spent.
    ///
    /// Returns `false` for replays and for empty nullifiers.
    pub fn verify(&self, proof: &ZkProof) -> bool {
        if proof.nullifier.is_empty() {
            return false;
        }
        let fresh = self.spent.insert(proof.nullifier.clone());
        if !fresh {
            #[cfg(feature = "telemetry")]
            tracing::warn!(nullifier = %proof.nullifier, "rejected replayed nullifier");
        }
        fresh
    }

    /// Returns `true` if the nullifier has already been spent.
    #[must_use]
    pub fn is_spent(&self, nullifier: &str) -> bool {
        self.spent.contains(nullifier)
    }

    /// Number of spent nullifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spent.len()
    }

    /// Returns `true` if nothing has been spent yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }
}

/// Lowercase hex SHA-256 of `data`.
#[must_use]
pub fn hash(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}
