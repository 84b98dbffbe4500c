//! Sliding-expiry sessions.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::store::TtlStore;
use crate::timestamp::UnixMillis;

/// A live session and its attached data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session identifier.
    pub id: String,
    /// When the session was created.
    pub created_at: UnixMillis,
    /// Last successful read or write.
    pub last_access: UnixMillis,
    /// Arbitrary caller data.
    pub data: Map<String, Value>,
}

/// Creates, reads and destroys [`Session`]s.
///
/// Every successful access restarts the TTL. A session that reaches its TTL
/// without being accessed is dropped and never returned again.
#[derive(Debug)]
pub struct SessionManager {
    sessions: TtlStore<String, Session>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

impl SessionManager {
    /// Default idle timeout (1 hour).
    pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

    /// Creates a manager with the given idle timeout.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, TtlStore::<String, Session>::DEFAULT_CAPACITY)
    }

    /// Creates a manager holding at most `capacity` sessions.
    #[must_use]
    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            sessions: TtlStore::new(ttl, capacity),
        }
    }

    /// Starts a new empty session and returns its id.
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let now = UnixMillis::now();
        self.sessions.insert(
            id.clone(),
            Session {
                id: id.clone(),
                created_at: now,
                last_access: now,
                data: Map::new(),
            },
        );
        id
    }

    /// Returns the session if it has not expired, refreshing its expiry.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions
            .update(id, |session| session.last_access = UnixMillis::now())
    }

    /// Stores `value` under `key` in a live session. Returns `false` if the
    /// session does not exist or has expired.
    pub fn set(&self, id: &str, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        self.sessions
            .update(id, move |session| {
                session.data.insert(key, value);
                session.last_access = UnixMillis::now();
            })
            .is_some()
    }

    /// Ends a session.
    pub fn destroy(&self, id: &str) {
        self.sessions.remove(id);
    }

    /// Number of sessions held, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
