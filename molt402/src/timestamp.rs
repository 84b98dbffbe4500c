//! Millisecond Unix timestamps.
//!
//! moltbook reports `createdAt`, `nextBilling` and webhook `timestamp` fields
//! as JavaScript-style epoch milliseconds. [`UnixMillis`] mirrors that and is
//! also used for the bookkeeping fields of the in-memory stores.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::{Duration, SystemTime};

/// Milliseconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// Serialized as a plain JSON number:
///
/// ```json
/// 1699999999000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixMillis(u64);

impl Display for UnixMillis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UnixMillis {
    /// Creates a timestamp from raw milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the current system time.
    ///
    /// A clock set before the epoch reads as zero.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        Self(millis)
    }

    /// Returns the raw milliseconds since the epoch.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Adds a duration, saturating at `u64::MAX`.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let delta = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        let ts = UnixMillis::from_millis(1_700_000_000_123);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1700000000123");
    }

    #[test]
    fn test_deserializes_from_number() {
        let ts: UnixMillis = serde_json::from_str("42").unwrap();
        assert_eq!(ts.as_millis(), 42);
    }

    #[test]
    fn test_rejects_string() {
        let result: Result<UnixMillis, _> = serde_json::from_str("\"42\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_saturating_add() {
        let ts = UnixMillis::from_millis(1_000);
        assert_eq!(ts.saturating_add(Duration::from_secs(2)).as_millis(), 3_000);
        let max = UnixMillis::from_millis(u64::MAX);
        assert_eq!(max.saturating_add(Duration::from_secs(1)).as_millis(), u64::MAX);
    }

    #[test]
    fn test_now_is_after_2020() {
        assert!(UnixMillis::now().as_millis() > 1_577_836_800_000);
    }
}
