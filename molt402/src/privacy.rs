//! Removal of identifying request headers before they reach moltbook.

use http::HeaderMap;
use http::header::{COOKIE, HeaderName, REFERER, USER_AGENT};

/// Headers that identify the caller and are never forwarded.
pub static STRIPPED_HEADERS: [HeaderName; 4] = [
    HeaderName::from_static("x-forwarded-for"),
    USER_AGENT,
    REFERER,
    COOKIE,
];

/// Privacy behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivacyConfig {
    /// Remove [`STRIPPED_HEADERS`] from sanitized maps.
    pub strip_headers: bool,
    /// Suppress logging of which headers were removed.
    pub minimal_logging: bool,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            strip_headers: true,
            minimal_logging: true,
        }
    }
}

/// Strips identifying headers from incoming requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivacyShield {
    config: PrivacyConfig,
}

impl PrivacyShield {
    /// Creates a shield with the given configuration.
    #[must_use]
    pub const fn new(config: PrivacyConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &PrivacyConfig {
        &self.config
    }

    /// Returns a copy of `headers` without the identifying ones.
    ///
    /// Header names are matched case-insensitively. With `strip_headers`
    /// disabled the copy is unchanged.
    #[must_use]
    pub fn sanitize(&self, headers: &HeaderMap) -> HeaderMap {
        let mut sanitized = headers.clone();
        if !self.config.strip_headers {
            return sanitized;
        }
        for name in &STRIPPED_HEADERS {
            if sanitized.remove(name).is_some() && !self.config.minimal_logging {
                #[cfg(feature = "telemetry")]
                tracing::debug!(header = %name, "stripped identifying header");
            }
        }
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn sample_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        let forwarded = HeaderName::from_bytes(b"X-Forwarded-For").unwrap();
        headers.insert(forwarded, HeaderValue::from_static("10.0.0.1"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8"));
        headers.insert("referer", HeaderValue::from_static("https://a.example"));
        headers.insert("cookie", HeaderValue::from_static("sid=1"));
        headers.insert("x-402-proof", HeaderValue::from_static("abc"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn test_sanitize_strips_identifying_headers() {
        let shield = PrivacyShield::default();
        let out = shield.sanitize(&sample_headers());
        assert_eq!(out.len(), 2);
        assert!(out.contains_key("x-402-proof"));
        assert!(out.contains_key("content-type"));
        for name in &STRIPPED_HEADERS {
            assert!(!out.contains_key(name));
        }
    }

    #[test]
    fn test_sanitize_removes_repeated_values() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("b=2"));
        let out = PrivacyShield::default().sanitize(&headers);
        assert!(out.is_empty());
    }

    #[test]
    fn test_disabled_stripping_keeps_headers() {
        let shield = PrivacyShield::new(PrivacyConfig {
            strip_headers: false,
            minimal_logging: true,
        });
        let headers = sample_headers();
        assert_eq!(shield.sanitize(&headers), headers);
    }

    #[test]
    fn test_input_is_not_modified() {
        let headers = sample_headers();
        let _ = PrivacyShield::default().sanitize(&headers);
        assert_eq!(headers.len(), 6);
    }
}
