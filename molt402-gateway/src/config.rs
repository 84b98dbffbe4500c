//! Gateway configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 4402
//!
//! [moltbook]
//! base_url = "https://api.moltbook.com/v1/"
//! api_key = "$MOLTBOOK_API_KEY"
//! timeout_secs = 10
//! webhook_secret = "${MOLTBOOK_WEBHOOK_SECRET}"
//!
//! [bridge]
//! enable_privacy = true
//! auto_confirm = false
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to configuration file (default: `config.toml`)
//! - `HOST` — Override server bind address
//! - `PORT` — Override server port
//! - Secrets referenced by `$VAR` in the config file

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use molt402_http::BridgeConfig;
use molt402_http::constants::DEFAULT_MOLTBOOK_URL;
use serde::Deserialize;

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but cannot be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Configuration file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`GatewayConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Server bind address (default: `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Server port (default: `4402`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// moltbook connection settings.
    #[serde(default)]
    pub moltbook: MoltbookConfig,

    /// Payment bridge switches.
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// moltbook connection settings.
#[derive(Clone, Deserialize)]
pub struct MoltbookConfig {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer API key. Supports `$VAR` / `${VAR}`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Shared webhook secret. Supports `$VAR` / `${VAR}`.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

impl std::fmt::Debug for MoltbookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoltbookConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for MoltbookConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: None,
            webhook_secret: None,
        }
    }
}

impl MoltbookConfig {
    /// The API key, unless empty or an unresolved `$VAR`.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        resolved(self.api_key.as_deref())
    }

    /// The webhook secret, unless empty or an unresolved `$VAR`.
    #[must_use]
    pub fn webhook_secret(&self) -> Option<&str> {
        resolved(self.webhook_secret.as_deref())
    }

    /// The request timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn resolved(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.starts_with('$'))
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

const fn default_port() -> u16 {
    4402
}

fn default_base_url() -> String {
    DEFAULT_MOLTBOOK_URL.to_owned()
}

impl GatewayConfig {
    /// Loads configuration from the path given by the `CONFIG` environment
    /// variable, falling back to `config.toml` in the current directory.
    ///
    /// After loading, all string values with `$VAR` / `${VAR}` references
    /// are expanded from the process environment. `HOST` and `PORT` env vars
    /// override the file values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.toml".to_owned());
        Self::load_from(Path::new(&path))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_owned(),
                source,
            })?
        } else {
            String::new()
        };

        let mut config = Self::parse(&content, |name| std::env::var(name).ok())?;

        // Allow HOST / PORT env overrides
        if let Some(addr) = std::env::var("HOST").ok().and_then(|h| h.parse().ok()) {
            config.host = addr;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }

        Ok(config)
    }

    /// Parses TOML after expanding variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the expanded text is not valid.
    pub fn parse<F>(content: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_vars(content, lookup);
        Ok(toml::from_str(&expanded)?)
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string through `lookup`.
///
/// Unresolved variables are left as-is.
fn expand_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    closed = true;
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        match lookup(&var_name).filter(|_| !var_name.is_empty()) {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&var_name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}
