use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::http::DEFAULT_USER_AGENT;
use crate::retry::{MaxAttempts, RetryPolicy};

/// Options for opening a `UreqTransport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Keep cookies between exchanges on the same transport.
    pub persist_cookies: bool,
    /// Follow 3xx responses; when false the redirect itself is returned.
    pub follow_redirects: bool,
    /// Overall timeout per exchange, in seconds.
    pub timeout_secs: Option<u64>,
    /// Sent as `User-Agent` unless the request sets one.
    pub user_agent: String,
    /// Fail the exchange when a response body is larger than this.
    /// Unlimited when unset.
    pub max_response_bytes: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            persist_cookies: false,
            follow_redirects: true,
            timeout_secs: Some(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_response_bytes: None,
        }
    }
}

/// Retry policy parameters (`[retry]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Fixed delay between attempts, in seconds.
    pub interval_secs: u64,
    /// Attempts including the first; negative means retry forever.
    pub max_attempts: i64,
    /// Convert a panic on the last attempt into a plain failure.
    pub suppress_final_panic: bool,
    /// Log label; per-attempt lines are only written when set.
    pub label: Option<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1,
            max_attempts: 3,
            suppress_final_panic: true,
            label: None,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let mut policy = RetryPolicy::new(
            Duration::from_secs(cfg.interval_secs),
            MaxAttempts::from_count(cfg.max_attempts),
        )
        .suppress_final_panic(cfg.suppress_final_panic);
        if let Some(label) = &cfg.label {
            policy = policy.with_label(label.clone());
        }
        policy
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transport: TransportConfig,
    pub retry: RetryConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml_str(&data)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(cfg)
    }
}
