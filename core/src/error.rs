//! Error types for REST calls, transports and configuration.
//!
//! # Design
//! Every variant here is fatal to the single call that produced it. Nothing
//! in this crate retries on its own; wrapping a call in a `RetryPolicy` is
//! the only way to get a second attempt. A non-2xx status is not an error.

use std::path::PathBuf;

use thiserror::Error;

/// Failure at the transport boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be turned into a valid HTTP message.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection, TLS, timeout or protocol failure.
    #[error("HTTP exchange failed: {0}")]
    Exchange(#[from] ureq::Error),

    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Errors returned by `RestClient` calls.
#[derive(Debug, Error)]
pub enum CallError {
    /// The input value could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The response body could not be deserialized into the expected shape.
    #[error("failed to decode response body: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CallError {
    pub fn is_transport(&self) -> bool {
        matches!(self, CallError::Transport(_))
    }
}

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
