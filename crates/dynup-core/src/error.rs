//! Error types shared by all dynup crates.

use thiserror::Error;

/// Result type alias for dynup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
///
/// Every variant except `Disagreement`-style observations is fatal to the
/// run: the reconciler performs no retries, so the first failure it sees is
/// the one reported to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Every configured IP-echo endpoint failed or returned an unusable body
    #[error("failed to determine public IP: all sources unreachable or unparseable")]
    AllSourcesFailed,

    /// DNS provider API failure (zone lookup, record list, record update)
    #[error("provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Credential retrieval failure
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// The target A-record does not exist; dynup never creates records
    #[error("record not found: {0}")]
    NotFound(String),

    /// Network-level errors
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON deserialization errors from API payloads
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a credentials error
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
