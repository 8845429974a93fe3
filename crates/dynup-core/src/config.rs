//! Configuration types for the updater.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default IP-echo endpoints, queried concurrently on every run.
///
/// Order matters: on disagreement the first successful endpoint in this
/// order is the one trusted.
pub const DEFAULT_ECHO_ENDPOINTS: &[&str] = &[
    "https://checkip.amazonaws.com",
    "https://icanhazip.com",
];

/// Default shared deadline for one whole resolution (not per request)
pub const DEFAULT_RESOLVE_TIMEOUT_SECS: u64 = 10;

/// Resolver configuration
///
/// Passed by value into the IP source at construction time; there is no
/// process-wide mutable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// IP-echo service URLs, in tie-break priority order
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Shared deadline for the whole resolution, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.endpoints.is_empty() {
            return Err(crate::Error::config("at least one IP-echo endpoint is required"));
        }
        for url in &self.endpoints {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "IP-echo endpoint must use http or https: {}",
                    url
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("resolution timeout must be > 0"));
        }
        Ok(())
    }

    /// The shared deadline as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoints() -> Vec<String> {
    DEFAULT_ECHO_ENDPOINTS.iter().map(|s| s.to_string()).collect()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_RESOLVE_TIMEOUT_SECS
}
