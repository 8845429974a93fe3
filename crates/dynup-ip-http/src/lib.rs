// # HTTP Consensus IP Source
//
// Resolves the caller's public IPv4 address by querying every configured
// IP-echo service concurrently and voting on the answers.
//
// ## Resolution model
//
// - One GET per endpoint, all dispatched up front, so total latency is
//   bounded by the slowest endpoint rather than the sum.
// - A single shared deadline covers the whole resolution; an endpoint still
//   in flight when it passes counts as failed.
// - The aggregator waits for every endpoint to settle (this is not a
//   first-response-wins race) and restores configured order before deciding:
//   on disagreement the first successful endpoint in configured order wins,
//   with a warning. Disagreement never aborts the run.
// - No retries and no caching: each call is a fresh, independent resolution.

use async_trait::async_trait;
use dynup_core::config::ResolverConfig;
use dynup_core::error::{Error, Result};
use dynup_core::traits::IpSource;
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Why a single endpoint produced no usable address
///
/// Transport and parse causes are distinct for logging, but the aggregator
/// treats them identically: the endpoint is excluded from the vote.
#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("empty response body")]
    EmptyBody,

    #[error("body is not an IPv4 address: {0:?}")]
    NotAnAddress(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// One endpoint's result for this resolution
type FetchOutcome = std::result::Result<Ipv4Addr, FetchError>;

/// IP source that fans out over several echo services and votes
pub struct ConsensusIpSource {
    /// Echo service URLs in tie-break priority order
    endpoints: Vec<String>,

    /// Shared deadline for one whole resolution
    timeout: Duration,

    /// HTTP client
    client: reqwest::Client,
}

impl ConsensusIpSource {
    /// Create a source from a validated [`ResolverConfig`]
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        let timeout = config.timeout();
        Self::with_deadline(config.endpoints, timeout)
    }

    /// Create a source with an explicit deadline
    pub fn with_deadline(endpoints: Vec<String>, timeout: Duration) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(Error::config("at least one IP-echo endpoint is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoints,
            timeout,
            client,
        })
    }

    /// Resolve the public IPv4 address once
    ///
    /// Spawns one task per endpoint, tags each outcome with its dispatch
    /// index, and drains exactly `endpoints.len()` results before deciding.
    pub async fn resolve(&self) -> Result<Ipv4Addr> {
        let deadline = Instant::now() + self.timeout;

        // Bounded channel sized to the endpoint count: every task sends one
        // outcome and the aggregator drains them all.
        let (tx, mut rx) = mpsc::channel(self.endpoints.len());

        for (index, endpoint) in self.endpoints.iter().enumerate() {
            let tx = tx.clone();
            let client = self.client.clone();
            let endpoint = endpoint.clone();

            tokio::spawn(async move {
                let outcome = match tokio::time::timeout_at(deadline, fetch_ip(&client, &endpoint))
                    .await
                {
                    Ok(outcome) => outcome,
                    // A late result is disregarded, not forcibly cancelled;
                    // dropping the future tears down the request.
                    Err(_) => Err(FetchError::DeadlineExceeded),
                };
                let _ = tx.send((index, endpoint, outcome)).await;
            });
        }
        drop(tx);

        // Completion order is arbitrary; slots keyed by dispatch index
        // restore configured order for the tie-break below.
        let mut outcomes: Vec<Option<FetchOutcome>> = Vec::new();
        outcomes.resize_with(self.endpoints.len(), || None);

        while let Some((index, endpoint, outcome)) = rx.recv().await {
            if let Err(cause) = &outcome {
                debug!("IP lookup via {} failed: {}", endpoint, cause);
            }
            outcomes[index] = Some(outcome);
        }

        decide(&self.endpoints, &outcomes)
    }
}

#[async_trait]
impl IpSource for ConsensusIpSource {
    async fn current_v4(&self) -> Result<Ipv4Addr> {
        self.resolve().await
    }
}

/// Fetch and parse one endpoint's answer
async fn fetch_ip(client: &reqwest::Client, url: &str) -> FetchOutcome {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    let body = response.text().await?;
    let candidate = body.trim();
    if candidate.is_empty() {
        return Err(FetchError::EmptyBody);
    }

    candidate
        .parse::<Ipv4Addr>()
        .map_err(|_| FetchError::NotAnAddress(candidate.to_string()))
}

/// Apply the decision policy over the settled outcomes
///
/// A missing slot (task died without reporting) counts as a failed endpoint.
/// The returned address is always one of the successfully parsed outcomes.
fn decide(endpoints: &[String], outcomes: &[Option<FetchOutcome>]) -> Result<Ipv4Addr> {
    let successes: Vec<(usize, Ipv4Addr)> = outcomes
        .iter()
        .enumerate()
        .filter_map(|(index, outcome)| match outcome {
            Some(Ok(ip)) => Some((index, *ip)),
            _ => None,
        })
        .collect();

    let Some(&(first_index, chosen)) = successes.first() else {
        return Err(Error::AllSourcesFailed);
    };

    for &(index, ip) in &successes[1..] {
        if ip != chosen {
            warn!(
                "IP mismatch between services: {} ({}) vs {} ({}); using {}",
                chosen, endpoints[first_index], ip, endpoints[index], chosen
            );
        }
    }

    Ok(chosen)
}
