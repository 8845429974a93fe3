//! DNS provider trait.
//!
//! Defines the interface for looking up and updating the managed A-record
//! via a hosted DNS provider's API. The production implementation is
//! `dynup-provider-cloudflare`.

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// A DNS A-record as held by the provider
///
/// Carries every attribute an update must preserve. `zone_id` and `id` are
/// provider-side identifiers resolved during lookup so that the subsequent
/// update does not repeat the zone search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ARecord {
    /// Provider-side record identifier
    pub id: String,
    /// Provider-side zone identifier
    pub zone_id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Current address the record points at
    pub content: Ipv4Addr,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Whether the record is proxied through the provider's edge
    pub proxied: bool,
}

/// Trait for DNS provider implementations
///
/// Implementations are stateless, single-shot API clients: no retries, no
/// backoff, no caching, no spawned tasks. A failure here is fatal to the
/// run and is propagated unchanged by the reconciler.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up the A-record for `record_name`
    ///
    /// Returns `Error::NotFound` if no A-record exists for the name. dynup
    /// only updates existing records; it never creates one.
    async fn find_a_record(&self, record_name: &str) -> Result<ARecord, crate::Error>;

    /// Replace the record's address, preserving all other attributes
    ///
    /// Exactly one update request; no verification re-read afterwards.
    async fn update_a_record(
        &self,
        record: &ARecord,
        new_ip: Ipv4Addr,
    ) -> Result<(), crate::Error>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}
