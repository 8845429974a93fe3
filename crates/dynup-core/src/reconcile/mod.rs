//! Record reconciler.
//!
//! The reconciler owns one run of the updater: resolve the public IP once,
//! compare it against the managed A-record, and issue at most one update.
//!
//! ```text
//! START → RESOLVING → (RESOLVED | RESOLUTION_FAILED)
//! RESOLVED → COMPARING → (UP_TO_DATE | UPDATING → (UPDATED | UPDATE_FAILED))
//! ```
//!
//! There is no retry edge anywhere: any failure ends the run, and each
//! invocation starts from a fresh resolution.

use crate::error::Result;
use crate::traits::{DnsProvider, IpSource};
use std::net::Ipv4Addr;
use tracing::{debug, info};

/// Terminal outcome of a successful run
///
/// The two variants carry distinct messages; an up-to-date record is never
/// reported as an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The record already pointed at the resolved address; nothing was sent
    UpToDate {
        /// The address both sides agree on
        ip: Ipv4Addr,
    },
    /// The record was rewritten to the resolved address
    Updated {
        /// The address the record held before
        previous: Ipv4Addr,
        /// The address it holds now
        new: Ipv4Addr,
    },
}

/// One-shot reconciler wiring an [`IpSource`] to a [`DnsProvider`]
pub struct Reconciler {
    ip_source: Box<dyn IpSource>,
    provider: Box<dyn DnsProvider>,
    record_name: String,
}

impl Reconciler {
    /// Create a reconciler for one target record
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        record_name: impl Into<String>,
    ) -> Self {
        Self {
            ip_source,
            provider,
            record_name: record_name.into(),
        }
    }

    /// Run one resolve → compare → update pass
    ///
    /// Errors from the source or the provider propagate unchanged; no DNS
    /// mutation is attempted unless resolution produced an address.
    pub async fn run(&self) -> Result<Outcome> {
        let resolved = self.ip_source.current_v4().await?;
        info!("public IP resolved: {}", resolved);

        let record = self.provider.find_a_record(&self.record_name).await?;
        debug!(
            "current {} record for {}: {} (ttl {}, proxied {})",
            self.provider.provider_name(),
            record.name,
            record.content,
            record.ttl,
            record.proxied
        );

        if record.content == resolved {
            info!("{} already up to date at {}", self.record_name, resolved);
            return Ok(Outcome::UpToDate { ip: resolved });
        }

        info!(
            "{} out of date ({} -> {}); updating",
            self.record_name, record.content, resolved
        );
        self.provider.update_a_record(&record, resolved).await?;
        info!("{} updated to {}", self.record_name, resolved);

        Ok(Outcome::Updated {
            previous: record.content,
            new: resolved,
        })
    }
}
