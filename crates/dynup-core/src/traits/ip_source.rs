//! IP source trait.
//!
//! Defines the interface for determining the current public IPv4 address.
//! The production implementation (`dynup-ip-http`) queries several external
//! echo services concurrently and votes on the result; test doubles return a
//! fixed address.

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// A source performs one full resolution per call. It must not cache results
/// across calls, retry internally, or spawn work that outlives the call:
/// every invocation of the updater is an independent resolution.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: the resolved address
    /// - `Err(Error)`: if no usable address could be determined
    async fn current_v4(&self) -> Result<Ipv4Addr, crate::Error>;
}
