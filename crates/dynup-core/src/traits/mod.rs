//! Core traits for the updater.
//!
//! These are the three seams the reconciler is wired against:
//!
//! - [`IpSource`]: resolve the current public IPv4 address
//! - [`DnsProvider`]: look up and update the target A-record
//! - [`CredentialsSource`]: supply the provider credential and target names

pub mod credentials;
pub mod dns_provider;
pub mod ip_source;

pub use credentials::{Credentials, CredentialsSource};
pub use dns_provider::{ARecord, DnsProvider};
pub use ip_source::IpSource;
