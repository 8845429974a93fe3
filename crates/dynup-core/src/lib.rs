// # dynup-core
//
// Core library for the dynup one-shot dynamic-DNS updater.
//
// ## Architecture Overview
//
// - **IpSource**: trait for resolving the current public IPv4 address
// - **DnsProvider**: trait for looking up and updating the managed A-record
// - **CredentialsSource**: trait for retrieving the provider credential set
// - **Reconciler**: resolve → compare → at-most-one-update, once per run
//
// The library holds no state between runs: every invocation is a fresh
// resolution followed by a single compare-and-update decision.

pub mod config;
pub mod error;
pub mod reconcile;
pub mod traits;

// Re-export core types for convenience
pub use config::ResolverConfig;
pub use error::{Error, Result};
pub use reconcile::{Outcome, Reconciler};
pub use traits::{ARecord, Credentials, CredentialsSource, DnsProvider, IpSource};
