//! Credentials source trait.
//!
//! Credential sourcing is a pluggable seam: the same updater runs with
//! credentials from the environment or from a secret store, selected at
//! startup. Implementations live in the binary crate (env) and in
//! `dynup-credentials-vault`.

use async_trait::async_trait;

/// Everything the reconciler needs to talk to the DNS provider
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Provider API token
    pub api_token: String,
    /// DNS zone name containing the target record
    pub zone_name: String,
    /// Fully-qualified name of the target A-record
    pub record_name: String,
}

// The token must not leak through Debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<REDACTED>")
            .field("zone_name", &self.zone_name)
            .field("record_name", &self.record_name)
            .finish()
    }
}

/// Trait for credential source implementations
#[async_trait]
pub trait CredentialsSource: Send + Sync {
    /// Retrieve the credential set for this run
    async fn credentials(&self) -> Result<Credentials, crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_token() {
        let creds = Credentials {
            api_token: "super-secret-token".to_string(),
            zone_name: "example.com".to_string(),
            record_name: "home.example.com".to_string(),
        };

        let debug_str = format!("{:?}", creds);
        assert!(!debug_str.contains("super-secret-token"));
        assert!(debug_str.contains("example.com"));
    }
}
