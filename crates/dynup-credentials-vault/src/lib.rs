// # Vault Credentials Source
//
// Retrieves the provider credential set from a HashiCorp Vault KV-v2
// secret instead of the environment. The secret is expected to hold three
// string keys: `api-token`, `zone-name`, `record-name`.
//
// One read per run (`GET {addr}/v1/{mount}/data/{path}` with the
// `X-Vault-Token` header); no caching, no token renewal. The Vault token
// never appears in logs or Debug output.

use async_trait::async_trait;
use dynup_core::error::{Error, Result};
use dynup_core::traits::{Credentials, CredentialsSource};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Default KV-v2 mount point
const DEFAULT_MOUNT: &str = "secret";

/// Default secret path under the mount
const DEFAULT_SECRET_PATH: &str = "cloudflare";

/// HTTP timeout for Vault requests
const VAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials source backed by a Vault KV-v2 secret
pub struct VaultCredentials {
    /// Vault server address, e.g. `https://vault.internal:8200`
    addr: String,

    /// Vault auth token; never logged
    token: String,

    /// KV-v2 mount point
    mount: String,

    /// Secret path under the mount
    secret_path: String,

    client: reqwest::Client,
}

// Keeps the Vault token out of Debug output.
impl std::fmt::Debug for VaultCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultCredentials")
            .field("addr", &self.addr)
            .field("token", &"<REDACTED>")
            .field("mount", &self.mount)
            .field("secret_path", &self.secret_path)
            .finish()
    }
}

/// KV-v2 read envelope: the secret's key/value pairs sit under `data.data`
#[derive(Debug, Deserialize)]
struct ReadResponse {
    data: SecretData,
}

#[derive(Debug, Deserialize)]
struct SecretData {
    data: HashMap<String, String>,
}

impl VaultCredentials {
    /// Create a source reading the default `secret/data/cloudflare` path
    pub fn new(addr: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::config("Vault token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(VAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            addr: addr.into().trim_end_matches('/').to_string(),
            token,
            mount: DEFAULT_MOUNT.to_string(),
            secret_path: DEFAULT_SECRET_PATH.to_string(),
            client,
        })
    }

    /// Override the secret path under the mount
    pub fn with_secret_path(mut self, secret_path: impl Into<String>) -> Self {
        self.secret_path = secret_path.into();
        self
    }

    /// Override the KV-v2 mount point
    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self
    }

    fn secret_url(&self) -> String {
        format!("{}/v1/{}/data/{}", self.addr, self.mount, self.secret_path)
    }

    fn take_key(fields: &mut HashMap<String, String>, key: &str, url: &str) -> Result<String> {
        fields
            .remove(key)
            .ok_or_else(|| Error::credentials(format!("{} not found in secret at {}", key, url)))
    }
}

#[async_trait]
impl CredentialsSource for VaultCredentials {
    async fn credentials(&self) -> Result<Credentials> {
        let url = self.secret_url();
        debug!("reading credentials from {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Vault-Token", &self.token)
            .send()
            .await
            .map_err(|e| Error::credentials(format!("Vault request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                403 => Error::credentials(format!("Vault denied access to {} ({})", url, status)),
                404 => Error::credentials(format!("no secret found at {}", url)),
                _ => Error::credentials(format!("Vault read of {} failed: {}", url, status)),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::credentials(format!("failed to read Vault response: {}", e)))?;
        let envelope: ReadResponse = serde_json::from_str(&body)?;

        let mut fields = envelope.data.data;
        Ok(Credentials {
            api_token: Self::take_key(&mut fields, "api-token", &url)?,
            zone_name: Self::take_key(&mut fields, "zone-name", &url)?,
            record_name: Self::take_key(&mut fields, "record-name", &url)?,
        })
    }
}
