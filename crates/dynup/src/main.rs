// # dynup - one-shot dynamic-DNS updater
//
// Thin integration layer: reads configuration from environment variables,
// wires the concrete IP source, provider and credentials source together,
// and runs one reconcile pass. All updater logic lives in dynup-core.
//
// Intended for cron-style invocation; the process performs a single
// resolve → compare → update run and exits.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Credentials
// - `DYNUP_CREDENTIALS`: source of the credential set (`env` or `vault`)
// - `DYNUP_API_TOKEN`: Cloudflare API token (env mode)
// - `DYNUP_ZONE_NAME`: zone containing the managed record (env mode)
// - `DYNUP_RECORD_NAME`: fully-qualified A-record name (env mode)
// - `DYNUP_VAULT_ADDR` / `DYNUP_VAULT_TOKEN`: Vault server and auth token
// - `DYNUP_VAULT_MOUNT` / `DYNUP_VAULT_PATH`: KV-v2 mount and secret path
//   (default `secret` / `cloudflare`)
//
// ### Resolution
// - `DYNUP_ECHO_ENDPOINTS`: comma-separated IP-echo URLs, tie-break order
// - `DYNUP_TIMEOUT_SECS`: shared resolution deadline (default 10)
//
// ### Logging
// - `DYNUP_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DYNUP_API_TOKEN=your_token
// export DYNUP_ZONE_NAME=example.com
// export DYNUP_RECORD_NAME=home.example.com
//
// dynup
// ```

use anyhow::Result;
use async_trait::async_trait;
use dynup_core::config::{DEFAULT_RESOLVE_TIMEOUT_SECS, ResolverConfig};
use dynup_core::{Credentials, CredentialsSource, Outcome, Reconciler};
use dynup_ip_http::ConsensusIpSource;
use dynup_provider_cloudflare::CloudflareProvider;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the three terminal states
///
/// - 0: success (record updated, or already up to date)
/// - 1: configuration or startup error
/// - 2: runtime failure (resolution, credentials, or provider)
#[derive(Debug, Clone, Copy)]
enum UpdaterExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<UpdaterExitCode> for ExitCode {
    fn from(code: UpdaterExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Which credential source to wire in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialsMode {
    Env,
    Vault,
}

/// Application configuration
struct Config {
    credentials_mode: CredentialsMode,
    api_token: Option<String>,
    zone_name: Option<String>,
    record_name: Option<String>,
    vault_addr: Option<String>,
    vault_token: Option<String>,
    vault_mount: Option<String>,
    vault_path: Option<String>,
    echo_endpoints: Option<Vec<String>>,
    timeout_secs: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let credentials_mode = match env::var("DYNUP_CREDENTIALS")
            .unwrap_or_else(|_| "env".to_string())
            .to_lowercase()
            .as_str()
        {
            "env" => CredentialsMode::Env,
            "vault" => CredentialsMode::Vault,
            other => anyhow::bail!(
                "DYNUP_CREDENTIALS '{}' is not supported. Supported sources: env, vault",
                other
            ),
        };

        Ok(Self {
            credentials_mode,
            api_token: env::var("DYNUP_API_TOKEN").ok(),
            zone_name: env::var("DYNUP_ZONE_NAME").ok(),
            record_name: env::var("DYNUP_RECORD_NAME").ok(),
            vault_addr: env::var("DYNUP_VAULT_ADDR").ok(),
            vault_token: env::var("DYNUP_VAULT_TOKEN").ok(),
            vault_mount: env::var("DYNUP_VAULT_MOUNT").ok(),
            vault_path: env::var("DYNUP_VAULT_PATH").ok(),
            echo_endpoints: env::var("DYNUP_ECHO_ENDPOINTS").ok().map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            timeout_secs: env::var("DYNUP_TIMEOUT_SECS")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("DYNUP_TIMEOUT_SECS is not a number: {}", e))?
                .unwrap_or(DEFAULT_RESOLVE_TIMEOUT_SECS),
            log_level: env::var("DYNUP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration before any network call
    fn validate(&self) -> Result<()> {
        match self.credentials_mode {
            CredentialsMode::Env => self.validate_env_credentials()?,
            CredentialsMode::Vault => self.validate_vault_credentials()?,
        }

        if !(1..=300).contains(&self.timeout_secs) {
            anyhow::bail!(
                "DYNUP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            );
        }

        if let Some(endpoints) = &self.echo_endpoints {
            if endpoints.is_empty() {
                anyhow::bail!("DYNUP_ECHO_ENDPOINTS must contain at least one URL");
            }
            for url in endpoints {
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    anyhow::bail!("DYNUP_ECHO_ENDPOINTS entries must be http(s) URLs. Got: {}", url);
                }
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!(
                "DYNUP_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ),
        }

        Ok(())
    }

    fn validate_env_credentials(&self) -> Result<()> {
        let token = self.api_token.as_deref().unwrap_or_default();
        if token.is_empty() {
            anyhow::bail!(
                "DYNUP_API_TOKEN is required. Set it via: export DYNUP_API_TOKEN=your_token"
            );
        }

        // Cloudflare tokens are typically 40 characters; anything much
        // shorter is a paste error.
        if token.len() < 20 {
            anyhow::bail!(
                "DYNUP_API_TOKEN appears too short ({} chars). Verify your token is correct.",
                token.len()
            );
        }

        let token_lower = token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower.contains("example")
        {
            anyhow::bail!(
                "DYNUP_API_TOKEN appears to be a placeholder. \
                Use an actual API token from your DNS provider."
            );
        }

        let zone = self
            .zone_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("DYNUP_ZONE_NAME is required"))?;
        validate_domain_name(zone)?;

        let record = self
            .record_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("DYNUP_RECORD_NAME is required"))?;
        validate_domain_name(record)?;

        Ok(())
    }

    fn validate_vault_credentials(&self) -> Result<()> {
        if cfg!(not(feature = "vault")) {
            anyhow::bail!("this build has no Vault support; rebuild with the 'vault' feature");
        }

        let addr = self
            .vault_addr
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("DYNUP_VAULT_ADDR is required when DYNUP_CREDENTIALS=vault")
            })?;
        if !addr.starts_with("https://") && !addr.starts_with("http://") {
            anyhow::bail!("DYNUP_VAULT_ADDR must be an http(s) URL. Got: {}", addr);
        }

        if self.vault_token.as_deref().unwrap_or_default().is_empty() {
            anyhow::bail!("DYNUP_VAULT_TOKEN is required when DYNUP_CREDENTIALS=vault");
        }

        Ok(())
    }

    fn resolver_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig {
            timeout_secs: self.timeout_secs,
            ..ResolverConfig::default()
        };
        if let Some(endpoints) = &self.echo_endpoints {
            config.endpoints = endpoints.clone();
        }
        config
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 label checks; not comprehensive but catches the common
/// paste errors.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.len() > 253 {
        anyhow::bail!("domain name too long: {} chars (max 253)", domain.len());
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("domain name has empty label: '{}'", domain);
        }
        if label.len() > 63 {
            anyhow::bail!("domain label too long: {} chars (max 63). Label: '{}'", label.len(), label);
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            anyhow::bail!(
                "domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }
        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!("domain label cannot start or end with hyphen. Label: '{}'", label);
        }
    }

    Ok(())
}

/// Credentials taken directly from the environment at startup
struct EnvCredentials {
    credentials: Credentials,
}

#[async_trait]
impl CredentialsSource for EnvCredentials {
    async fn credentials(&self) -> dynup_core::Result<Credentials> {
        Ok(self.credentials.clone())
    }
}

fn credentials_source(config: &Config) -> Result<Box<dyn CredentialsSource>> {
    match config.credentials_mode {
        CredentialsMode::Env => Ok(Box::new(EnvCredentials {
            credentials: Credentials {
                api_token: config.api_token.clone().unwrap_or_default(),
                zone_name: config.zone_name.clone().unwrap_or_default(),
                record_name: config.record_name.clone().unwrap_or_default(),
            },
        })),
        CredentialsMode::Vault => vault_source(config),
    }
}

#[cfg(feature = "vault")]
fn vault_source(config: &Config) -> Result<Box<dyn CredentialsSource>> {
    let mut source = dynup_credentials_vault::VaultCredentials::new(
        config.vault_addr.clone().unwrap_or_default(),
        config.vault_token.clone().unwrap_or_default(),
    )?;
    if let Some(mount) = &config.vault_mount {
        source = source.with_mount(mount.clone());
    }
    if let Some(path) = &config.vault_path {
        source = source.with_secret_path(path.clone());
    }
    Ok(Box::new(source))
}

#[cfg(not(feature = "vault"))]
fn vault_source(_config: &Config) -> Result<Box<dyn CredentialsSource>> {
    anyhow::bail!("this build has no Vault support; rebuild with the 'vault' feature")
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return UpdaterExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return UpdaterExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return UpdaterExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config).await {
            Ok(Outcome::UpToDate { ip }) => {
                info!("nothing to do: record already points at {}", ip);
                UpdaterExitCode::Success
            }
            Ok(Outcome::Updated { previous, new }) => {
                info!("record updated: {} -> {}", previous, new);
                UpdaterExitCode::Success
            }
            Err(e) => {
                error!("update run failed: {:#}", e);
                UpdaterExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Wire the components and run one reconcile pass
async fn run(config: Config) -> Result<Outcome> {
    let credentials = credentials_source(&config)?.credentials().await?;

    let ip_source = ConsensusIpSource::new(config.resolver_config())?;
    let provider = CloudflareProvider::new(credentials.api_token, credentials.zone_name)?;

    let reconciler = Reconciler::new(
        Box::new(ip_source),
        Box::new(provider),
        credentials.record_name,
    );

    Ok(reconciler.run().await?)
}
