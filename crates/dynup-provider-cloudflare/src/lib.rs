// # Cloudflare DNS Provider
//
// Implements `dynup_core::DnsProvider` against the Cloudflare v4 REST API.
//
// - Zone id is resolved by name, once per run, and carried on the returned
//   record so the update never repeats the search.
// - Updates replace the content field only; type, name, TTL and proxied flag
//   are sent back unchanged.
// - Single-shot and stateless: no retries, no caching, no background tasks.
//   Failures propagate to the reconciler, where they are fatal.
// - The API token never appears in logs or Debug output.
//
// API reference:
// - List Zones:        GET `/zones?name=...`
// - List DNS Records:  GET `/zones/:zone_id/dns_records?name=...&type=A`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use dynup_core::error::{Error, Result};
use dynup_core::traits::{ARecord, DnsProvider};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::debug;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// HTTP timeout for API requests
const API_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "cloudflare";

/// Cloudflare DNS provider
pub struct CloudflareProvider {
    /// API token; never logged
    api_token: String,

    /// Zone name the managed record lives in
    zone_name: String,

    /// API base URL, overridable for tests
    api_base: String,

    client: reqwest::Client,
}

// Keeps the token out of Debug output.
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_name", &self.zone_name)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Standard Cloudflare response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ZonePayload {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RecordPayload {
    id: String,
    zone_id: String,
    name: String,
    content: String,
    ttl: u32,
    #[serde(default)]
    proxied: bool,
}

/// PUT body for a record update; everything but `content` mirrors the
/// existing record.
#[derive(Debug, Serialize)]
struct UpdatePayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: String,
    ttl: u32,
    proxied: bool,
}

impl CloudflareProvider {
    /// Create a provider for one zone
    ///
    /// # Parameters
    ///
    /// - `api_token`: token with Zone:Read and DNS:Edit permissions
    /// - `zone_name`: zone containing the managed record
    pub fn new(api_token: impl Into<String>, zone_name: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            zone_name: zone_name.into(),
            api_base: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Override the API base URL (tests point this at a local server)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Resolve the zone id for the configured zone name
    async fn zone_id(&self) -> Result<String> {
        debug!("looking up zone id for {}", self.zone_name);

        let url = format!("{}/zones?name={}", self.api_base, self.zone_name);
        let zones: Vec<ZonePayload> = self.get_envelope(&url, "zone lookup").await?;

        let zone = zones
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("zone not found: {}", self.zone_name)))?;

        debug!("zone {} has id {}", self.zone_name, zone.id);
        Ok(zone.id)
    }

    /// GET a URL and unwrap the Cloudflare envelope
    async fn get_envelope<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))?;

        unwrap_envelope(response, context).await
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn find_a_record(&self, record_name: &str) -> Result<ARecord> {
        let zone_id = self.zone_id().await?;

        let url = format!(
            "{}/zones/{}/dns_records?name={}&type=A",
            self.api_base, zone_id, record_name
        );
        let records: Vec<RecordPayload> = self.get_envelope(&url, "record lookup").await?;

        // Several A-records under one name would be a round-robin set the
        // updater does not manage; the first one is the managed record.
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("no A record found for {}", record_name)))?;

        let content: Ipv4Addr = record.content.parse().map_err(|_| {
            Error::provider(
                PROVIDER,
                format!("A record {} has non-IPv4 content: {}", record.name, record.content),
            )
        })?;

        Ok(ARecord {
            id: record.id,
            zone_id: record.zone_id,
            name: record.name,
            content,
            ttl: record.ttl,
            proxied: record.proxied,
        })
    }

    async fn update_a_record(&self, record: &ARecord, new_ip: Ipv4Addr) -> Result<()> {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.api_base, record.zone_id, record.id
        );

        let payload = UpdatePayload {
            record_type: "A",
            name: &record.name,
            content: new_ip.to_string(),
            ttl: record.ttl,
            proxied: record.proxied,
        };

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))?;

        let _updated: RecordPayload = unwrap_envelope(response, "record update").await?;

        debug!("record {} updated to {}", record.name, new_ip);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Check the HTTP status, then parse and unwrap the response envelope
async fn unwrap_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::provider(PROVIDER, format!("failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(status_error(context, status, &body));
    }

    let envelope: Envelope<T> = serde_json::from_str(&body)?;

    if !envelope.success {
        let causes: Vec<String> = envelope
            .errors
            .iter()
            .map(|e| format!("{} (code {})", e.message, e.code))
            .collect();
        return Err(Error::provider(
            PROVIDER,
            format!("{} rejected by API: {}", context, causes.join("; ")),
        ));
    }

    envelope
        .result
        .ok_or_else(|| Error::provider(PROVIDER, format!("{} returned no result", context)))
}

/// Map an HTTP error status to the error taxonomy
fn status_error(context: &str, status: reqwest::StatusCode, body: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::provider(
            PROVIDER,
            format!(
                "authentication failed: invalid API token or insufficient permissions ({})",
                status
            ),
        ),
        404 => Error::not_found(format!("{}: {}", context, status)),
        429 => Error::provider(PROVIDER, format!("rate limited by the API ({})", status)),
        500..=599 => Error::provider(
            PROVIDER,
            format!("server error (transient): {} - {}", status, body),
        ),
        _ => Error::provider(PROVIDER, format!("{} failed: {} - {}", context, status, body)),
    }
}
