//! Test doubles for reconciler contract tests
//!
//! Minimal counting doubles; none of them perform I/O.

use async_trait::async_trait;
use dynup_core::error::{Error, Result};
use dynup_core::traits::{ARecord, DnsProvider, IpSource};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An IP source that always resolves to a fixed address
pub struct FixedIpSource {
    ip: Ipv4Addr,
    call_count: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current_v4() was called
    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpSource for FixedIpSource {
    async fn current_v4(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }
}

/// An IP source where every endpoint has failed
pub struct FailingIpSource;

#[async_trait]
impl IpSource for FailingIpSource {
    async fn current_v4(&self) -> Result<Ipv4Addr> {
        Err(Error::AllSourcesFailed)
    }
}

/// A mock DnsProvider serving one in-memory record and tracking calls
pub struct MockDnsProvider {
    record: Option<ARecord>,
    find_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    /// (record as passed in, new ip) per update call
    updates: Arc<std::sync::Mutex<Vec<(ARecord, Ipv4Addr)>>>,
}

impl MockDnsProvider {
    /// Provider holding the given record
    pub fn with_record(record: ARecord) -> Self {
        Self {
            record: Some(record),
            find_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Provider with no record for any name
    pub fn empty() -> Self {
        Self {
            record: None,
            find_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Get the number of times find_a_record() was called
    #[allow(dead_code)]
    pub fn find_call_count(&self) -> usize {
        self.find_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times update_a_record() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Get the recorded update calls
    #[allow(dead_code)]
    pub fn updates(&self) -> Vec<(ARecord, Ipv4Addr)> {
        self.updates.lock().unwrap().clone()
    }

    /// Create a new MockDnsProvider that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            record: other.record.clone(),
            find_call_count: Arc::clone(&other.find_call_count),
            update_call_count: Arc::clone(&other.update_call_count),
            updates: Arc::clone(&other.updates),
        }
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    async fn find_a_record(&self, record_name: &str) -> Result<ARecord> {
        self.find_call_count.fetch_add(1, Ordering::SeqCst);
        match &self.record {
            Some(record) if record.name == record_name => Ok(record.clone()),
            _ => Err(Error::not_found(record_name)),
        }
    }

    async fn update_a_record(&self, record: &ARecord, new_ip: Ipv4Addr) -> Result<()> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push((record.clone(), new_ip));
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to build a plausible A-record for tests
pub fn a_record(name: &str, content: Ipv4Addr) -> ARecord {
    ARecord {
        id: "rec-1".to_string(),
        zone_id: "zone-1".to_string(),
        name: name.to_string(),
        content,
        ttl: 300,
        proxied: false,
    }
}
