// Shared test helpers: an in-memory HostQuery

#![allow(dead_code)]

use lxc_exporter::config::CollectorConfig;
use lxc_exporter::error::CollectError;
use lxc_exporter::host_query::{ContainerId, HostQuery};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const FULL_STATS: &str = "State: RUNNING\nCPU use: 1500\nMemory use: 2048\nKMem use: 12\nLink: vethA1\n TX bytes: 30\n RX bytes: 40\n Total bytes: 70\nBlkIO use: 0\n";

#[derive(Clone, Default)]
struct MockContainer {
    stats: Option<String>,
    addresses: Option<String>,
    delay: Duration,
    failures_left: usize,
}

/// Scriptable host: listing, per-container text, failures and delays.
/// Containers that are listed but not scripted fail their queries.
#[derive(Default)]
pub struct MockHost {
    listing: Mutex<Option<Vec<String>>>,
    listing_delay: Mutex<Duration>,
    containers: Mutex<HashMap<String, MockContainer>>,
    stats_calls: AtomicUsize,
}

impl MockHost {
    pub fn new(ids: &[&str]) -> Self {
        let host = Self::default();
        host.set_listing(Some(ids));
        host
    }

    /// Listing fails with HostUnavailable.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set_listing(&self, ids: Option<&[&str]>) {
        *self.listing.lock().unwrap() = ids.map(|ids| ids.iter().map(|s| s.to_string()).collect());
    }

    /// Listing answers only after `delay`.
    pub fn with_listing_delay(self, delay: Duration) -> Self {
        *self.listing_delay.lock().unwrap() = delay;
        self
    }

    pub fn with_container(self, id: &str, stats: &str, addresses: &str) -> Self {
        self.set_container(id, stats, addresses);
        self
    }

    pub fn set_container(&self, id: &str, stats: &str, addresses: &str) {
        self.containers.lock().unwrap().insert(
            id.to_string(),
            MockContainer {
                stats: Some(stats.to_string()),
                addresses: Some(addresses.to_string()),
                ..Default::default()
            },
        );
    }

    /// Stats succeed, address query fails.
    pub fn with_address_failure(self, id: &str, stats: &str) -> Self {
        self.containers.lock().unwrap().insert(
            id.to_string(),
            MockContainer {
                stats: Some(stats.to_string()),
                addresses: None,
                ..Default::default()
            },
        );
        self
    }

    pub fn with_delay(self, id: &str, delay: Duration) -> Self {
        if let Some(c) = self.containers.lock().unwrap().get_mut(id) {
            c.delay = delay;
        }
        self
    }

    /// The next `failures` stats queries for `id` fail before it starts answering.
    pub fn with_transient_failures(self, id: &str, failures: usize) -> Self {
        if let Some(c) = self.containers.lock().unwrap().get_mut(id) {
            c.failures_left = failures;
        }
        self
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    fn failed(id: &ContainerId, reason: &str) -> CollectError {
        CollectError::ContainerQueryFailed {
            id: id.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl HostQuery for MockHost {
    async fn list_active_containers(&self) -> Result<Vec<ContainerId>, CollectError> {
        let delay = *self.listing_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match &*self.listing.lock().unwrap() {
            Some(ids) => Ok(ids.iter().map(|id| ContainerId::from(id.as_str())).collect()),
            None => Err(CollectError::HostUnavailable {
                reason: "lxc-ls: No such file or directory".into(),
            }),
        }
    }

    async fn fetch_stats(&self, id: &ContainerId) -> Result<String, CollectError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        let delay = {
            let mut containers = self.containers.lock().unwrap();
            let c = containers
                .get_mut(id.as_str())
                .ok_or_else(|| Self::failed(id, "container not running"))?;
            if c.failures_left > 0 {
                c.failures_left -= 1;
                return Err(Self::failed(id, "transient failure"));
            }
            c.delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.containers
            .lock()
            .unwrap()
            .get(id.as_str())
            .and_then(|c| c.stats.clone())
            .ok_or_else(|| Self::failed(id, "stats unavailable"))
    }

    async fn fetch_addresses(&self, id: &ContainerId) -> Result<String, CollectError> {
        self.containers
            .lock()
            .unwrap()
            .get(id.as_str())
            .and_then(|c| c.addresses.clone())
            .ok_or_else(|| Self::failed(id, "addresses unavailable"))
    }
}

pub fn collector_config(container_timeout_ms: u64, max_concurrency: usize, retries: u32) -> CollectorConfig {
    CollectorConfig {
        list_timeout_ms: 2_000,
        container_timeout_ms,
        max_concurrency,
        retries,
    }
}
