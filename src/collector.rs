// One collection pass: list containers, query each concurrently, merge in listing order.

use crate::config::CollectorConfig;
use crate::error::CollectError;
use crate::host_query::{ContainerId, HostQuery};
use crate::metric_mapper::{MappedContainer, MetricMapper, MetricSample};
use crate::stats_parser::{parse_addresses, parse_stats, select_address};
use futures_util::StreamExt;
use futures_util::stream;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Samples from one pass, grouped by container in listing order.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub samples: Vec<MetricSample>,
    pub containers_listed: usize,
    /// Containers excluded because their query failed or timed out.
    pub containers_failed: usize,
    /// Mapped statistics dropped for holding a non-numeric value.
    pub samples_skipped: usize,
}

impl Snapshot {
    /// Distinct containers that contributed samples, in output order.
    pub fn container_ids(&self) -> Vec<&ContainerId> {
        let mut ids: Vec<&ContainerId> = Vec::new();
        for sample in &self.samples {
            if ids.last() != Some(&&sample.id) {
                ids.push(&sample.id);
            }
        }
        ids
    }
}

pub struct SnapshotCollector {
    host: Arc<dyn HostQuery>,
    mapper: MetricMapper,
    list_timeout: Duration,
    container_timeout: Duration,
    max_concurrency: usize,
    retries: u32,
}

impl SnapshotCollector {
    pub fn new(host: Arc<dyn HostQuery>, mapper: MetricMapper, config: &CollectorConfig) -> Self {
        Self {
            host,
            mapper,
            list_timeout: Duration::from_millis(config.list_timeout_ms),
            container_timeout: Duration::from_millis(config.container_timeout_ms),
            max_concurrency: config.max_concurrency.max(1),
            retries: config.retries,
        }
    }

    /// Run one pass. Fails only when the container listing itself fails;
    /// every per-container problem just drops that container's samples.
    #[instrument(skip(self), fields(operation = "collect"))]
    pub async fn collect(&self) -> Result<Snapshot, CollectError> {
        let started = Instant::now();
        let listed = tokio::time::timeout(self.list_timeout, self.host.list_active_containers())
            .await
            .map_err(|_| CollectError::HostUnavailable {
                reason: format!(
                    "listing timed out after {} ms",
                    self.list_timeout.as_millis()
                ),
            })?
            .map_err(|e| {
                if e.is_fatal() {
                    e
                } else {
                    CollectError::HostUnavailable {
                        reason: e.to_string(),
                    }
                }
            })?;
        let ids = dedup_in_order(listed);

        let containers_listed = ids.len();
        let results: Vec<(ContainerId, Result<MappedContainer, CollectError>)> =
            stream::iter(ids.into_iter().map(|id| self.collect_container(id)))
                .buffered(self.max_concurrency)
                .collect()
                .await;

        let mut snapshot = Snapshot {
            containers_listed,
            ..Default::default()
        };
        for (id, result) in results {
            match result {
                Ok(mapped) => {
                    snapshot.samples_skipped += mapped.skipped.len();
                    snapshot.samples.extend(mapped.samples);
                }
                Err(e) => {
                    snapshot.containers_failed += 1;
                    tracing::warn!(
                        error = %e,
                        container = %id,
                        operation = "collect_container",
                        "container excluded from snapshot"
                    );
                }
            }
        }

        tracing::debug!(
            containers_listed = snapshot.containers_listed,
            containers_failed = snapshot.containers_failed,
            samples = snapshot.samples.len(),
            samples_skipped = snapshot.samples_skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collection pass finished"
        );
        Ok(snapshot)
    }

    /// Query, parse and map one container under the per-container deadline.
    async fn collect_container(
        &self,
        id: ContainerId,
    ) -> (ContainerId, Result<MappedContainer, CollectError>) {
        let result = match tokio::time::timeout(self.container_timeout, self.fetch(&id)).await {
            Err(_) => Err(CollectError::ContainerQueryFailed {
                id: id.clone(),
                reason: format!(
                    "timed out after {} ms",
                    self.container_timeout.as_millis()
                ),
            }),
            Ok(Err(e)) => Err(e),
            Ok(Ok((stats_text, address_text))) => {
                let record = parse_stats(&stats_text);
                let address = select_address(&parse_addresses(&address_text));
                Ok(self.mapper.map(&record, &id, &address))
            }
        };
        (id, result)
    }

    /// Stats and addresses for one container, fetched together by one task.
    async fn fetch(&self, id: &ContainerId) -> Result<(String, String), CollectError> {
        let mut attempt = 0;
        loop {
            let result = async {
                let stats = self.host.fetch_stats(id).await?;
                let addresses = self.host.fetch_addresses(id).await?;
                Ok::<_, CollectError>((stats, addresses))
            }
            .await;

            match result {
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(error = %e, container = %id, attempt, "retrying container query");
                }
                other => return other,
            }
        }
    }
}

/// Drop repeated ids, keeping the first occurrence so listing order holds.
fn dedup_in_order(ids: Vec<ContainerId>) -> Vec<ContainerId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter()
        .filter(|id| {
            let fresh = seen.insert(id.clone());
            if !fresh {
                tracing::debug!(container = %id, "duplicate container in listing");
            }
            fresh
        })
        .collect()
}
