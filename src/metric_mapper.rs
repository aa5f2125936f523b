// Map parsed statistics onto the public metric schema.

use crate::error::CollectError;
use crate::host_query::ContainerId;
use crate::stats_parser::{ContainerAddress, RawStatRecord, RawValue};

/// Public metric name to source statistic key, in output order.
pub const METRIC_TABLE: &[(&str, &str)] = &[
    ("cpu", "CPU use"),
    ("memory", "Memory use"),
    ("total_bytes", "Total bytes"),
    ("rx_bytes", "RX bytes"),
    ("tx_bytes", "TX bytes"),
    ("io", "BlkIO use"),
];

/// One labeled observation for one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSample {
    pub metric: &'static str,
    pub id: ContainerId,
    pub address: ContainerAddress,
    pub value: u64,
}

/// Samples for one container plus the mapped keys that held non-numeric values.
#[derive(Debug, Default)]
pub struct MappedContainer {
    pub samples: Vec<MetricSample>,
    pub skipped: Vec<CollectError>,
}

#[derive(Debug, Clone)]
pub struct MetricMapper {
    table: &'static [(&'static str, &'static str)],
}

impl Default for MetricMapper {
    fn default() -> Self {
        Self::new(METRIC_TABLE)
    }
}

impl MetricMapper {
    pub fn new(table: &'static [(&'static str, &'static str)]) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static [(&'static str, &'static str)] {
        self.table
    }

    /// Emit at most one sample per table entry, in table order. Absent keys
    /// are skipped silently; non-numeric values are skipped and reported.
    pub fn map(
        &self,
        record: &RawStatRecord,
        id: &ContainerId,
        address: &ContainerAddress,
    ) -> MappedContainer {
        let mut out = MappedContainer::default();
        for &(metric, source_key) in self.table {
            match record.get(source_key) {
                None => {}
                Some(RawValue::Integer(value)) => out.samples.push(MetricSample {
                    metric,
                    id: id.clone(),
                    address: address.clone(),
                    value: *value,
                }),
                Some(RawValue::Text(text)) => {
                    let err = CollectError::MetricValueNotNumeric {
                        id: id.clone(),
                        metric,
                        value: text.clone(),
                    };
                    tracing::warn!(error = %err, operation = "map_metrics", "skipping sample");
                    out.skipped.push(err);
                }
            }
        }
        out
    }
}
