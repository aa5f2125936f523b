// Text exposition of a snapshot plus the exporter's own metrics.

use crate::collector::{Snapshot, SnapshotCollector};
use crate::error::CollectError;
use crate::metric_mapper::MetricSample;
use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

pub const METRIC_PREFIX: &str = "node_lxc_";
const NAMESPACE: &str = "node_lxc";

/// Runs a collection pass per scrape and renders it. The exporter's own
/// metrics live in a prometheus registry and survive across scrapes.
pub struct Exporter {
    collector: SnapshotCollector,
    registry: Registry,
    up: IntGauge,
    scrape_failures_total: IntCounter,
    container_failures_total: IntCounter,
}

impl Exporter {
    pub fn new(collector: SnapshotCollector) -> prometheus::Result<Self> {
        let registry = Registry::new();
        let up = IntGauge::with_opts(
            Opts::new("up", "Whether the last scrape could list containers").namespace(NAMESPACE),
        )?;
        let scrape_failures_total = IntCounter::with_opts(
            Opts::new(
                "exporter_scrape_failures_total",
                "Scrapes that failed because the container host was unavailable",
            )
            .namespace(NAMESPACE),
        )?;
        let container_failures_total = IntCounter::with_opts(
            Opts::new(
                "exporter_container_failures_total",
                "Containers excluded from a scrape because their query failed or timed out",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(scrape_failures_total.clone()))?;
        registry.register(Box::new(container_failures_total.clone()))?;
        Ok(Self {
            collector,
            registry,
            up,
            scrape_failures_total,
            container_failures_total,
        })
    }

    /// Collect and render. A `HostUnavailable` pass yields no body at all.
    pub async fn scrape(&self) -> Result<String, CollectError> {
        match self.collector.collect().await {
            Ok(snapshot) => {
                self.up.set(1);
                self.container_failures_total
                    .inc_by(snapshot.containers_failed as u64);
                let mut body = render_snapshot(&snapshot);
                self.render_self_metrics(&mut body);
                Ok(body)
            }
            Err(e) => {
                self.up.set(0);
                self.scrape_failures_total.inc();
                tracing::error!(error = %e, operation = "scrape", "scrape failed");
                Err(e)
            }
        }
    }

    pub fn scrape_failures_total(&self) -> u64 {
        self.scrape_failures_total.get()
    }

    pub fn container_failures_total(&self) -> u64 {
        self.container_failures_total.get()
    }

    fn render_self_metrics(&self, out: &mut String) {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            tracing::warn!(error = %e, operation = "encode_self_metrics", "self metrics skipped");
            return;
        }
        out.push_str(&String::from_utf8_lossy(&buf));
    }
}

/// One line per sample, in snapshot order.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::with_capacity(snapshot.samples.len() * 64);
    for sample in &snapshot.samples {
        out.push_str(&format_sample(sample));
    }
    out
}

/// `node_lxc_<metric>{id="<id>", ip="<ip>"} <value>` with a trailing newline.
/// A container without an address renders `ip=""`.
pub fn format_sample(sample: &MetricSample) -> String {
    format!(
        "{}{}{{id=\"{}\", ip=\"{}\"}} {}\n",
        METRIC_PREFIX,
        sample.metric,
        escape_label_value(sample.id.as_str()),
        escape_label_value(sample.address.as_label()),
        sample.value
    )
}

fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}
