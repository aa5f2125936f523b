// Error taxonomy for a collection pass

use crate::host_query::ContainerId;
use thiserror::Error;

/// Failure of a single host command.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Exit {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("`{command}` timed out after {timeout_ms} ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("I/O error while waiting for `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by the collection pipeline.
///
/// Only [`CollectError::HostUnavailable`] aborts a pass; the other variants are
/// recovered locally and reported through logs and counters.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("container host unavailable: {reason}")]
    HostUnavailable { reason: String },

    #[error("query for container {id} failed: {reason}")]
    ContainerQueryFailed { id: ContainerId, reason: String },

    #[error("metric {metric} for container {id} is not numeric: {value:?}")]
    MetricValueNotNumeric {
        id: ContainerId,
        metric: &'static str,
        value: String,
    },
}

impl CollectError {
    /// True only for errors that abort the whole collection pass.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollectError::HostUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_host_unavailable_is_fatal() {
        let id = ContainerId::from("101");
        assert!(CollectError::HostUnavailable { reason: "gone".into() }.is_fatal());
        assert!(!CollectError::ContainerQueryFailed { id: id.clone(), reason: "exited".into() }.is_fatal());
        assert!(
            !CollectError::MetricValueNotNumeric { id, metric: "cpu", value: "n/a".into() }.is_fatal()
        );
    }
}
