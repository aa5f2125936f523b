// Read-only queries against the container host layer

mod lxc;

pub use lxc::LxcHost;

use crate::error::CollectError;
use std::fmt;

/// Host-assigned container identifier, as printed by the listing command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Interface to the container host tooling.
///
/// Every call may spawn an external process and wait for it to exit. No
/// interpretation of the returned text happens here and nothing is retried.
#[async_trait::async_trait]
pub trait HostQuery: Send + Sync + 'static {
    /// Active container identifiers in host-reported order. Empty when none
    /// are running; `HostUnavailable` when the tooling cannot run at all.
    async fn list_active_containers(&self) -> Result<Vec<ContainerId>, CollectError>;

    /// Raw resource-statistics text for one container.
    async fn fetch_stats(&self, id: &ContainerId) -> Result<String, CollectError>;

    /// Raw network-address text for one container.
    async fn fetch_addresses(&self, id: &ContainerId) -> Result<String, CollectError>;
}

/// Split listing output into identifiers: one per line, blank lines ignored.
pub fn parse_container_list(text: &str) -> Vec<ContainerId> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ContainerId::from)
        .collect()
}
