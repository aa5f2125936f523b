use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub host: HostConfig,
    pub collector: CollectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path the snapshot is served under.
    pub metrics_path: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        let ip: std::net::IpAddr = self
            .host
            .parse()
            .map_err(|e| anyhow::anyhow!("server.host must be an IP address, got {:?}: {}", self.host, e))?;
        Ok(std::net::SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "::".into(),
            port: 9119,
            metrics_path: "/metrics".into(),
        }
    }
}

/// Host tooling invoked by [`crate::host_query::LxcHost`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub lxc_ls: String,
    pub lxc_info: String,
    /// Upper bound for a single spawned command; the child is killed after it.
    pub command_timeout_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            lxc_ls: "lxc-ls".into(),
            lxc_info: "lxc-info".into(),
            command_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Deadline for listing active containers; expiry fails the whole pass.
    pub list_timeout_ms: u64,
    /// Deadline for one container's stats + address queries (all attempts).
    pub container_timeout_ms: u64,
    /// Containers queried in parallel per scrape.
    pub max_concurrency: usize,
    /// Extra attempts after a failed container query. Timeouts are not retried.
    pub retries: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            list_timeout_ms: 10_000,
            container_timeout_ms: 10_000,
            max_concurrency: 8,
            retries: 0,
        }
    }
}

impl AppConfig {
    /// Load from `CONFIG_FILE`, else `config.toml`. Built-in defaults apply
    /// only when `CONFIG_FILE` is unset and `config.toml` does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = match std::env::var("CONFIG_FILE") {
            Ok(path) => path,
            Err(_) if !std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
                tracing::info!("{} not found, using built-in defaults", DEFAULT_CONFIG_PATH);
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(_) => DEFAULT_CONFIG_PATH.into(),
        };
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        self.server.socket_addr()?;
        anyhow::ensure!(
            self.server.metrics_path.starts_with('/')
                && !matches!(self.server.metrics_path.as_str(), "/" | "/version"),
            "server.metrics_path must start with '/' and not be '/' or '/version', got {:?}",
            self.server.metrics_path
        );
        anyhow::ensure!(
            !self.server.metrics_path.contains(['{', '}']),
            "server.metrics_path must not contain route parameters ('{{' or '}}'), got {:?}",
            self.server.metrics_path
        );
        anyhow::ensure!(!self.host.lxc_ls.is_empty(), "host.lxc_ls must be non-empty");
        anyhow::ensure!(
            !self.host.lxc_info.is_empty(),
            "host.lxc_info must be non-empty"
        );
        anyhow::ensure!(
            self.host.command_timeout_ms > 0,
            "host.command_timeout_ms must be > 0, got {}",
            self.host.command_timeout_ms
        );
        anyhow::ensure!(
            self.collector.list_timeout_ms > 0,
            "collector.list_timeout_ms must be > 0, got {}",
            self.collector.list_timeout_ms
        );
        anyhow::ensure!(
            self.collector.container_timeout_ms > 0,
            "collector.container_timeout_ms must be > 0, got {}",
            self.collector.container_timeout_ms
        );
        anyhow::ensure!(
            self.collector.max_concurrency > 0,
            "collector.max_concurrency must be > 0, got {}",
            self.collector.max_concurrency
        );
        Ok(())
    }
}
