// HostQuery backed by the LXC command-line tools (lxc-ls, lxc-info).

use super::{ContainerId, HostQuery, parse_container_list};
use crate::config::HostConfig;
use crate::error::{CollectError, HostError};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::instrument;

pub struct LxcHost {
    lxc_ls: String,
    lxc_info: String,
    command_timeout: Duration,
}

impl LxcHost {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            lxc_ls: config.lxc_ls.clone(),
            lxc_info: config.lxc_info.clone(),
            command_timeout: Duration::from_millis(config.command_timeout_ms),
        }
    }

    async fn lxc_info(&self, id: &ContainerId, flags: &[&str]) -> Result<String, CollectError> {
        let args: Vec<&str> = flags.iter().copied().chain(["-n", id.as_str()]).collect();
        run_command(&self.lxc_info, &args, self.command_timeout)
            .await
            .map_err(|e| CollectError::ContainerQueryFailed {
                id: id.clone(),
                reason: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl HostQuery for LxcHost {
    #[instrument(skip(self), fields(host = "lxc", operation = "list_active_containers"))]
    async fn list_active_containers(&self) -> Result<Vec<ContainerId>, CollectError> {
        let out = run_command(&self.lxc_ls, &["--active", "-1"], self.command_timeout)
            .await
            .map_err(|e| CollectError::HostUnavailable {
                reason: e.to_string(),
            })?;
        Ok(parse_container_list(&out))
    }

    async fn fetch_stats(&self, id: &ContainerId) -> Result<String, CollectError> {
        self.lxc_info(id, &["-S", "-H"]).await
    }

    async fn fetch_addresses(&self, id: &ContainerId) -> Result<String, CollectError> {
        self.lxc_info(id, &["-i"]).await
    }
}

/// Run `program args..`, returning stdout. The deadline covers both the exit
/// and reading the output; on expiry the child is killed when its future drops.
/// Output is decoded lossily; host tools may print non-UTF-8 names.
pub(crate) async fn run_command(
    program: &str,
    args: &[&str],
    limit: Duration,
) -> Result<String, HostError> {
    let command = if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    };

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| HostError::Spawn {
            command: command.clone(),
            source,
        })?;

    let output = timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| HostError::Timeout {
            command: command.clone(),
            timeout_ms: limit.as_millis() as u64,
        })?
        .map_err(|source| HostError::Io {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(HostError::Exit {
            command,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
