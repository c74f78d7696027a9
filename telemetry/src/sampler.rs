//! Fetches one reading set from one host.
//!
//! Proxied hosts are read over HTTP. Everything else goes through the system
//! `ssh` client, bounded by a connect timeout (handed to ssh itself) and an
//! overall session timeout measured from the moment the client is spawned.

use crate::error::{Result, TelemetryError};
use crate::host::{FetchStrategy, HostConfig, RemoteParams};
use crate::normalizer::{self, DEVICE_QUERY};
use crate::reading::Sample;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// ssh reserves this exit status for its own failures.
const SSH_ERROR_EXIT: i32 = 255;

#[async_trait]
pub trait Sampler: Send + Sync {
    async fn fetch(&self, host: &HostConfig) -> Result<Sample>;
}

#[derive(Debug, Clone)]
pub struct SamplerSettings {
    pub ssh_program: String,
    pub default_username: Option<String>,
    pub default_key_path: Option<PathBuf>,
    pub connect_timeout: Duration,
    pub session_timeout: Duration,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".into(),
            default_username: None,
            default_key_path: None,
            connect_timeout: Duration::from_secs(5),
            session_timeout: Duration::from_secs(15),
        }
    }
}

/// The production sampler: HTTP for proxied hosts, ssh for the rest.
#[derive(Clone)]
pub struct RemoteSampler {
    http: reqwest::Client,
    settings: SamplerSettings,
}

impl RemoteSampler {
    pub fn new(settings: SamplerSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.session_timeout)
            .build()?;
        Ok(Self { http, settings })
    }

    async fn fetch_proxy(&self, url: &str) -> Result<Sample> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TelemetryError::Transport(format!(
                "proxy {url} answered {status}"
            )));
        }
        let body: Value = resp.json().await?;
        Ok(Sample::Proxied(body))
    }

    fn ssh_command(&self, params: &RemoteParams) -> Command {
        let connect_secs = self.settings.connect_timeout.as_secs_f64().ceil().max(1.0) as u64;

        let mut cmd = Command::new(&self.settings.ssh_program);
        cmd.args(["-o", "BatchMode=yes"])
            .arg("-o")
            .arg(format!("ConnectTimeout={connect_secs}"))
            .args(["-o", "StrictHostKeyChecking=accept-new"]);

        let key = params
            .private_key_path
            .as_ref()
            .or(self.settings.default_key_path.as_ref());
        if let Some(key) = key {
            cmd.arg("-i").arg(key);
        }

        let user = params
            .username
            .as_ref()
            .or(self.settings.default_username.as_ref());
        if let Some(user) = user {
            cmd.arg("-l").arg(user);
        }

        cmd.arg(&params.address).arg(DEVICE_QUERY);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn fetch_remote(&self, host: &str, params: &RemoteParams) -> Result<Sample> {
        let started = Instant::now();

        let child = self
            .ssh_command(params)
            .spawn()
            .map_err(|e| TelemetryError::Connection {
                host: host.to_string(),
                reason: format!("cannot start {}: {e}", self.settings.ssh_program),
            })?;

        // On expiry the child is dropped with the future, which kills the session.
        let waited = timeout(self.settings.session_timeout, child.wait_with_output()).await;
        let output = match waited {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(TelemetryError::Connection {
                    host: host.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                warn!(host, elapsed = ?started.elapsed(), "remote session aborted");
                return Err(TelemetryError::Timeout {
                    host: host.to_string(),
                    after: self.settings.session_timeout,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            warn!(host, "remote stderr: {line}");
        }

        if output.status.code() == Some(SSH_ERROR_EXIT) && stdout.trim().is_empty() {
            return Err(self.classify_ssh_failure(host, &stderr));
        }

        debug!(host, elapsed = ?started.elapsed(), "remote query finished");
        normalizer::parse_output(&stdout).map(Sample::Devices)
    }

    fn classify_ssh_failure(&self, host: &str, stderr: &str) -> TelemetryError {
        let reason = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("ssh exited without output")
            .trim()
            .to_string();

        if reason.to_lowercase().contains("timed out") {
            TelemetryError::Timeout {
                host: host.to_string(),
                after: self.settings.connect_timeout,
            }
        } else {
            TelemetryError::Connection {
                host: host.to_string(),
                reason,
            }
        }
    }
}

#[async_trait]
impl Sampler for RemoteSampler {
    async fn fetch(&self, host: &HostConfig) -> Result<Sample> {
        match host.strategy() {
            FetchStrategy::Proxy(url) => self.fetch_proxy(&url).await,
            FetchStrategy::Remote(params) => self.fetch_remote(&host.name, &params).await,
        }
    }
}
