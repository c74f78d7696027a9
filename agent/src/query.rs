//! Runs the device query on this machine.

use std::process::Stdio;
use std::time::Duration;
use telemetry::{GpuReading, TelemetryError, normalizer};
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// Form-factor suffix some datacenter boards append to their name.
const FORM_FACTOR_SUFFIX: &str = "-SXM2-32GB";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to start device query: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("device query timed out after {0:?}")]
    Timeout(Duration),

    #[error("device query exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error(transparent)]
    Parse(#[from] TelemetryError),
}

/// A shell command whose stdout is nvidia-smi CSV, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct LocalQuery {
    command: String,
    timeout: Duration,
}

impl LocalQuery {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// The stock nvidia-smi query.
    pub fn nvidia_smi(timeout: Duration) -> Self {
        Self::new(normalizer::DEVICE_QUERY, timeout)
    }

    pub async fn run(&self) -> Result<Vec<GpuReading>, QueryError> {
        let child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| QueryError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(QueryError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let readings = normalizer::parse_with(stdout.trim().lines(), |name| {
            name.replace(FORM_FACTOR_SUFFIX, "")
        })?;
        Ok(readings)
    }
}
