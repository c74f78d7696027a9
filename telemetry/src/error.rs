use std::time::Duration;

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Everything that can go wrong between reaching a host and persisting its summary.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("host not found in configuration: {0}")]
    UnknownHost(String),

    #[error("invalid host configuration: {0}")]
    Config(String),

    #[error("proxy request failed: {0}")]
    Transport(String),

    #[error("connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },

    #[error("session with {host} timed out after {after:?}")]
    Timeout { host: String, after: Duration },

    #[error("malformed device output at line {line}: {field}")]
    Parse { line: usize, field: String },

    #[error("history storage error: {0}")]
    Storage(String),
}

impl TelemetryError {
    pub(crate) fn parse(line: usize, field: impl Into<String>) -> Self {
        Self::Parse {
            line,
            field: field.into(),
        }
    }
}

impl From<reqwest::Error> for TelemetryError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
