//! Rolling per-host history, one JSON file per host.
//!
//! Entries older than the retention horizon are dropped on every write and
//! filtered again on every read. A missing or unparseable file reads as an
//! empty history.

use crate::error::{Result, TelemetryError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const RETENTION_DAYS: i64 = 7;

/// One retained sample summary: per-device utilization in device order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub utilization: Vec<u32>,
}

impl HistoryEntry {
    /// Rejects empty utilization so every stored entry has an average and a max.
    pub fn new(timestamp: DateTime<Utc>, utilization: Vec<u32>) -> Result<Self> {
        if utilization.is_empty() {
            return Err(TelemetryError::parse(0, "sample has no devices"));
        }
        Ok(Self {
            timestamp,
            utilization,
        })
    }

    /// `None` only for an entry with no devices, which `new` never builds.
    pub fn aggregate(&self) -> Option<AggregatedEntry> {
        let max = *self.utilization.iter().max()?;
        let n = self.utilization.len() as u64;
        let sum: u64 = self.utilization.iter().map(|&u| u as u64).sum();
        // round half up: floor(sum / n + 1/2)
        let average = ((2 * sum + n) / (2 * n)) as u32;
        Some(AggregatedEntry {
            timestamp: self.timestamp,
            average_utilization: average,
            max_utilization: max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedEntry {
    pub timestamp: DateTime<Utc>,
    pub average_utilization: u32,
    pub max_utilization: u32,
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, host_ip: &str, entry: HistoryEntry) -> Result<()>;

    /// Aggregated view of the last `horizon` (capped at the retention horizon).
    async fn read_aggregated(&self, host_ip: &str, horizon: Duration) -> Result<Vec<AggregatedEntry>>;
}

/// Maps a host address to a filesystem-safe key: every non-alphanumeric
/// character becomes `_`.
pub fn sanitize_key(host_ip: &str) -> String {
    host_ip
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Drops entries older than `cutoff`. Idempotent.
pub fn prune(entries: &mut Vec<HistoryEntry>, cutoff: DateTime<Utc>) {
    entries.retain(|e| e.timestamp >= cutoff);
}

/// Keeps entries inside `[now - horizon, now]` and aggregates each one.
pub fn aggregate_window(
    entries: &[HistoryEntry],
    now: DateTime<Utc>,
    horizon: Duration,
) -> Vec<AggregatedEntry> {
    let from = now - horizon;
    entries
        .iter()
        .filter(|e| e.timestamp >= from && e.timestamp <= now)
        .filter_map(HistoryEntry::aggregate)
        .collect()
}

#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    root: PathBuf,
    retention: Duration,
}

impl FileHistoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            retention: Duration::days(RETENTION_DAYS),
        }
    }

    /// {root}/{sanitized-ip}_history.json
    pub fn path_for(&self, host_ip: &str) -> PathBuf {
        self.root.join(format!("{}_history.json", sanitize_key(host_ip)))
    }

    /// Reads a history file. Missing or corrupt files are an empty history;
    /// only I/O failures other than "not found" are errors.
    async fn load(&self, path: &Path) -> Result<Vec<HistoryEntry>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no history yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(TelemetryError::Storage(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };

        let items = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable history, treating as empty");
                return Ok(Vec::new());
            }
        };

        let total = items.len();
        let entries: Vec<HistoryEntry> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<HistoryEntry>(item).ok())
            .filter(|e| !e.utilization.is_empty())
            .collect();
        if entries.len() < total {
            warn!(path = %path.display(), dropped = total - entries.len(), "skipped malformed history entries");
        }
        Ok(entries)
    }

    /// Replaces the file through a sibling temp file so readers never see a partial write.
    async fn store(&self, path: &Path, entries: &[HistoryEntry]) -> Result<()> {
        let storage = |e: std::io::Error| {
            TelemetryError::Storage(format!("cannot write {}: {e}", path.display()))
        };

        tokio::fs::create_dir_all(&self.root).await.map_err(storage)?;
        let body = serde_json::to_string_pretty(entries)
            .map_err(|e| TelemetryError::Storage(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await.map_err(storage)?;
        tokio::fs::rename(&tmp, path).await.map_err(storage)?;
        Ok(())
    }

    pub(crate) async fn append_at(&self, host_ip: &str, entry: HistoryEntry, now: DateTime<Utc>) -> Result<()> {
        let path = self.path_for(host_ip);
        let mut entries = self.load(&path).await?;
        entries.push(entry);
        prune(&mut entries, now - self.retention);
        self.store(&path, &entries).await?;
        debug!(ip = host_ip, retained = entries.len(), "history appended");
        Ok(())
    }

    pub(crate) async fn read_aggregated_at(
        &self,
        host_ip: &str,
        horizon: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<AggregatedEntry>> {
        let entries = self.load(&self.path_for(host_ip)).await?;
        Ok(aggregate_window(&entries, now, horizon.min(self.retention)))
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn append(&self, host_ip: &str, entry: HistoryEntry) -> Result<()> {
        self.append_at(host_ip, entry, Utc::now()).await
    }

    async fn read_aggregated(&self, host_ip: &str, horizon: Duration) -> Result<Vec<AggregatedEntry>> {
        self.read_aggregated_at(host_ip, horizon, Utc::now()).await
    }
}
