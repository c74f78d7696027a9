//! GPU telemetry acquisition and retention.
//!
//! The write path is `Poller` → `Sampler` → `normalizer` → `HistoryStore`.
//! Live reads go straight through a `Sampler`; history reads go through
//! `HistoryStore::read_aggregated`.

pub mod error;
pub mod history;
pub mod host;
pub mod normalizer;
pub mod reading;
pub mod sampler;
pub mod scheduler;

pub use error::{Result, TelemetryError};
pub use history::{AggregatedEntry, FileHistoryStore, HistoryEntry, HistoryStore, RETENTION_DAYS};
pub use host::{FetchStrategy, HostConfig, HostRegistry, RemoteParams};
pub use reading::{GpuReading, Sample};
pub use sampler::{RemoteSampler, Sampler, SamplerSettings};
pub use scheduler::{Poller, SweepOutcome};
