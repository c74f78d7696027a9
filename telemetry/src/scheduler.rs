//! Fleet sweeps: every configured host, one after another, on a fixed interval.

use crate::error::Result;
use crate::history::{HistoryEntry, HistoryStore};
use crate::host::{HostConfig, HostRegistry};
use crate::sampler::Sampler;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    Completed { recorded: usize, failed: usize },
    /// Another sweep was still running.
    Skipped,
}

/// Drives the sampler → normalizer → history pipeline for the whole fleet.
///
/// Sweeps are single-flight: one triggered while another is in progress is skipped.
#[derive(Clone)]
pub struct Poller {
    hosts: Arc<HostRegistry>,
    sampler: Arc<dyn Sampler>,
    store: Arc<dyn HistoryStore>,
    every: Duration,
    in_flight: Arc<Mutex<()>>,
}

impl Poller {
    pub fn new(
        hosts: Arc<HostRegistry>,
        sampler: Arc<dyn Sampler>,
        store: Arc<dyn HistoryStore>,
        every: Duration,
    ) -> Self {
        Self {
            hosts,
            sampler,
            store,
            every,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Samples one host and appends its summary. Nothing is stored on failure.
    pub async fn poll_host(&self, host: &HostConfig) -> Result<()> {
        let sample = self.sampler.fetch(host).await?;
        let entry = HistoryEntry::new(Utc::now(), sample.utilization()?)?;
        self.store.append(&host.ip, entry).await
    }

    /// One pass over every configured host, in configuration order.
    pub async fn sweep(&self) -> SweepOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("previous sweep still running, skipping this one");
            return SweepOutcome::Skipped;
        };

        let (mut recorded, mut failed) = (0, 0);
        for host in self.hosts.hosts() {
            match self.poll_host(host).await {
                Ok(()) => {
                    recorded += 1;
                    info!(host = %host.name, ip = %host.ip, "recorded GPU history");
                }
                Err(e) => {
                    failed += 1;
                    error!(host = %host.name, ip = %host.ip, error = %e, "failed to record GPU history");
                }
            }
        }

        SweepOutcome::Completed { recorded, failed }
    }

    /// Sweeps immediately, then on every interval tick. Each sweep runs in its
    /// own task so a slow one never holds back the timer.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut first = true;

            loop {
                ticker.tick().await;
                let poller = self.clone();
                let initial = std::mem::replace(&mut first, false);
                tokio::spawn(async move {
                    let outcome = poller.sweep().await;
                    if initial {
                        info!(?outcome, "initial sweep completed");
                    } else {
                        info!(?outcome, "sweep finished");
                    }
                });
            }
        })
    }
}
