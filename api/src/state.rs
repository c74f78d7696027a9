//! Shared state handed to every route handler through Axum's `State<T>` extractor.

use crate::middleware::rate_limit::RateLimiter;
use crate::services::view_counter::ViewCounter;
use std::sync::Arc;
use std::time::Duration;
use telemetry::{
    FileHistoryStore, HistoryStore, HostRegistry, Poller, RemoteSampler, Sampler, SamplerSettings,
};
use util::{config, paths};

/// Sweep cadence for `POLL_INTERVAL_MINUTES`, never shorter than a minute.
pub fn poll_interval(minutes: u64) -> Duration {
    Duration::from_secs(minutes.max(1).saturating_mul(60))
}

/// Central application state shared across the server.
///
/// Cheap to clone: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    hosts: Arc<HostRegistry>,
    sampler: Arc<dyn Sampler>,
    history: Arc<dyn HistoryStore>,
    views: Arc<ViewCounter>,
    gpu_data_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        hosts: HostRegistry,
        sampler: Arc<dyn Sampler>,
        history: Arc<dyn HistoryStore>,
        views: ViewCounter,
        gpu_data_limiter: RateLimiter,
    ) -> Self {
        Self {
            hosts: Arc::new(hosts),
            sampler,
            history,
            views: Arc::new(views),
            gpu_data_limiter: Arc::new(gpu_data_limiter),
        }
    }

    /// Builds the production state from `util::config`: the host list file,
    /// the ssh-backed sampler, and file storage under the data directory.
    pub fn init() -> telemetry::Result<Self> {
        let hosts = HostRegistry::load(paths::servers_config_path())?;

        let sampler = RemoteSampler::new(SamplerSettings {
            ssh_program: config::ssh_program(),
            default_username: config::ssh_username(),
            default_key_path: config::ssh_key_path().map(Into::into),
            connect_timeout: Duration::from_secs(config::ssh_connect_timeout_secs()),
            session_timeout: Duration::from_secs(config::ssh_session_timeout_secs()),
        })?;

        let history = FileHistoryStore::new(paths::data_dir());
        let views = ViewCounter::new(
            paths::views_path(),
            Duration::from_millis(config::views_throttle_ms()),
        );
        let limiter = RateLimiter::new(
            config::gpu_data_rate_limit(),
            Duration::from_millis(config::gpu_data_rate_window_ms()),
        );

        Ok(Self::new(
            hosts,
            Arc::new(sampler),
            Arc::new(history),
            views,
            limiter,
        ))
    }

    /// A poller over the same hosts, sampler and history as the HTTP handlers.
    pub fn poller(&self, every: Duration) -> Poller {
        Poller::new(
            self.hosts.clone(),
            self.sampler.clone(),
            self.history.clone(),
            every,
        )
    }

    pub fn hosts(&self) -> &HostRegistry {
        &self.hosts
    }

    pub fn sampler(&self) -> &dyn Sampler {
        self.sampler.as_ref()
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    pub fn views(&self) -> &ViewCounter {
        &self.views
    }

    pub fn gpu_data_limiter(&self) -> &RateLimiter {
        &self.gpu_data_limiter
    }
}
