//! Dashboard page-view counter persisted as `{"views": n}`.
//!
//! Increments are throttled: at most one persisted increment per throttle
//! window, however many requests arrive.

use serde::{Deserialize, Serialize};
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
struct Views {
    views: u64,
}

#[derive(Debug)]
pub struct ViewCounter {
    path: PathBuf,
    throttle: Duration,
    last_write: Mutex<Option<Instant>>,
}

impl ViewCounter {
    pub fn new(path: impl Into<PathBuf>, throttle: Duration) -> Self {
        Self {
            path: path.into(),
            throttle,
            last_write: Mutex::new(None),
        }
    }

    /// Records a view and returns the current count.
    pub async fn hit(&self) -> io::Result<u64> {
        self.hit_at(Instant::now()).await
    }

    pub async fn hit_at(&self, now: Instant) -> io::Result<u64> {
        // held across read and write so concurrent hits never lose an increment
        let mut last_write = self.last_write.lock().await;
        let views = self.read().await?;

        let due = last_write.is_none_or(|t| now.duration_since(t) >= self.throttle);
        if !due {
            debug!(views, "throttled: skipping view increment");
            return Ok(views);
        }

        let views = views + 1;
        self.write(views).await?;
        *last_write = Some(now);
        info!(views, "views incremented");
        Ok(views)
    }

    async fn read(&self) -> io::Result<u64> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str::<Views>(&raw)
                .map(|v| v.views)
                .map_err(|e| io::Error::new(ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, views: u64) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string(&Views { views })?;
        tokio::fs::write(&self.path, body).await
    }
}
