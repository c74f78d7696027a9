#![allow(dead_code)]

use api::{
    middleware::rate_limit::RateLimiter, routes::app, services::view_counter::ViewCounter,
    state::AppState,
};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use telemetry::{
    FileHistoryStore, GpuReading, HostConfig, HostRegistry, Sample, Sampler, TelemetryError,
};
use tempfile::TempDir;
use tower::ServiceExt;

/// Returns canned samples per host name; any other host fails to connect.
#[derive(Default)]
pub struct StubSampler {
    samples: HashMap<String, Sample>,
    calls: AtomicUsize,
}

impl StubSampler {
    pub fn with(mut self, host: &str, sample: Sample) -> Self {
        self.samples.insert(host.to_string(), sample);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sampler for StubSampler {
    async fn fetch(&self, host: &HostConfig) -> telemetry::Result<Sample> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.samples
            .get(&host.name)
            .cloned()
            .ok_or_else(|| TelemetryError::Connection {
                host: host.name.clone(),
                reason: "connection refused".into(),
            })
    }
}

pub fn rtx(index: u32, util: u32) -> GpuReading {
    GpuReading {
        index,
        name: "RTX 3090".into(),
        temperature_c: 55,
        utilization_pct: util,
        memory_used_mib: 1024,
        memory_total_mib: 24576,
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub data: TempDir,
}

/// Builds the full collector app over `hosts`, with history and views kept
/// in a fresh temporary directory.
pub fn make_test_app_with(hosts: Vec<HostConfig>, sampler: Arc<dyn Sampler>) -> TestApp {
    let data = TempDir::new().expect("failed to create tempdir");
    let state = AppState::new(
        HostRegistry::new(hosts).expect("valid test hosts"),
        sampler,
        Arc::new(FileHistoryStore::new(data.path())),
        ViewCounter::new(data.path().join("views.json"), Duration::from_secs(3)),
        RateLimiter::new(100, Duration::from_secs(5)),
    );
    TestApp {
        app: app(state.clone()),
        state,
        data,
    }
}

/// Two hosts: `gpu-a` answers with two devices, `gpu-b` is unreachable.
pub fn make_test_app() -> (TestApp, Arc<StubSampler>) {
    let sampler = Arc::new(
        StubSampler::default().with("gpu-a", Sample::Devices(vec![rtx(0, 10), rtx(1, 31)])),
    );
    let app = make_test_app_with(
        vec![
            HostConfig::remote("gpu-a", "10.0.0.1"),
            HostConfig::remote("gpu-b", "10.0.0.2"),
        ],
        sampler.clone(),
    );
    (app, sampler)
}

/// Sends a GET and decodes the JSON body (`Value::Null` when there is none).
pub async fn get_json(app: &Router, uri: &str, client: Option<&str>) -> (StatusCode, HeaderMap, Value) {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(client) = client {
        req = req.header("x-forwarded-for", client);
    }
    let response = app
        .clone()
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, headers, json)
}
