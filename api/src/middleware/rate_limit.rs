//! Fixed-window request limiting per client address.
//!
//! Each client gets `limit` requests per `window`; the window starts at the
//! client's first request and resets once it has elapsed.

use super::client_addr;
use crate::response::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

/// Stale windows are swept once the table grows past this many clients.
const SWEEP_THRESHOLD: usize = 10_000;

const THROTTLED_MESSAGE: &str = "Too many requests from this IP, please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset_after: Duration },
    Throttled { reset_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clients: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: &str, now: Instant) -> Decision {
        let mut clients = self.clients.lock().unwrap_or_else(|p| p.into_inner());

        if clients.len() > SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = clients.entry(client.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }

        let reset_after = self.window.saturating_sub(now.duration_since(entry.started));
        if entry.hits >= self.limit {
            return Decision::Throttled { reset_after };
        }

        entry.hits += 1;
        Decision::Allowed {
            remaining: self.limit - entry.hits,
            reset_after,
        }
    }
}

fn header(value: impl ToString) -> HeaderValue {
    HeaderValue::from_str(&value.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}

fn rate_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_after: Duration) {
    let reset_secs = reset_after.as_secs_f64().ceil() as u64;
    headers.insert("ratelimit-limit", header(limit));
    headers.insert("ratelimit-remaining", header(remaining));
    headers.insert("ratelimit-reset", header(reset_secs));
}

/// Applies `AppState::gpu_data_limiter` to the wrapped routes.
pub async fn limit_gpu_data(
    State(app_state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let limiter = app_state.gpu_data_limiter();
    let client = client_addr(&req).unwrap_or_else(|| "unknown".into());

    match limiter.check(&client) {
        Decision::Allowed {
            remaining,
            reset_after,
        } => {
            let mut response = next.run(req).await;
            rate_limit_headers(response.headers_mut(), limiter.limit(), remaining, reset_after);
            response
        }
        Decision::Throttled { reset_after } => {
            warn!(client = %client, path = %req.uri().path(), "rate limit exceeded");
            let mut response =
                ApiError::new(StatusCode::TOO_MANY_REQUESTS, THROTTLED_MESSAGE).into_response();
            let headers = response.headers_mut();
            rate_limit_headers(headers, limiter.limit(), 0, reset_after);
            headers.insert(
                "retry-after",
                header(reset_after.as_secs_f64().ceil() as u64),
            );
            response
        }
    }
}
