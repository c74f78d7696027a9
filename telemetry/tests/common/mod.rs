#![allow(dead_code)]

use axum::{Json, Router, http::StatusCode, routing::get};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;

/// Serves `body` at `/gpu-data` and a 503 at `/broken` on a random local port.
pub async fn spawn_proxy(body: Value) -> SocketAddr {
    let app = Router::new()
        .route("/gpu-data", get(move || async move { Json(body) }))
        .route("/broken", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Writes an executable stand-in for the ssh client. Every script must be
/// written before any of them is run.
#[cfg(unix)]
pub fn fake_ssh(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
