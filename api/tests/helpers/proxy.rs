use axum::{Json, Router, routing::get};
use serde_json::Value;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Serves `body` at `/gpu-data` on a random local port, standing in for a GPU agent.
pub async fn spawn_proxy(body: Value) -> SocketAddr {
    let app = Router::new().route("/gpu-data", get(move || async move { Json(body) }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
