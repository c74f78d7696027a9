//! Request middleware: access logging and per-client rate limiting.

pub mod log_request;
pub mod rate_limit;

use axum::{extract::ConnectInfo, http::Request};
use std::net::SocketAddr;

/// Best-effort client address: the first `X-Forwarded-For` hop (the reverse
/// proxy in front of the collector is trusted), else the socket peer.
pub fn client_addr<B>(req: &Request<B>) -> Option<String> {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    forwarded.or_else(|| {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    })
}
