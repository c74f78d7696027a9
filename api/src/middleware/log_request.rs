use super::client_addr;
use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::TypedHeader;
use headers::{Origin, UserAgent};
use tracing::info;

/// Logs method, path, client address, origin and user-agent for each incoming
/// HTTP request. CORS preflight `OPTIONS` requests are skipped.
///
/// ```ignore
/// use axum::{Router, middleware::from_fn};
/// use api::middleware::log_request::log_request;
///
/// let app = Router::new().layer(from_fn(log_request));
/// ```
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let ip = client_addr(&req).unwrap_or_else(|| "unknown".into());
    let (mut parts, body) = req.into_parts();

    let origin = TypedHeader::<Origin>::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|TypedHeader(o)| o.to_string());

    let user_agent = TypedHeader::<UserAgent>::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|TypedHeader(ua)| ua.to_string());

    info!(
        method = ?parts.method,
        path = %parts.uri.path(),
        ip = %ip,
        origin = %origin.as_deref().unwrap_or("unknown"),
        user_agent = %user_agent.as_deref().unwrap_or("unknown"),
        "Incoming request"
    );

    next.run(Request::from_parts(parts, body)).await
}
