//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness probe
//! - `/gpu-data` → live sample of one host (rate limited)
//! - `/server-history` → aggregated seven-day history of one host
//! - `/servers` → configured hosts
//! - `/views` → dashboard visit counter

use crate::middleware::log_request::log_request;
use crate::routes::{
    gpu_data::gpu_data_routes, health::health_routes, server_history::server_history_routes,
    servers::servers_routes, views::views_routes,
};
use crate::state::AppState;
use axum::{Router, middleware::from_fn};
use tower_http::cors::CorsLayer;

pub mod gpu_data;
pub mod health;
pub mod server_history;
pub mod servers;
pub mod views;

/// Builds the router for every `/api` endpoint.
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/gpu-data", gpu_data_routes(app_state))
        .nest("/server-history", server_history_routes())
        .nest("/servers", servers_routes())
        .nest("/views", views_routes())
}

/// The complete collector application: `/api` routes, request logging and CORS.
pub fn app(app_state: AppState) -> Router {
    Router::new()
        .nest("/api", routes(app_state.clone()))
        .layer(from_fn(log_request))
        .layer(CorsLayer::very_permissive())
        .with_state(app_state)
}
