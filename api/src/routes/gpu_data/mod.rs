use crate::middleware::rate_limit::limit_gpu_data;
use crate::state::AppState;
use axum::{Router, middleware::from_fn_with_state, routing::get};

pub mod get;

/// `/gpu-data`: live samples, rate limited per client.
pub fn gpu_data_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get::get_gpu_data))
        .route_layer(from_fn_with_state(app_state, limit_gpu_data))
}
