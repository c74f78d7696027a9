use crate::query::LocalQuery;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "agent is running")
}

/// GET /gpu-data
///
/// Queries the local devices on every call; nothing is cached.
pub async fn gpu_data(State(query): State<Arc<LocalQuery>>) -> Response {
    match query.run().await {
        Ok(readings) => (StatusCode::OK, Json(readings)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Error fetching GPU data");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch GPU data" })),
            )
                .into_response()
        }
    }
}

pub fn app(query: LocalQuery) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/gpu-data", get(gpu_data))
        .layer(CorsLayer::very_permissive())
        .with_state(Arc::new(query))
}
