use crate::response::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use telemetry::Sample;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct GpuDataQuery {
    #[serde(rename = "serverName")]
    pub server_name: Option<String>,
}

async fn sample_host(app_state: &AppState, name: &str) -> telemetry::Result<Sample> {
    let host = app_state.hosts().find(name)?;
    app_state.sampler().fetch(host).await
}

/// GET /gpu-data?serverName={name}
///
/// Samples the named host right now. Nothing is cached and the history files
/// are never consulted.
///
/// ### Responses
/// - `200 OK`: `[{ "index", "name", "temp", "util", "memUsed", "memTotal" }, ...]`
///   (a proxied host's body is returned exactly as the proxy sent it)
/// - `400 Bad Request`: `serverName` missing
/// - `429 Too Many Requests`: client exceeded its request window
/// - `500 Internal Server Error`: unknown host, or the host could not be sampled
pub async fn get_gpu_data(
    State(app_state): State<AppState>,
    Query(query): Query<GpuDataQuery>,
) -> Result<Json<Sample>, ApiError> {
    let Some(name) = query.server_name.filter(|n| !n.is_empty()) else {
        return Err(ApiError::bad_request("Server name is required"));
    };

    match sample_host(&app_state, &name).await {
        Ok(sample) => Ok(Json(sample)),
        Err(e) => {
            error!(server = %name, error = %e, "Error fetching GPU data");
            Err(ApiError::internal("Failed to fetch GPU data"))
        }
    }
}
