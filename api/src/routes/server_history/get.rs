use crate::response::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Duration;
use serde::Deserialize;
use telemetry::{AggregatedEntry, RETENTION_DAYS};
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct ServerHistoryQuery {
    pub ip: Option<String>,
}

/// GET /server-history?ip={ip}
///
/// Average and peak utilization for every sample retained for the host over
/// the trailing seven days, oldest first.
///
/// ### Responses
/// - `200 OK`: `[{ "timestamp", "averageUtilization", "maxUtilization" }, ...]`
///   (empty when nothing has been recorded)
/// - `400 Bad Request`: `ip` missing
/// - `500 Internal Server Error`: history storage could not be read
pub async fn get_server_history(
    State(app_state): State<AppState>,
    Query(query): Query<ServerHistoryQuery>,
) -> Result<Json<Vec<AggregatedEntry>>, ApiError> {
    let Some(ip) = query.ip.filter(|ip| !ip.is_empty()) else {
        return Err(ApiError::bad_request("IP address is required"));
    };

    app_state
        .history()
        .read_aggregated(&ip, Duration::days(RETENTION_DAYS))
        .await
        .map(Json)
        .map_err(|e| {
            error!(ip = %ip, error = %e, "Error reading server history");
            ApiError::internal("Failed to retrieve server history")
        })
}
