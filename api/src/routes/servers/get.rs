use crate::state::AppState;
use axum::{Json, extract::State};
use telemetry::HostConfig;

/// GET /servers
///
/// The configured hosts in configuration order, as the dashboard needs them
/// (`name`, `ip`, `proxy` and any extra keys). Credentials are never returned.
pub async fn list_servers(State(app_state): State<AppState>) -> Json<Vec<HostConfig>> {
    Json(app_state.hosts().hosts().to_vec())
}
