use crate::response::ApiError;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::error;

/// GET /views
///
/// Counts a dashboard visit (throttled) and returns `{ "views": n }`.
pub async fn get_views(State(app_state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match app_state.views().hit().await {
        Ok(views) => Ok(Json(json!({ "views": views }))),
        Err(e) => {
            error!(error = %e, "Error handling views");
            Err(ApiError::internal("Error handling views"))
        }
    }
}
