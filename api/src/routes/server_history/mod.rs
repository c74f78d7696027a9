use crate::state::AppState;
use axum::{Router, routing::get};

pub mod get;

pub fn server_history_routes() -> Router<AppState> {
    Router::new().route("/", get(get::get_server_history))
}
