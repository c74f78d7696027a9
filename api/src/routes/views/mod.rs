use crate::state::AppState;
use axum::{Router, routing::get};

pub mod get;

pub fn views_routes() -> Router<AppState> {
    Router::new().route("/", get(get::get_views))
}
