use crate::state::AppState;
use axum::{Router, routing::get};

pub mod get;

pub fn servers_routes() -> Router<AppState> {
    Router::new().route("/", get(get::list_servers))
}
