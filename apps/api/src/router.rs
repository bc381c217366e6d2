use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use search_cell::router::search_routes;
use search_cell::services::SearchEngine;

pub fn create_router(engine: Arc<SearchEngine>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Search API is running!" }))
        .nest("/search", search_routes(engine))
}
