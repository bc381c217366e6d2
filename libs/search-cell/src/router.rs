use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use crate::handlers;
use crate::services::SearchEngine;

pub fn search_routes(engine: Arc<SearchEngine>) -> Router {
    Router::new()
        .route("/", get(handlers::search))
        .route("/services", get(handlers::get_popular_services))
        .route("/services/all", get(handlers::get_all_services))
        .route("/services/clinics", get(handlers::get_clinics_by_service))
        .route("/clinics/{clinic_id}/doctors", get(handlers::get_doctors_by_clinic))
        .route("/cache", get(handlers::get_cache_status).delete(handlers::clear_cache))
        .with_state(engine)
}
