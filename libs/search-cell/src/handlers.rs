use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::SearchError;
use crate::services::SearchEngine;

const DEFAULT_POPULAR_SERVICES: usize = 10;
const MAX_POPULAR_SERVICES: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PopularServicesQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceClinicsQuery {
    pub name: Option<String>,
}

fn parse_limit(raw: Option<&str>) -> Result<usize, SearchError> {
    let limit = match raw {
        None => DEFAULT_POPULAR_SERVICES,
        Some(raw) => raw.trim().parse().map_err(|_| SearchError::InvalidRequest(
            format!("limit must be a non-negative integer, got {:?}", raw)
        ))?,
    };

    if limit > MAX_POPULAR_SERVICES {
        return Err(SearchError::InvalidRequest(
            format!("limit must be at most {}", MAX_POPULAR_SERVICES)
        ));
    }

    Ok(limit)
}

#[axum::debug_handler]
pub async fn search(
    State(engine): State<Arc<SearchEngine>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, AppError> {
    let q = query.q.unwrap_or_default();
    let results = engine.search(&q).await;
    let total = results.len();

    Ok(Json(json!({
        "query": q,
        "results": results,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn get_popular_services(
    State(engine): State<Arc<SearchEngine>>,
    Query(query): Query<PopularServicesQuery>,
) -> Result<Json<Value>, AppError> {
    let limit = parse_limit(query.limit.as_deref())?;
    let services = engine.get_popular_services(limit).await;

    Ok(Json(json!({
        "services": services
    })))
}

#[axum::debug_handler]
pub async fn get_all_services(
    State(engine): State<Arc<SearchEngine>>,
) -> Result<Json<Value>, AppError> {
    let services = engine.get_all_services().await;
    let total = services.len();

    Ok(Json(json!({
        "services": services,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn get_clinics_by_service(
    State(engine): State<Arc<SearchEngine>>,
    Query(query): Query<ServiceClinicsQuery>,
) -> Result<Json<Value>, AppError> {
    // Taken from the query string so names containing '/' still resolve.
    let service_name = query.name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| SearchError::InvalidRequest("name is required".to_string()))?;
    let clinics = engine.get_clinics_by_service(&service_name).await;
    let total = clinics.len();

    Ok(Json(json!({
        "service": service_name,
        "clinics": clinics,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn get_doctors_by_clinic(
    State(engine): State<Arc<SearchEngine>>,
    Path(clinic_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctors = engine.get_doctors_by_clinic(&clinic_id).await;
    let total = doctors.len();

    Ok(Json(json!({
        "clinic_id": clinic_id,
        "doctors": doctors,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn get_cache_status(
    State(engine): State<Arc<SearchEngine>>,
) -> Result<Json<Value>, AppError> {
    let status = engine.cache_status().await;
    Ok(Json(json!(status)))
}

#[axum::debug_handler]
pub async fn clear_cache(
    State(engine): State<Arc<SearchEngine>>,
) -> Result<Json<Value>, AppError> {
    engine.clear_cache().await;

    Ok(Json(json!({
        "cleared": true
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None).unwrap(), DEFAULT_POPULAR_SERVICES);
        assert_eq!(parse_limit(Some("5")).unwrap(), 5);
        assert_matches!(parse_limit(Some("abc")), Err(SearchError::InvalidRequest(_)));
        assert_matches!(parse_limit(Some("-1")), Err(SearchError::InvalidRequest(_)));
        assert_matches!(parse_limit(Some("1000")), Err(SearchError::InvalidRequest(_)));
    }
}
