use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

/// Hard cap on the number of results a single search returns.
pub const MAX_SEARCH_RESULTS: usize = 8;

/// Queries shorter than this (in characters, after trimming) never match.
pub const MIN_QUERY_LENGTH: usize = 2;

pub const CLINIC_DESCRIPTION_FALLBACK: &str = "Medical Clinic";
pub const DOCTOR_SPECIALIZATION_FALLBACK: &str = "Doctor";
pub const DOCTOR_CLINIC_FALLBACK: &str = "Healthcare Provider";

// PostgREST returns `null` for unset array columns.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListEntry {
    pub service_name: String,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicRecord {
    pub id: String,
    pub clinic_name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub services: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub custom_services: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub specialties: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub custom_specialties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_list: Option<Vec<PriceListEntry>>,
}

impl ClinicRecord {
    /// Every service-like name this clinic lists: the four list columns plus
    /// price-list entries, trimmed, with blanks dropped. May repeat names.
    pub fn service_names(&self) -> impl Iterator<Item = &str> + '_ {
        let price_list = self.price_list.iter()
            .flatten()
            .map(|entry| entry.service_name.as_str());

        self.services.iter()
            .chain(&self.custom_services)
            .chain(&self.specialties)
            .chain(&self.custom_specialties)
            .map(String::as_str)
            .chain(price_list)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Case-insensitive exact match against `service_names`.
    pub fn offers_service(&self, service_name: &str) -> bool {
        let wanted = service_name.trim().to_lowercase();
        self.service_names().any(|name| name.to_lowercase() == wanted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub clinic_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub name: String,
    pub clinic_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchResultType {
    Clinic,
    Doctor,
    Service,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchRecord {
    Clinic(ClinicRecord),
    Doctor(DoctorRecord),
    Service(ServiceSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub result_type: SearchResultType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_name: Option<String>,
    pub relevance_score: u32,
    pub record: SearchRecord,
}

/// Immutable view of the catalogue. Rebuilt and swapped in whole.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    pub clinics: Vec<ClinicRecord>,
    pub doctors: Vec<DoctorRecord>,
    pub services: Vec<String>,
    pub initialized: bool,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Error from the build that produced this snapshot, if it failed.
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub initialized: bool,
    pub clinic_count: usize,
    pub doctor_count: usize,
    pub service_count: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Failed to decode provider rows: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Provider(msg) => AppError::ExternalService(msg),
            SearchError::Deserialization(e) => AppError::Internal(e.to_string()),
            SearchError::InvalidRequest(msg) => AppError::BadRequest(msg),
        }
    }
}
