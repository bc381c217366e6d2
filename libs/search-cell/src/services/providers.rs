use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{ClinicRecord, DoctorRecord, PriceListEntry, SearchError};

const CLINICS_QUERY: &str = "status=eq.approved&select=*&order=clinic_name.asc";
const PRICE_LIST_QUERY: &str = "select=clinic_id,service_name,price&is_available=eq.true";
const DOCTORS_QUERY: &str = "is_active=eq.true&select=id,full_name,specialization,clinic_id";

/// Source of the public clinic catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClinicProvider: Send + Sync {
    async fn get_public_clinics(&self) -> Result<Vec<ClinicRecord>, SearchError>;
}

/// Source of active doctors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DoctorProvider: Send + Sync {
    async fn get_all_active_doctors(&self) -> Result<Vec<DoctorRecord>, SearchError>;
}

fn decode_rows<T: for<'de> Deserialize<'de>>(rows: Vec<Value>) -> Result<Vec<T>, SearchError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(SearchError::from))
        .collect()
}

#[derive(Debug, Deserialize)]
struct PriceListRow {
    clinic_id: String,
    service_name: String,
    #[serde(default)]
    price: Option<f64>,
}

pub struct SupabaseClinicProvider {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseClinicProvider {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(SupabaseClient::new(config)))
    }

    async fn fetch_price_lists(&self) -> Result<HashMap<String, Vec<PriceListEntry>>, SearchError> {
        let rows = self.supabase.select("clinic_services", PRICE_LIST_QUERY).await
            .map_err(|e| SearchError::Provider(e.to_string()))?;

        let mut by_clinic: HashMap<String, Vec<PriceListEntry>> = HashMap::new();
        for row in decode_rows::<PriceListRow>(rows)? {
            by_clinic.entry(row.clinic_id).or_default().push(PriceListEntry {
                service_name: row.service_name,
                price: row.price,
            });
        }

        Ok(by_clinic)
    }
}

#[async_trait]
impl ClinicProvider for SupabaseClinicProvider {
    async fn get_public_clinics(&self) -> Result<Vec<ClinicRecord>, SearchError> {
        debug!("Fetching public clinics");

        let rows = self.supabase.select("clinics", CLINICS_QUERY).await
            .map_err(|e| SearchError::Provider(e.to_string()))?;
        let mut clinics: Vec<ClinicRecord> = decode_rows(rows)?;

        // Price lists only enrich the catalogue; clinics are usable without them.
        match self.fetch_price_lists().await {
            Ok(mut price_lists) => {
                for clinic in &mut clinics {
                    if let Some(entries) = price_lists.remove(&clinic.id) {
                        clinic.price_list = Some(entries);
                    }
                }
            }
            Err(e) => warn!(error = %e, "Price lists unavailable, continuing without them"),
        }

        debug!("Fetched {} public clinics", clinics.len());
        Ok(clinics)
    }
}

pub struct SupabaseDoctorProvider {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDoctorProvider {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(SupabaseClient::new(config)))
    }
}

#[async_trait]
impl DoctorProvider for SupabaseDoctorProvider {
    async fn get_all_active_doctors(&self) -> Result<Vec<DoctorRecord>, SearchError> {
        debug!("Fetching active doctors");

        let rows = self.supabase.select("doctors", DOCTORS_QUERY).await
            .map_err(|e| SearchError::Provider(e.to_string()))?;
        let doctors: Vec<DoctorRecord> = decode_rows(rows)?;

        debug!("Fetched {} active doctors", doctors.len());
        Ok(doctors)
    }
}
