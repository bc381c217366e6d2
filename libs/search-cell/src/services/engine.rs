// libs/search-cell/src/services/engine.rs
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CacheSnapshot, CacheStatus, ClinicRecord, DoctorRecord, SearchError, SearchResult,
    MIN_QUERY_LENGTH,
};
use crate::services::catalogue::{clinics_offering, derive_service_names};
use crate::services::matching::search_snapshot;
use crate::services::providers::{
    ClinicProvider, DoctorProvider, SupabaseClinicProvider, SupabaseDoctorProvider,
};
use crate::services::scoring::{RelevanceScorer, ScoringWeights};

/// Session-wide search index over clinics, doctors and derived services.
///
/// The catalogue is fetched lazily on first use and kept until
/// [`SearchEngine::clear_cache`]. Readers always see a complete snapshot;
/// concurrent first callers share a single fetch.
pub struct SearchEngine {
    clinic_provider: Arc<dyn ClinicProvider>,
    doctor_provider: Arc<dyn DoctorProvider>,
    scorer: RelevanceScorer,
    snapshot: RwLock<Arc<CacheSnapshot>>,
    init_lock: Mutex<()>,
}

impl SearchEngine {
    pub fn new(
        clinic_provider: Arc<dyn ClinicProvider>,
        doctor_provider: Arc<dyn DoctorProvider>,
    ) -> Self {
        Self::with_weights(clinic_provider, doctor_provider, ScoringWeights::default())
    }

    pub fn with_weights(
        clinic_provider: Arc<dyn ClinicProvider>,
        doctor_provider: Arc<dyn DoctorProvider>,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            clinic_provider,
            doctor_provider,
            scorer: RelevanceScorer::new(weights),
            snapshot: RwLock::new(Arc::new(CacheSnapshot::default())),
            init_lock: Mutex::new(()),
        }
    }

    /// Engine backed by the Supabase clinic and doctor tables.
    pub fn from_config(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self::new(
            Arc::new(SupabaseClinicProvider::new(supabase.clone())),
            Arc::new(SupabaseDoctorProvider::new(supabase)),
        )
    }

    pub async fn ensure_initialized(&self) {
        if self.snapshot.read().await.initialized {
            return;
        }

        let _guard = self.init_lock.lock().await;
        // Another caller may have finished the build while we waited.
        if self.snapshot.read().await.initialized {
            return;
        }

        self.rebuild().await;
    }

    async fn rebuild(&self) {
        info!("Building search cache");

        let mut next = CacheSnapshot::default();
        let outcome = self.fetch_into(&mut next).await;
        next.services = derive_service_names(&next.clinics);

        match outcome {
            Ok(()) => {
                next.initialized = true;
                next.refreshed_at = Some(Utc::now());
                info!(
                    clinics = next.clinics.len(),
                    doctors = next.doctors.len(),
                    services = next.services.len(),
                    "Search cache ready"
                );
            }
            Err(e) => {
                // Partial data is still published; the next call retries.
                error!(
                    error = %e,
                    clinics = next.clinics.len(),
                    doctors = next.doctors.len(),
                    "Search cache build failed, serving partial results"
                );
                next.last_error = Some(e.to_string());
            }
        }

        // Data and build error are published together.
        *self.snapshot.write().await = Arc::new(next);
    }

    async fn fetch_into(&self, next: &mut CacheSnapshot) -> Result<(), SearchError> {
        next.clinics = self.clinic_provider.get_public_clinics().await?;
        next.doctors = self.doctor_provider.get_all_active_doctors().await?;
        Ok(())
    }

    /// Current snapshot, without triggering a fetch.
    pub async fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Up to eight results, best first. Never fails: a broken catalogue
    /// yields partial or empty results.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        if query.trim().chars().count() < MIN_QUERY_LENGTH {
            return Vec::new();
        }

        self.ensure_initialized().await;
        let snapshot = self.snapshot().await;
        let results = search_snapshot(&snapshot, &self.scorer, query);

        debug!("Search for {:?} returned {} results", query.trim(), results.len());
        results
    }

    pub async fn get_popular_services(&self, limit: usize) -> Vec<String> {
        self.ensure_initialized().await;
        self.snapshot().await.services.iter()
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn get_all_services(&self) -> Vec<String> {
        self.ensure_initialized().await;
        self.snapshot().await.services.clone()
    }

    pub async fn get_clinics_by_service(&self, service_name: &str) -> Vec<ClinicRecord> {
        self.ensure_initialized().await;
        let snapshot = self.snapshot().await;
        clinics_offering(&snapshot.clinics, service_name)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn get_doctors_by_clinic(&self, clinic_id: &str) -> Vec<DoctorRecord> {
        self.ensure_initialized().await;
        self.snapshot().await.doctors.iter()
            .filter(|doctor| doctor.clinic_id.as_deref() == Some(clinic_id))
            .cloned()
            .collect()
    }

    /// Drop all cached data; the next read fetches from the providers again.
    pub async fn clear_cache(&self) {
        let _guard = self.init_lock.lock().await;
        *self.snapshot.write().await = Arc::new(CacheSnapshot::default());
        info!("Search cache cleared");
    }

    /// Error from the most recent failed cache build, if it has not since succeeded.
    pub async fn last_error(&self) -> Option<String> {
        self.snapshot().await.last_error.clone()
    }

    pub async fn cache_status(&self) -> CacheStatus {
        let snapshot = self.snapshot().await;
        CacheStatus {
            initialized: snapshot.initialized,
            clinic_count: snapshot.clinics.len(),
            doctor_count: snapshot.doctors.len(),
            service_count: snapshot.services.len(),
            refreshed_at: snapshot.refreshed_at,
            last_error: snapshot.last_error.clone(),
        }
    }
}
