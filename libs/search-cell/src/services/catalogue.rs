use std::collections::BTreeSet;

use crate::models::ClinicRecord;

/// Union every service-like name across all clinics, deduplicated and sorted.
pub fn derive_service_names(clinics: &[ClinicRecord]) -> Vec<String> {
    clinics.iter()
        .flat_map(|clinic| clinic.service_names())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Clinics offering `service_name` (case-insensitive exact match), in snapshot order.
pub fn clinics_offering<'a>(clinics: &'a [ClinicRecord], service_name: &str) -> Vec<&'a ClinicRecord> {
    clinics.iter()
        .filter(|clinic| clinic.offers_service(service_name))
        .collect()
}
