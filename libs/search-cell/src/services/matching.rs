// libs/search-cell/src/services/matching.rs
use crate::models::{
    CacheSnapshot, ClinicRecord, DoctorRecord, SearchRecord, SearchResult, SearchResultType,
    ServiceSummary, CLINIC_DESCRIPTION_FALLBACK, DOCTOR_CLINIC_FALLBACK,
    DOCTOR_SPECIALIZATION_FALLBACK, MAX_SEARCH_RESULTS, MIN_QUERY_LENGTH,
};
use crate::services::catalogue::clinics_offering;
use crate::services::scoring::{RelevanceScorer, ScoreFields};

/// Offering clinics listed by name in a service description.
const SERVICE_CLINIC_PREVIEW: usize = 3;

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Match clinics on name, description, address and city. Scores from each
/// matching field are summed; address/city add a flat location bonus.
pub fn search_clinics(
    clinics: &[ClinicRecord],
    scorer: &RelevanceScorer,
    query: &str,
) -> Vec<SearchResult> {
    let needle = query.to_lowercase();
    let mut results = Vec::new();

    for clinic in clinics {
        let description = non_empty(clinic.description.as_deref());
        let mut matched = false;
        let mut score = 0;

        if contains_ci(&clinic.clinic_name, &needle) {
            matched = true;
            score += scorer.score(
                query,
                ScoreFields::title(&clinic.clinic_name)
                    .with_subtitle(clinic.city.as_deref())
                    .with_description(description),
            );
        }

        if description.is_some_and(|d| contains_ci(d, &needle)) {
            matched = true;
            score += scorer.score(query, ScoreFields::default().with_description(description));
        }

        let location_hit = [clinic.address.as_deref(), clinic.city.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| contains_ci(field, &needle));
        if location_hit {
            matched = true;
            score += scorer.weights().location_match;
        }

        if !matched {
            continue;
        }

        results.push(SearchResult {
            id: clinic.id.clone(),
            result_type: SearchResultType::Clinic,
            title: clinic.clinic_name.clone(),
            subtitle: clinic.city.clone(),
            description: Some(description.unwrap_or(CLINIC_DESCRIPTION_FALLBACK).to_string()),
            clinic_id: Some(clinic.id.clone()),
            clinic_name: Some(clinic.clinic_name.clone()),
            relevance_score: score,
            record: SearchRecord::Clinic(clinic.clone()),
        });
    }

    results
}

/// Match doctors on full name and specialization, linking each to its clinic
/// when the clinic is still in the snapshot.
pub fn search_doctors(
    doctors: &[DoctorRecord],
    clinics: &[ClinicRecord],
    scorer: &RelevanceScorer,
    query: &str,
) -> Vec<SearchResult> {
    let needle = query.to_lowercase();
    let mut results = Vec::new();

    for doctor in doctors {
        let specialization = non_empty(doctor.specialization.as_deref());
        let clinic = doctor.clinic_id.as_deref()
            .and_then(|clinic_id| clinics.iter().find(|c| c.id == clinic_id));
        let clinic_name = clinic.map(|c| c.clinic_name.as_str());
        let mut matched = false;
        let mut score = 0;

        if contains_ci(&doctor.full_name, &needle) {
            matched = true;
            score += scorer.score(
                query,
                ScoreFields::title(&doctor.full_name)
                    .with_subtitle(specialization)
                    .with_description(clinic_name),
            );
        }

        if specialization.is_some_and(|s| contains_ci(s, &needle)) {
            matched = true;
            score += scorer.score(query, ScoreFields::default().with_subtitle(specialization));
        }

        if !matched {
            continue;
        }

        results.push(SearchResult {
            id: doctor.id.clone(),
            result_type: SearchResultType::Doctor,
            title: doctor.full_name.clone(),
            subtitle: Some(specialization.unwrap_or(DOCTOR_SPECIALIZATION_FALLBACK).to_string()),
            description: Some(clinic_name.unwrap_or(DOCTOR_CLINIC_FALLBACK).to_string()),
            clinic_id: clinic.map(|c| c.id.clone()),
            clinic_name: clinic_name.map(str::to_string),
            relevance_score: score,
            record: SearchRecord::Doctor(doctor.clone()),
        });
    }

    results
}

/// Match derived service names by substring and summarize who offers them.
pub fn search_services(
    services: &[String],
    clinics: &[ClinicRecord],
    scorer: &RelevanceScorer,
    query: &str,
) -> Vec<SearchResult> {
    let needle = query.to_lowercase();

    services.iter()
        .filter(|service| contains_ci(service, &needle))
        .map(|service| {
            let offering = clinics_offering(clinics, service);
            let clinic_count = offering.len();
            let description = describe_offering(&offering);
            let score = scorer.score(
                query,
                ScoreFields::title(service).with_description(description.as_deref()),
            );

            SearchResult {
                id: service_result_id(service),
                result_type: SearchResultType::Service,
                title: service.clone(),
                subtitle: Some(format!(
                    "{} {} available",
                    clinic_count,
                    if clinic_count == 1 { "clinic" } else { "clinics" },
                )),
                description,
                clinic_id: None,
                clinic_name: None,
                relevance_score: score,
                record: SearchRecord::Service(ServiceSummary {
                    name: service.clone(),
                    clinic_count,
                }),
            }
        })
        .collect()
}

fn service_result_id(service: &str) -> String {
    let slug: Vec<String> = service.split_whitespace()
        .map(str::to_lowercase)
        .collect();
    format!("service-{}", slug.join("-"))
}

fn describe_offering(offering: &[&ClinicRecord]) -> Option<String> {
    if offering.is_empty() {
        return None;
    }

    let names: Vec<&str> = offering.iter()
        .take(SERVICE_CLINIC_PREVIEW)
        .map(|c| c.clinic_name.as_str())
        .collect();
    let mut description = names.join(", ");

    if offering.len() > SERVICE_CLINIC_PREVIEW {
        description.push_str(&format!(" and {} more", offering.len() - SERVICE_CLINIC_PREVIEW));
    }

    Some(description)
}

/// Run every matcher over the trimmed query and return the best results,
/// clinics before doctors before services on equal scores.
pub fn search_snapshot(
    snapshot: &CacheSnapshot,
    scorer: &RelevanceScorer,
    query: &str,
) -> Vec<SearchResult> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LENGTH {
        return Vec::new();
    }

    let mut results = search_clinics(&snapshot.clinics, scorer, query);
    results.extend(search_doctors(&snapshot.doctors, &snapshot.clinics, scorer, query));
    results.extend(search_services(&snapshot.services, &snapshot.clinics, scorer, query));

    // Stable: ties keep concatenation order.
    results.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    results.truncate(MAX_SEARCH_RESULTS);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalogue::derive_service_names;

    fn clinic(id: &str, name: &str, city: &str, services: &[&str]) -> ClinicRecord {
        ClinicRecord {
            id: id.into(),
            clinic_name: name.into(),
            city: Some(city.into()),
            address: None,
            description: None,
            services: services.iter().map(|s| s.to_string()).collect(),
            custom_services: vec![],
            specialties: vec![],
            custom_specialties: vec![],
            price_list: None,
        }
    }

    fn doctor(id: &str, name: &str, specialization: Option<&str>, clinic_id: Option<&str>) -> DoctorRecord {
        DoctorRecord {
            id: id.into(),
            full_name: name.into(),
            specialization: specialization.map(str::to_string),
            clinic_id: clinic_id.map(str::to_string),
        }
    }

    fn snapshot(clinics: Vec<ClinicRecord>, doctors: Vec<DoctorRecord>) -> CacheSnapshot {
        CacheSnapshot {
            services: derive_service_names(&clinics),
            clinics,
            doctors,
            initialized: true,
            refreshed_at: None,
            last_error: None,
        }
    }

    fn sample() -> CacheSnapshot {
        snapshot(
            vec![clinic("c1", "Sunrise Dental", "Springfield", &["X-Ray", "Cleaning"])],
            vec![doctor("d1", "Dr. Jane Lee", Some("Cardiology"), Some("c1"))],
        )
    }

    #[test]
    fn test_short_queries_return_nothing() {
        let scorer = RelevanceScorer::default();
        let snap = sample();

        assert!(search_snapshot(&snap, &scorer, "").is_empty());
        assert!(search_snapshot(&snap, &scorer, "s").is_empty());
        assert!(search_snapshot(&snap, &scorer, "   d   ").is_empty());
    }

    #[test]
    fn test_exact_clinic_name_ranks_first() {
        let scorer = RelevanceScorer::default();
        let results = search_snapshot(&sample(), &scorer, "Sunrise Dental");

        assert_eq!(results[0].result_type, SearchResultType::Clinic);
        assert!(results[0].relevance_score >= 100);
        assert_eq!(results[0].subtitle.as_deref(), Some("Springfield"));
        assert_eq!(results[0].description.as_deref(), Some(CLINIC_DESCRIPTION_FALLBACK));
    }

    #[test]
    fn test_partial_clinic_name_uses_substring_tier() {
        let scorer = RelevanceScorer::default();
        let results = search_clinics(&sample().clinics, &scorer, "dent");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance_score, 60);
    }

    #[test]
    fn test_clinic_scores_accumulate_across_fields() {
        let scorer = RelevanceScorer::default();
        let mut c = clinic("c1", "Springfield Clinic", "Springfield", &[]);
        c.description = Some("Springfield family care".into());

        let results = search_clinics(&[c], &scorer, "springfield");

        // name: prefix 80 + subtitle exact 50 + description 20 + tokens 15 + 10
        // description field: 20, city: flat 30
        assert_eq!(results[0].relevance_score, 225);
        assert_eq!(results[0].description.as_deref(), Some("Springfield family care"));
    }

    #[test]
    fn test_address_only_match_gets_flat_bonus() {
        let scorer = RelevanceScorer::default();
        let mut c = clinic("c1", "Sunrise Dental", "Springfield", &[]);
        c.address = Some("12 Elm Street".into());

        let results = search_clinics(&[c], &scorer, "elm st");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance_score, 30);
    }

    #[test]
    fn test_doctor_result_links_clinic() {
        let scorer = RelevanceScorer::default();
        let results = search_snapshot(&sample(), &scorer, "lee");

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.result_type, SearchResultType::Doctor);
        assert_eq!(result.subtitle.as_deref(), Some("Cardiology"));
        assert_eq!(result.description.as_deref(), Some("Sunrise Dental"));
        assert_eq!(result.clinic_id.as_deref(), Some("c1"));
        assert_eq!(result.relevance_score, 75);
    }

    #[test]
    fn test_doctor_with_unknown_clinic_omits_linkage() {
        let scorer = RelevanceScorer::default();
        let doctors = vec![doctor("d1", "Dr. Sam Park", None, Some("gone"))];

        let results = search_doctors(&doctors, &[], &scorer, "park");

        assert_eq!(results[0].subtitle.as_deref(), Some(DOCTOR_SPECIALIZATION_FALLBACK));
        assert_eq!(results[0].description.as_deref(), Some(DOCTOR_CLINIC_FALLBACK));
        assert_eq!(results[0].clinic_id, None);
        assert_eq!(results[0].clinic_name, None);
    }

    #[test]
    fn test_doctor_specialization_match() {
        let scorer = RelevanceScorer::default();
        let results = search_doctors(&sample().doctors, &sample().clinics, &scorer, "cardio");

        // specialization substring (30), no token bonus for a partial word
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance_score, 30);
    }

    #[test]
    fn test_doctor_scores_accumulate_across_name_and_specialization() {
        let scorer = RelevanceScorer::default();
        let doctors = vec![doctor("d1", "Dr. Card", Some("Cardiology"), None)];

        let results = search_doctors(&doctors, &[], &scorer, "card");

        // name: substring 60 + "card" token 15 + subtitle substring 30
        // specialization: subtitle substring 30
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance_score, 135);
    }

    #[test]
    fn test_clinic_description_only_match() {
        let scorer = RelevanceScorer::default();
        let mut c = clinic("c1", "Sunrise Dental", "Springfield", &[]);
        c.description = Some("Family orthodontics".into());

        let results = search_clinics(&[c.clone()], &scorer, "orthodontics");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance_score, 20);

        c.address = Some("1 Orthodontics Plaza".into());
        let results = search_clinics(&[c], &scorer, "orthodontics");
        assert_eq!(results[0].relevance_score, 50);
    }

    #[test]
    fn test_service_summary_lists_first_three_clinics() {
        let scorer = RelevanceScorer::default();
        let clinics = vec![
            clinic("c1", "Alpha", "A", &["X-Ray"]),
            clinic("c2", "Bravo", "B", &["x-ray"]),
            clinic("c3", "Charlie", "C", &["X-Ray"]),
            clinic("c4", "Delta", "D", &["X-Ray"]),
            clinic("c5", "Echo", "E", &["X-Ray"]),
        ];
        let services = vec!["X-Ray".to_string()];

        let results = search_services(&services, &clinics, &scorer, "x-ray");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "service-x-ray");
        assert_eq!(results[0].subtitle.as_deref(), Some("5 clinics available"));
        assert_eq!(results[0].description.as_deref(), Some("Alpha, Bravo, Charlie and 2 more"));
        assert_eq!(
            results[0].record,
            SearchRecord::Service(ServiceSummary { name: "X-Ray".into(), clinic_count: 5 })
        );
    }

    #[test]
    fn test_single_clinic_service_subtitle() {
        let scorer = RelevanceScorer::default();
        let snap = sample();

        let results = search_services(&snap.services, &snap.clinics, &scorer, "clean");

        assert_eq!(results[0].subtitle.as_deref(), Some("1 clinic available"));
        assert_eq!(results[0].description.as_deref(), Some("Sunrise Dental"));
    }

    #[test]
    fn test_ties_keep_clinic_doctor_service_order() {
        let scorer = RelevanceScorer::default();
        let snap = snapshot(
            vec![clinic("c1", "Care One", "Town", &["Care Plan"])],
            vec![doctor("d1", "Care One", Some("GP"), None)],
        );

        let results = search_snapshot(&snap, &scorer, "care");
        let order: Vec<(SearchResultType, u32)> = results.iter()
            .map(|r| (r.result_type, r.relevance_score))
            .collect();

        assert_eq!(
            order,
            vec![
                (SearchResultType::Service, 115),
                (SearchResultType::Clinic, 95),
                (SearchResultType::Doctor, 95),
            ]
        );
    }

    #[test]
    fn test_results_are_capped_and_sorted() {
        let scorer = RelevanceScorer::default();
        let clinics = (0..12)
            .map(|i| clinic(&format!("c{}", i), &format!("Clinic {}", i), "Town", &[]))
            .collect();
        let snap = snapshot(clinics, vec![]);

        let results = search_snapshot(&snap, &scorer, "clinic");

        assert_eq!(results.len(), MAX_SEARCH_RESULTS);
        assert!(results.windows(2).all(|w| w[0].relevance_score >= w[1].relevance_score));
    }

    #[test]
    fn test_no_match_is_empty() {
        let scorer = RelevanceScorer::default();
        assert!(search_snapshot(&sample(), &scorer, "optometry").is_empty());
    }
}
