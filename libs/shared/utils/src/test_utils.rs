use serde_json::{json, Value};

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub port: u16,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            port: 3000,
        }
    }
}

impl TestConfig {
    /// Point the config at a mock server (e.g. `MockServer::uri()`).
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            port: self.port,
        }
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn clinic_row(id: &str, name: &str, city: &str, services: &[&str]) -> Value {
        json!({
            "id": id,
            "clinic_name": name,
            "city": city,
            "address": format!("{} Main Street", id),
            "description": null,
            "services": services,
            "custom_services": [],
            "specialties": [],
            "custom_specialties": null,
            "status": "approved",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn doctor_row(id: &str, full_name: &str, specialization: &str, clinic_id: &str) -> Value {
        json!({
            "id": id,
            "full_name": full_name,
            "specialization": specialization,
            "clinic_id": clinic_id
        })
    }

    pub fn price_list_row(clinic_id: &str, service_name: &str, price: f64) -> Value {
        json!({
            "clinic_id": clinic_id,
            "service_name": service_name,
            "price": price
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
