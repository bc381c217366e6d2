pub mod catalogue;
pub mod engine;
pub mod matching;
pub mod providers;
pub mod scoring;

pub use engine::SearchEngine;
pub use providers::{ClinicProvider, DoctorProvider, SupabaseClinicProvider, SupabaseDoctorProvider};
pub use scoring::{RelevanceScorer, ScoreFields, ScoringWeights};
