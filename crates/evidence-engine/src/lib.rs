//! Evidence-to-rating analysis over recurring health observation logs.
//!
//! Entries and measurements are routed to registered condition modules, folded
//! into named metrics, and compared against ordered criteria tables to find the
//! highest rating percentage the logs support, why, and what is still missing.

pub mod analysis;
pub mod conditions;
pub mod config;
pub mod error;
pub mod import;
pub mod observations;
pub mod telemetry;

pub use analysis::{
    analyze, analyze_all, AnalysisOutcome, AnalysisResult, ConditionRegistry, EvidenceReport,
    RatingEngine,
};
pub use conditions::ConditionKey;
pub use observations::{EvidenceSnapshot, Measurement, ObservationBatch, ObservationEntry};
