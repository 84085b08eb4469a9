mod insights;
mod summary;
pub mod views;

pub use summary::{EvidenceReport, ObservationCoverage};

pub(crate) use insights::generate_insights;
