use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use evidence_engine::config::AnalysisConfig;
use evidence_engine::error::AppError;
use evidence_engine::import::ObservationImporter;
use evidence_engine::observations::{InMemoryObservationStore, ObservationBatch};
use evidence_engine::{ConditionRegistry, RatingEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Engine and observation store shared by the analysis routes.
#[derive(Clone)]
pub(crate) struct AnalysisState {
    pub(crate) engine: Arc<RatingEngine>,
    pub(crate) store: InMemoryObservationStore,
}

impl AnalysisState {
    pub(crate) fn new(engine: RatingEngine, store: InMemoryObservationStore) -> Self {
        Self {
            engine: Arc::new(engine),
            store,
        }
    }
}

pub(crate) fn build_engine(config: &AnalysisConfig) -> RatingEngine {
    let registry = match &config.enabled_conditions {
        Some(keys) => ConditionRegistry::with_conditions(keys.iter().copied()),
        None => ConditionRegistry::standard(),
    };
    RatingEngine::new(registry)
}

pub(crate) fn load_store(config: &AnalysisConfig) -> Result<InMemoryObservationStore, AppError> {
    let batch = match &config.observations_path {
        Some(path) => {
            let batch = ObservationImporter::from_path(path)?;
            info!(
                path = %path.display(),
                entries = batch.entries.len(),
                measurements = batch.measurements.len(),
                "loaded observations"
            );
            batch
        }
        None => ObservationBatch::default(),
    };
    Ok(InMemoryObservationStore::new(batch))
}

/// Entries from `input`, plus measurements from an optional second file.
pub(crate) fn load_batch(
    input: &Path,
    measurements: Option<&PathBuf>,
) -> Result<ObservationBatch, AppError> {
    let mut batch = ObservationImporter::from_path(input)?;
    if let Some(path) = measurements {
        batch.extend(ObservationImporter::measurements_from_path(path)?);
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_engine::ConditionKey;

    #[test]
    fn enabled_conditions_restrict_the_engine() {
        let config = AnalysisConfig {
            observations_path: None,
            enabled_conditions: Some(vec![ConditionKey::Asthma]),
        };

        let engine = build_engine(&config);

        assert_eq!(engine.registry().len(), 1);
        assert!(engine.registry().get(ConditionKey::Asthma).is_some());
        assert_eq!(
            build_engine(&AnalysisConfig::default()).registry().len(),
            ConditionKey::ALL.len()
        );
    }

    #[test]
    fn missing_observation_file_is_an_import_error() {
        let config = AnalysisConfig {
            observations_path: Some(PathBuf::from("/nonexistent/log.json")),
            enabled_conditions: None,
        };

        assert!(matches!(load_store(&config), Err(AppError::Import(_))));
    }
}
