use std::sync::{Arc, RwLock};

use super::domain::{Measurement, ObservationEntry};

/// Immutable view over everything the analysis may read for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceSnapshot<'a> {
    pub entries: &'a [ObservationEntry],
    pub measurements: &'a [Measurement],
}

impl<'a> EvidenceSnapshot<'a> {
    pub fn new(entries: &'a [ObservationEntry]) -> Self {
        Self {
            entries,
            measurements: &[],
        }
    }

    pub fn with_measurements(
        entries: &'a [ObservationEntry],
        measurements: &'a [Measurement],
    ) -> Self {
        Self {
            entries,
            measurements,
        }
    }
}

impl<'a> From<&'a [ObservationEntry]> for EvidenceSnapshot<'a> {
    fn from(entries: &'a [ObservationEntry]) -> Self {
        Self::new(entries)
    }
}

/// Owned batch of observations, as produced by the importers or a store read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationBatch {
    pub entries: Vec<ObservationEntry>,
    pub measurements: Vec<Measurement>,
}

impl ObservationBatch {
    pub fn snapshot(&self) -> EvidenceSnapshot<'_> {
        EvidenceSnapshot::with_measurements(&self.entries, &self.measurements)
    }

    pub fn extend(&mut self, other: ObservationBatch) {
        self.entries.extend(other.entries);
        self.measurements.extend(other.measurements);
    }
}

/// Read accessor of the external observation store.
pub trait ObservationStore: Send + Sync {
    fn entries(&self) -> Result<Vec<ObservationEntry>, StoreError>;
    fn measurements(&self) -> Result<Vec<Measurement>, StoreError>;

    fn batch(&self) -> Result<ObservationBatch, StoreError> {
        Ok(ObservationBatch {
            entries: self.entries()?,
            measurements: self.measurements()?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("observation store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store used by the service and by tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryObservationStore {
    batch: Arc<RwLock<ObservationBatch>>,
}

impl InMemoryObservationStore {
    pub fn new(batch: ObservationBatch) -> Self {
        Self {
            batch: Arc::new(RwLock::new(batch)),
        }
    }

    pub fn replace(&self, batch: ObservationBatch) -> Result<(), StoreError> {
        let mut guard = self
            .batch
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        *guard = batch;
        Ok(())
    }

    pub fn append(&self, batch: ObservationBatch) -> Result<(), StoreError> {
        let mut guard = self
            .batch
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        guard.extend(batch);
        Ok(())
    }
}

impl ObservationStore for InMemoryObservationStore {
    fn entries(&self) -> Result<Vec<ObservationEntry>, StoreError> {
        let guard = self
            .batch
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(guard.entries.clone())
    }

    fn measurements(&self) -> Result<Vec<Measurement>, StoreError> {
        let guard = self
            .batch
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(guard.measurements.clone())
    }

    fn batch(&self) -> Result<ObservationBatch, StoreError> {
        let guard = self
            .batch
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observations::domain::MeasurementReading;

    #[test]
    fn append_and_replace_are_visible_to_readers() {
        let store = InMemoryObservationStore::default();
        store
            .append(ObservationBatch {
                entries: vec![ObservationEntry::new("a", "2025-01-01", 3)],
                measurements: Vec::new(),
            })
            .expect("append");
        store
            .append(ObservationBatch {
                entries: vec![ObservationEntry::new("b", "2025-01-02", 4)],
                measurements: vec![Measurement::new(
                    "bp",
                    "2025-01-02",
                    MeasurementReading::BloodPressure {
                        systolic: 140,
                        diastolic: 90,
                    },
                )],
            })
            .expect("append");

        let batch = store.batch().expect("read");
        assert_eq!(batch.entries.len(), 2);
        assert_eq!(store.measurements().expect("read").len(), 1);

        store.replace(ObservationBatch::default()).expect("replace");
        assert!(store.entries().expect("read").is_empty());
    }
}
