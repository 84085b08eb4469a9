//! Observation entries, auxiliary measurements, and the per-condition selector.

pub mod domain;
mod normalizer;
pub mod selector;
pub mod store;
mod timestamp;

pub use domain::{
    ConditionPayload, DurationBucket, EntryTags, GastrointestinalDetails, Measurement,
    MeasurementKind, MeasurementReading, MigraineDetails, MoodDetails, ObservationEntry,
    PainDetails, PainType, RefluxDetails, RespiratoryDetails, SleepDetails, StoolPattern,
    TimeOfDay, MAX_SEVERITY,
};
pub use selector::{LogSelector, SelectedEntry, SelectedMeasurement, Selection};
pub use store::{
    EvidenceSnapshot, InMemoryObservationStore, ObservationBatch, ObservationStore, StoreError,
};

pub(crate) use normalizer::normalize_tag;
pub(crate) use selector::well_formed;
pub(crate) use timestamp::parse_timestamp;
