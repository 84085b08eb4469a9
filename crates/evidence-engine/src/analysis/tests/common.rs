use crate::observations::{
    ConditionPayload, EntryTags, Measurement, MeasurementReading, MigraineDetails,
    ObservationEntry,
};

pub(super) fn prostrating_attack(id: &str, timestamp: &str, hours: f32) -> ObservationEntry {
    ObservationEntry::new(id, timestamp, 8).with_payload(ConditionPayload::Migraine(
        MigraineDetails {
            prostrating: Some(true),
            duration_hours: Some(hours),
            ..MigraineDetails::default()
        },
    ))
}

/// Four prolonged attacks a week apart, enough for the top migraine tier.
pub(super) fn prolonged_attacks() -> Vec<ObservationEntry> {
    vec![
        prostrating_attack("m1", "2025-04-02T09:00:00Z", 6.0),
        prostrating_attack("m2", "2025-04-09T09:00:00Z", 5.0),
        prostrating_attack("m3", "2025-04-16T09:00:00Z", 4.5),
        prostrating_attack("m4", "2025-04-23T09:00:00Z", 12.0),
    ]
}

pub(super) fn flare(id: &str, timestamp: &str, condition: &str, severity: u8) -> ObservationEntry {
    ObservationEntry::new(id, timestamp, severity)
        .tagged(condition)
        .with_tags(EntryTags {
            flare_up: Some(true),
            ..EntryTags::default()
        })
}

pub(super) fn untimed(id: &str, condition: &str) -> ObservationEntry {
    ObservationEntry {
        timestamp: None,
        ..ObservationEntry::new(id, "", 4).tagged(condition)
    }
}

pub(super) fn cuff(id: &str, timestamp: &str, systolic: u16, diastolic: u16) -> Measurement {
    Measurement::new(
        id,
        timestamp,
        MeasurementReading::BloodPressure {
            systolic,
            diastolic,
        },
    )
}
