#![allow(dead_code)]

use evidence_engine::observations::{
    ConditionPayload, EntryTags, GastrointestinalDetails, Measurement, MeasurementReading,
    MigraineDetails, MoodDetails, ObservationBatch, ObservationEntry, PainDetails, PainType,
    RefluxDetails, RespiratoryDetails, SleepDetails, StoolPattern, TimeOfDay,
};

pub fn attack(id: &str, timestamp: &str, hours: f32) -> ObservationEntry {
    ObservationEntry::new(id, timestamp, 8).with_payload(ConditionPayload::Migraine(
        MigraineDetails {
            prostrating: Some(true),
            duration_hours: Some(hours),
            ..MigraineDetails::default()
        },
    ))
}

pub fn back_pain(id: &str, timestamp: &str, details: PainDetails) -> ObservationEntry {
    ObservationEntry::new(id, timestamp, 6).with_payload(ConditionPayload::Pain(details))
}

pub fn panic_attack(id: &str, timestamp: &str) -> ObservationEntry {
    ObservationEntry::new(id, timestamp, 7).with_payload(ConditionPayload::Mood(MoodDetails {
        panic_attack: Some(true),
        ..MoodDetails::default()
    }))
}

/// A log touching every shipped condition, plus one malformed and one unmatched entry.
pub fn mixed_log() -> ObservationBatch {
    let entries = vec![
        attack("mig-1", "2025-03-03T08:00:00Z", 5.0),
        attack("mig-2", "2025-03-17T21:30:00Z", 2.0),
        ObservationEntry::new("mig-3", "2025-03-25", 4)
            .tagged("Migraine")
            .with_tags(EntryTags {
                flare_up: Some(true),
                time_of_day: Some(TimeOfDay::Evening),
                ..EntryTags::default()
            }),
        back_pain(
            "back-1",
            "2025-02-10",
            PainDetails {
                pain_type: Some(PainType::Aching),
                muscle_spasm: Some(true),
                bed_rest_days: Some(3.0),
                ..PainDetails::default()
            },
        ),
        back_pain(
            "back-2",
            "2025-03-12",
            PainDetails {
                pain_type: Some(PainType::Sharp),
                radiating: Some(true),
                abnormal_gait: Some(false),
                ..PainDetails::default()
            },
        ),
        ObservationEntry::new("ibs-1", "2025-01-05", 5).with_payload(
            ConditionPayload::Gastrointestinal(GastrointestinalDetails {
                abdominal_pain: Some(true),
                related_to_defecation: Some(true),
                stool_form_change: Some(true),
                stool_pattern: Some(StoolPattern::Diarrhea),
                ..GastrointestinalDetails::default()
            }),
        ),
        ObservationEntry::new("gerd-1", "2025-03-02", 4).with_payload(ConditionPayload::Reflux(
            RefluxDetails {
                heartburn: Some(true),
                regurgitation: Some(true),
                ..RefluxDetails::default()
            },
        )),
        ObservationEntry::new("sleep-1", "2025-03-04", 3).with_payload(ConditionPayload::Sleep(
            SleepDetails {
                hours_slept: Some(5.5),
                daytime_hypersomnolence: Some(true),
                ..SleepDetails::default()
            },
        )),
        panic_attack("ptsd-1", "2025-03-06"),
        ObservationEntry::new("ptsd-2", "2025-03-09", 5).with_payload(ConditionPayload::Mood(
            MoodDetails {
                depressed_mood: Some(true),
                sleep_impairment: Some(false),
                ..MoodDetails::default()
            },
        )),
        ObservationEntry::new("asthma-1", "2025-03-08", 4).with_payload(
            ConditionPayload::Respiratory(RespiratoryDetails {
                rescue_inhaler_used: Some(true),
                ..RespiratoryDetails::default()
            }),
        ),
        ObservationEntry::new("tin-1", "2025-03-01", 2).tagged("ringing in ears"),
        ObservationEntry::new("bp-note", "2025-03-01", 2).tagged("HTN"),
        ObservationEntry::new("knee-1", "2025-03-01", 6).tagged("knee"),
        ObservationEntry {
            timestamp: Some("sometime in March".to_string()),
            ..ObservationEntry::new("bad-1", "", 5).tagged("migraine")
        },
    ];

    let measurements = vec![
        Measurement::new(
            "cuff-1",
            "2025-03-01",
            MeasurementReading::BloodPressure {
                systolic: 162,
                diastolic: 98,
            },
        ),
        Measurement::new(
            "cuff-2",
            "2025-03-08",
            MeasurementReading::BloodPressure {
                systolic: 158,
                diastolic: 101,
            },
        ),
        Measurement::new(
            "gonio-1",
            "2025-03-12",
            MeasurementReading::ForwardFlexion { degrees: 70.0 },
        ),
        Measurement::new(
            "spiro-1",
            "2025-03-08",
            MeasurementReading::Fev1 {
                percent_predicted: 78.0,
            },
        ),
    ];

    ObservationBatch {
        entries,
        measurements,
    }
}
