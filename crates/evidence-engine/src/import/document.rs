use std::io::Read;

use serde::Deserialize;

use crate::observations::{Measurement, ObservationBatch, ObservationEntry};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Batch {
        #[serde(default)]
        entries: Vec<ObservationEntry>,
        #[serde(default)]
        measurements: Vec<Measurement>,
    },
    Entries(Vec<ObservationEntry>),
}

pub(crate) fn parse_document<R: Read>(reader: R) -> Result<ObservationBatch, serde_json::Error> {
    let batch = match serde_json::from_reader(reader)? {
        Document::Batch {
            entries,
            measurements,
        } => ObservationBatch {
            entries,
            measurements,
        },
        Document::Entries(entries) => ObservationBatch {
            entries,
            measurements: Vec::new(),
        },
    };
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observations::{ConditionPayload, MeasurementReading};

    #[test]
    fn accepts_a_full_document() {
        let raw = r#"{
            "entries": [
                {
                    "id": "m1",
                    "timestamp": "2025-04-02T09:00:00Z",
                    "severity": 8,
                    "payload": { "kind": "migraine", "prostrating": true, "duration_hours": 6 }
                },
                { "id": "t1", "timestamp": "2025-04-03", "conditionKey": "tinnitus", "severity": 3 }
            ],
            "measurements": [
                {
                    "id": "bp1",
                    "timestamp": "2025-04-03",
                    "reading": { "kind": "blood_pressure", "systolic": 142, "diastolic": 96 }
                }
            ]
        }"#;

        let batch = parse_document(raw.as_bytes()).expect("valid document");

        assert_eq!(batch.entries.len(), 2);
        assert!(matches!(
            batch.entries[0].payload,
            Some(ConditionPayload::Migraine(_))
        ));
        assert_eq!(batch.entries[1].condition_key.as_deref(), Some("tinnitus"));
        assert_eq!(
            batch.measurements[0].reading,
            MeasurementReading::BloodPressure {
                systolic: 142,
                diastolic: 96
            }
        );
    }

    #[test]
    fn accepts_a_bare_entry_array() {
        let raw = r#"[{ "id": "a", "condition": "gerd", "severity": 2 }]"#;

        let batch = parse_document(raw.as_bytes()).expect("valid array");

        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.entries[0].timestamp, None);
        assert!(batch.measurements.is_empty());
    }

    #[test]
    fn a_malformed_entry_does_not_sink_the_document() {
        let raw = r#"[
            { "id": "good", "timestamp": "2025-04-02", "severity": 6, "condition": "tinnitus" },
            { "id": "fractional", "timestamp": "2025-04-03", "severity": 7.5, "condition": "tinnitus" },
            { "id": "negative", "timestamp": "2025-04-04", "severity": -1, "condition": "tinnitus" },
            { "id": "quoted", "timestamp": "2025-04-05", "severity": "7", "condition": "tinnitus" },
            { "id": "epoch", "timestamp": 1743552000, "severity": 4, "condition": "tinnitus" }
        ]"#;

        let batch = parse_document(raw.as_bytes()).expect("malformed fields are tolerated");

        let fields: Vec<(&str, Option<&str>, Option<u8>)> = batch
            .entries
            .iter()
            .map(|entry| (entry.id.as_str(), entry.timestamp.as_deref(), entry.severity))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("good", Some("2025-04-02"), Some(6)),
                ("fractional", Some("2025-04-03"), None),
                ("negative", Some("2025-04-04"), None),
                ("quoted", Some("2025-04-05"), Some(7)),
                ("epoch", None, Some(4)),
            ]
        );
    }
}
