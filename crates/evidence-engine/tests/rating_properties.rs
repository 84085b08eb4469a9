mod common;

use common::{attack, back_pain, mixed_log, panic_attack};
use evidence_engine::analysis::{ConditionRegistry, RatingEngine};
use evidence_engine::observations::{
    EvidenceSnapshot, Measurement, MeasurementReading, ObservationBatch, ObservationEntry,
    PainDetails, PainType,
};
use evidence_engine::ConditionKey;

fn snapshots() -> Vec<ObservationBatch> {
    vec![
        ObservationBatch::default(),
        mixed_log(),
        ObservationBatch {
            entries: vec![ObservationEntry::new("only-severity", "2025-01-01", 9).tagged("gerd")],
            measurements: Vec::new(),
        },
    ]
}

#[test]
fn supported_rating_is_always_a_defined_tier() {
    let registry = ConditionRegistry::standard();
    for batch in snapshots() {
        for module in registry.modules() {
            let result = module.analyze(&batch.snapshot());
            if let Some(rating) = result.supported_rating {
                assert!(
                    module.criteria.percents().contains(&rating),
                    "{} rated {rating}%",
                    module.key
                );
            }
            assert_eq!(result.max_rating, module.criteria.max_percent());
        }
    }
}

#[test]
fn has_data_matches_the_selected_subset() {
    let registry = ConditionRegistry::standard();
    for batch in snapshots() {
        let snapshot = batch.snapshot();
        for module in registry.modules() {
            let result = module.analyze(&snapshot);
            let selection = module.selector.select(&snapshot);
            assert_eq!(result.has_data, !selection.is_empty(), "{}", module.key);
            assert_eq!(result.supported_rating.is_some(), result.has_data);
        }
    }
}

#[test]
fn gaps_are_empty_exactly_at_the_maximum() {
    let report = RatingEngine::standard().analyze_all(&mixed_log().snapshot());

    for result in report.results.iter().filter(|result| result.has_data) {
        assert_eq!(
            result.gaps.is_empty(),
            result.at_max_rating(),
            "{}: {:?}",
            result.condition,
            result.gaps
        );
        assert_eq!(result.next_rating.is_none(), result.at_max_rating());
    }
}

#[test]
fn repeated_analysis_is_identical() {
    let batch = mixed_log();
    let engine = RatingEngine::standard();

    let first = engine.analyze_all(&batch.snapshot());
    let second = engine.analyze_all(&batch.snapshot());

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serialize"),
        serde_json::to_string(&second).expect("serialize")
    );
}

/// `mixed_log` plus records sharing a timestamp, so ordering falls to the id.
fn log_with_ties() -> ObservationBatch {
    let mut batch = mixed_log();
    batch.entries.extend([
        attack("tie-b", "2025-03-20T07:00:00Z", 6.0),
        attack("tie-a", "2025-03-20T07:00:00Z", 1.0),
        back_pain(
            "tie-c",
            "2025-03-20T07:00:00Z",
            PainDetails {
                pain_type: Some(PainType::Burning),
                ..PainDetails::default()
            },
        ),
        back_pain(
            "tie-d",
            "2025-03-20T07:00:00Z",
            PainDetails {
                pain_type: Some(PainType::Aching),
                ..PainDetails::default()
            },
        ),
    ]);
    batch.measurements.extend([
        Measurement::new(
            "cuff-tie-b",
            "2025-03-08",
            MeasurementReading::BloodPressure {
                systolic: 171,
                diastolic: 112,
            },
        ),
        Measurement::new(
            "cuff-tie-a",
            "2025-03-08",
            MeasurementReading::BloodPressure {
                systolic: 149,
                diastolic: 96,
            },
        ),
    ]);
    batch
}

/// Evens first, then odds.
fn interleaved<T: Clone>(items: &[T]) -> Vec<T> {
    items
        .iter()
        .step_by(2)
        .chain(items.iter().skip(1).step_by(2))
        .cloned()
        .collect()
}

#[test]
fn input_order_does_not_matter() {
    let batch = log_with_ties();

    let mut reversed = batch.clone();
    reversed.entries.reverse();
    reversed.measurements.reverse();

    let mut rotated = batch.clone();
    rotated.entries.rotate_left(batch.entries.len() / 3);
    rotated.measurements.rotate_left(1);

    let shuffled = ObservationBatch {
        entries: interleaved(&batch.entries),
        measurements: interleaved(&batch.measurements),
    };

    let engine = RatingEngine::standard();
    let expected = engine.analyze_all(&batch.snapshot());

    for (name, permuted) in [("reversed", reversed), ("rotated", rotated), ("interleaved", shuffled)] {
        assert_ne!(permuted.entries, batch.entries, "{name} keeps the input order");
        let report = engine.analyze_all(&permuted.snapshot());
        assert_eq!(report.results, expected.results, "{name}");
        assert_eq!(report.coverage, expected.coverage, "{name}");
    }
}

fn rating(key: ConditionKey, entries: &[ObservationEntry]) -> Option<u8> {
    evidence_engine::analyze(key.slug(), entries)
        .into_result()
        .and_then(|result| result.supported_rating)
}

#[test]
fn strengthening_entries_never_lower_the_rating() {
    let mut migraine = vec![attack("a", "2025-05-01", 2.0), attack("z", "2025-05-28", 3.0)];
    let mut back = vec![back_pain("a", "2025-05-01", PainDetails::default())];
    let mut ptsd = vec![panic_attack("a", "2025-05-01"), panic_attack("z", "2025-05-28")];

    let mut previous = (
        rating(ConditionKey::Migraine, &migraine),
        rating(ConditionKey::LumbosacralStrain, &back),
        rating(ConditionKey::Ptsd, &ptsd),
    );

    for day in 2..=27 {
        let timestamp = format!("2025-05-{day:02}");
        let id = format!("extra-{day:02}");
        migraine.push(attack(&id, &timestamp, 6.0));
        back.push(back_pain(
            &id,
            &timestamp,
            PainDetails {
                muscle_spasm: Some(true),
                abnormal_gait: Some(true),
                bed_rest_days: Some(2.0),
                ..PainDetails::default()
            },
        ));
        ptsd.push(panic_attack(&id, &timestamp));

        let current = (
            rating(ConditionKey::Migraine, &migraine),
            rating(ConditionKey::LumbosacralStrain, &back),
            rating(ConditionKey::Ptsd, &ptsd),
        );
        assert!(current.0 >= previous.0, "migraine dropped on day {day}");
        assert!(current.1 >= previous.1, "back strain dropped on day {day}");
        assert!(current.2 >= previous.2, "ptsd dropped on day {day}");
        previous = current;
    }

    assert_eq!(previous.0, Some(50));
    assert_eq!(previous.1, Some(60));

    // Records well after the busiest window leave it intact.
    migraine.push(attack("later", "2025-08-14", 6.0));
    back.push(back_pain(
        "later",
        "2026-02-01",
        PainDetails {
            bed_rest_days: Some(1.0),
            ..PainDetails::default()
        },
    ));
    assert_eq!(rating(ConditionKey::Migraine, &migraine), Some(50));
    assert_eq!(rating(ConditionKey::LumbosacralStrain, &back), Some(60));
}

#[test]
fn every_condition_reports_its_rule_set() {
    let snapshot = EvidenceSnapshot::new(&[]);
    let report = RatingEngine::standard().analyze_all(&snapshot);

    let keys: Vec<ConditionKey> = report.results.iter().map(|result| result.condition).collect();
    assert_eq!(keys, ConditionKey::ALL.to_vec());
    assert!(report.results.iter().all(|result| !result.has_data));
}
