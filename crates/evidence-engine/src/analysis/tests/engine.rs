use super::common::*;
use crate::analysis::{AnalysisOutcome, ConditionRegistry, MetricValue, RatingEngine};
use crate::conditions::ConditionKey;
use crate::observations::{EvidenceSnapshot, ObservationEntry};

#[test]
fn condition_can_be_requested_by_slug_code_or_alias_spelling() {
    let entries = prolonged_attacks();
    let engine = RatingEngine::standard();

    for key in ["migraine", "8100", "  Migraine "] {
        let outcome = engine.analyze(key, &entries);
        let result = outcome.result().expect("migraine is registered");
        assert_eq!(result.condition, ConditionKey::Migraine);
        assert_eq!(result.supported_rating, Some(50));
    }
}

#[test]
fn unknown_condition_is_unsupported_not_an_error() {
    let outcome = RatingEngine::standard().analyze(" knee-pain ", &prolonged_attacks());

    assert_eq!(
        outcome,
        AnalysisOutcome::Unsupported {
            condition_key: "knee-pain".to_string()
        }
    );
    assert!(!outcome.is_supported());
}

#[test]
fn disabled_condition_is_unsupported() {
    let engine = RatingEngine::new(ConditionRegistry::with_conditions([ConditionKey::Tinnitus]));

    let outcome = engine.analyze("migraine", &prolonged_attacks());

    assert_eq!(
        outcome,
        AnalysisOutcome::Unsupported {
            condition_key: "migraine".to_string()
        }
    );
}

#[test]
fn no_matching_entries_yields_an_empty_result() {
    let entries = vec![flare("k1", "2025-01-01", "knee", 5)];

    let outcome = crate::analysis::analyze("gerd", &entries);
    let result = outcome.into_result().expect("gerd is registered");

    assert!(!result.has_data);
    assert_eq!(result.supported_rating, None);
    assert_eq!(result.next_rating, None);
    assert!(result.rating_rationale.is_empty());
    assert!(result.gaps.is_empty());
    assert!(result.metrics.is_empty());
    assert_eq!(result.max_rating, 60);
}

#[test]
fn malformed_entries_are_excluded_and_counted() {
    let mut entries = vec![
        flare("a", "2025-03-01", "tinnitus", 4),
        flare("b", "2025-03-05", "tinnitus", 6),
        untimed("c", "tinnitus"),
    ];
    entries.push(ObservationEntry {
        severity: Some(14),
        ..flare("d", "2025-03-06", "tinnitus", 0)
    });

    let result = crate::analysis::analyze("tinnitus", &entries)
        .into_result()
        .expect("tinnitus is registered");

    assert_eq!(result.metrics.get("total_entries"), Some(&MetricValue::Count(2)));
    assert_eq!(
        result.metrics.get("excluded_entries"),
        Some(&MetricValue::Count(2))
    );
    assert_eq!(
        result.metrics.get("average_severity"),
        Some(&MetricValue::Number(5.0))
    );
    assert!(result
        .rating_rationale
        .iter()
        .any(|line| line == "2 entries excluded for a missing timestamp or severity"));
}

#[test]
fn only_malformed_entries_means_no_data() {
    let entries = vec![untimed("a", "tinnitus"), untimed("b", "tinnitus")];

    let result = crate::analysis::analyze("tinnitus", &entries)
        .into_result()
        .expect("tinnitus is registered");

    assert!(!result.has_data);
    assert_eq!(result.supported_rating, None);
}

#[test]
fn next_rating_points_at_the_tier_the_gaps_describe() {
    let entries = vec![prostrating_attack("m1", "2025-04-02", 6.0)];

    let result = crate::analysis::analyze("migraine", &entries)
        .into_result()
        .expect("migraine is registered");

    assert_eq!(result.supported_rating, Some(30));
    assert_eq!(result.next_rating, Some(50));
    assert!(result.gaps.iter().all(|gap| gap.ends_with("to reach 50%")));
}

#[test]
fn analysis_leaves_the_input_untouched() {
    let entries = prolonged_attacks();
    let before = entries.clone();

    let first = crate::analysis::analyze("migraine", &entries);
    let second = crate::analysis::analyze("migraine", &entries);

    assert_eq!(entries, before);
    assert_eq!(first, second);
}

#[test]
fn bulk_analysis_follows_registry_order() {
    let entries = prolonged_attacks();
    let measurements = vec![cuff("bp1", "2025-04-01", 150, 102)];
    let snapshot = EvidenceSnapshot::with_measurements(&entries, &measurements);

    let report = RatingEngine::standard().analyze_all(&snapshot);

    let keys: Vec<ConditionKey> = report.results.iter().map(|result| result.condition).collect();
    let registered: Vec<ConditionKey> = ConditionRegistry::standard().keys().collect();
    assert_eq!(keys, registered);

    let migraine = report.result(ConditionKey::Migraine).expect("migraine result");
    assert_eq!(migraine.supported_rating, Some(50));
    let hypertension = report
        .result(ConditionKey::Hypertension)
        .expect("hypertension result");
    assert!(hypertension.has_data);
    assert_eq!(hypertension.supported_rating, Some(10));
    assert!(!report.result(ConditionKey::Asthma).expect("asthma").has_data);
}
