mod common;

use common::attack;
use evidence_engine::analysis::MetricValue;
use evidence_engine::observations::{EntryTags, ObservationEntry};

#[test]
fn four_prolonged_prostrating_attacks_in_thirty_days_reach_fifty_percent() {
    let entries = vec![
        attack("a", "2025-06-01T07:00:00Z", 4.0),
        attack("b", "2025-06-08T07:00:00Z", 9.0),
        attack("c", "2025-06-15T07:00:00Z", 5.5),
        attack("d", "2025-06-22T07:00:00Z", 24.0),
    ];

    let result = evidence_engine::analyze("migraine", &entries)
        .into_result()
        .expect("migraine is registered");

    assert_eq!(result.supported_rating, Some(50));
    assert_eq!(result.max_rating, 50);
    assert!(result.gaps.is_empty());
    assert!(result
        .rating_rationale
        .iter()
        .any(|line| line.contains(": 4 (meets at least 4)")));
}

#[test]
fn a_single_attack_resolves_lower_and_names_the_missing_attacks() {
    let entries = vec![attack("a", "2025-06-01", 6.0)];

    let result = evidence_engine::analyze("migraine", &entries)
        .into_result()
        .expect("migraine is registered");

    let rating = result.supported_rating.expect("has data");
    assert!(rating < 50);
    assert_eq!(result.gaps.len(), 1);
    assert!(result.gaps[0].contains("3 more prolonged prostrating attacks"));
    assert!(result.gaps[0].ends_with("to reach 50%"));
}

#[test]
fn attacks_spread_over_months_fall_short_of_fifty_percent() {
    let entries = vec![
        attack("a", "2025-03-01", 6.0),
        attack("b", "2025-03-08", 6.0),
        attack("c", "2025-03-15", 6.0),
        attack("d", "2025-06-01", 6.0),
    ];

    let result = evidence_engine::analyze("migraine", &entries)
        .into_result()
        .expect("migraine is registered");

    assert_eq!(
        result.metrics.get("prolonged_prostrating_attacks_30d"),
        Some(&MetricValue::Count(3))
    );
    assert_eq!(result.supported_rating, Some(30));
    assert_eq!(result.next_rating, Some(50));
}

#[test]
fn severity_only_entries_count_generically_but_satisfy_nothing_specific() {
    let entries = vec![
        ObservationEntry::new("a", "2025-06-01", 6).tagged("migraine"),
        ObservationEntry::new("b", "2025-06-03", 8)
            .tagged("headache")
            .with_tags(EntryTags {
                flare_up: Some(true),
                ..EntryTags::default()
            }),
    ];

    let result = evidence_engine::analyze("migraine", &entries)
        .into_result()
        .expect("migraine is registered");

    assert!(result.has_data);
    assert_eq!(result.supported_rating, Some(0));
    assert_eq!(result.metrics.get("total_entries"), Some(&MetricValue::Count(2)));
    assert_eq!(
        result.metrics.get("average_severity"),
        Some(&MetricValue::Number(7.0))
    );
    assert_eq!(result.metrics.get("flare_ups"), Some(&MetricValue::Count(1)));
    assert_eq!(
        result.metrics.get("prostrating_attacks"),
        Some(&MetricValue::Unreported)
    );
    assert!(result.rating_rationale[0].starts_with("Evidence supports 0%"));
    assert_eq!(
        result.gaps,
        vec!["record prostrating attacks per month (not yet reported) to reach 10%".to_string()]
    );
}
