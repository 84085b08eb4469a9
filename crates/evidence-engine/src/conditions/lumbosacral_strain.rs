use super::ConditionKey;
use crate::analysis::metrics::{most_frequent, tally, DAYS_PER_WEEK, DAYS_PER_YEAR};
use crate::analysis::{
    ConditionModule, CriteriaTable, CriteriaTier, MetricsBag, Predicate, Requirement, Threshold,
};
use crate::observations::{
    ConditionPayload, LogSelector, MeasurementKind, MeasurementReading, PainDetails,
    SelectedEntry, Selection,
};

const MIN_FORWARD_FLEXION: &str = "min_forward_flexion_degrees";
const MUSCLE_SPASM: &str = "muscle_spasm_episodes";
const ABNORMAL_GAIT: &str = "abnormal_gait_episodes";
const INCAPACITATING_WEEKS: &str = "incapacitating_weeks_12mo";
const RADIATING: &str = "radiating_episodes";
const PAIN_TYPE: &str = "most_common_pain_type";

const FLEXION: Requirement = Requirement {
    metric: MIN_FORWARD_FLEXION,
    threshold: Threshold::AtMost(85.0),
    evidence: "forward flexion in degrees",
};

pub(crate) static MODULE: ConditionModule = ConditionModule {
    key: ConditionKey::LumbosacralStrain,
    selector: LogSelector {
        condition: ConditionKey::LumbosacralStrain,
        aliases: &["back-pain", "low-back-pain", "lower-back-pain", "back-strain"],
        measurements: &[MeasurementKind::ForwardFlexion],
    },
    metrics: &[
        MIN_FORWARD_FLEXION,
        MUSCLE_SPASM,
        ABNORMAL_GAIT,
        INCAPACITATING_WEEKS,
        RADIATING,
        PAIN_TYPE,
    ],
    aggregate,
    criteria: &CRITERIA,
};

static CRITERIA: CriteriaTable = CriteriaTable {
    lowest: CriteriaTier {
        percent: 0,
        predicate: Predicate::Always,
        summary: "back pain logged without limitation of motion or incapacitating episodes",
    },
    higher: &[
        CriteriaTier {
            percent: 10,
            predicate: Predicate::Any(&[
                FLEXION,
                Requirement {
                    metric: MUSCLE_SPASM,
                    threshold: Threshold::AtLeast(1.0),
                    evidence: "episodes of muscle spasm",
                },
                Requirement {
                    metric: INCAPACITATING_WEEKS,
                    threshold: Threshold::AtLeast(1.0),
                    evidence: "weeks of incapacitating episodes within 12 months",
                },
            ]),
            summary: "forward flexion not greater than 85 degrees, muscle spasm, or at least one week of incapacitating episodes",
        },
        CriteriaTier {
            percent: 20,
            predicate: Predicate::Any(&[
                Requirement {
                    threshold: Threshold::AtMost(60.0),
                    ..FLEXION
                },
                Requirement {
                    metric: ABNORMAL_GAIT,
                    threshold: Threshold::AtLeast(1.0),
                    evidence: "episodes of spasm severe enough to cause abnormal gait",
                },
                Requirement {
                    metric: INCAPACITATING_WEEKS,
                    threshold: Threshold::AtLeast(2.0),
                    evidence: "weeks of incapacitating episodes within 12 months",
                },
            ]),
            summary: "forward flexion not greater than 60 degrees, abnormal gait from spasm, or at least two weeks of incapacitating episodes",
        },
        CriteriaTier {
            percent: 40,
            predicate: Predicate::Any(&[
                Requirement {
                    threshold: Threshold::AtMost(30.0),
                    ..FLEXION
                },
                Requirement {
                    metric: INCAPACITATING_WEEKS,
                    threshold: Threshold::AtLeast(4.0),
                    evidence: "weeks of incapacitating episodes within 12 months",
                },
            ]),
            summary: "forward flexion 30 degrees or less, or at least four weeks of incapacitating episodes",
        },
        CriteriaTier {
            percent: 60,
            predicate: Predicate::All(&[Requirement {
                metric: INCAPACITATING_WEEKS,
                threshold: Threshold::AtLeast(6.0),
                evidence: "weeks of incapacitating episodes within 12 months",
            }]),
            summary: "incapacitating episodes totaling at least six weeks within 12 months",
        },
    ],
};

fn details<'a>(selected: &SelectedEntry<'a>) -> Option<&'a PainDetails> {
    match selected.payload()? {
        ConditionPayload::Pain(details) => Some(details),
        _ => None,
    }
}

fn aggregate(selection: &Selection<'_>, bag: &mut MetricsBag) {
    let min_flexion = selection
        .measurements
        .iter()
        .filter_map(|selected| match selected.reading() {
            MeasurementReading::ForwardFlexion { degrees } => Some(f64::from(degrees)),
            _ => None,
        })
        .reduce(f64::min);
    bag.number_or_unreported(MIN_FORWARD_FLEXION, min_flexion);

    bag.answered_count(
        MUSCLE_SPASM,
        tally(&selection.entries, |selected| {
            details(selected).and_then(|details| details.muscle_spasm)
        }),
    );
    bag.answered_count(
        ABNORMAL_GAIT,
        tally(&selection.entries, |selected| {
            details(selected).and_then(|details| details.abnormal_gait)
        }),
    );
    bag.answered_count(
        RADIATING,
        tally(&selection.entries, |selected| {
            details(selected).and_then(|details| details.radiating)
        }),
    );

    // Heaviest 12-month stretch of bed rest.
    let bed_rest = selection
        .rolling_windows(DAYS_PER_YEAR)
        .filter_map(|window| {
            window
                .iter()
                .filter_map(|selected| details(selected).and_then(|details| details.bed_rest_days))
                .filter(|days| days.is_finite() && *days >= 0.0)
                .map(f64::from)
                .reduce(|total, days| total + days)
        })
        .reduce(f64::max);
    bag.number_or_unreported(INCAPACITATING_WEEKS, bed_rest.map(|days| days / DAYS_PER_WEEK));

    bag.category(
        PAIN_TYPE,
        most_frequent(
            selection
                .entries
                .iter()
                .filter_map(|selected| details(selected).and_then(|details| details.pain_type))
                .map(|pain_type| pain_type.label()),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MetricValue;
    use crate::observations::{EvidenceSnapshot, Measurement, ObservationEntry, PainType};

    fn pain(id: &str, timestamp: &str, details: PainDetails) -> ObservationEntry {
        ObservationEntry::new(id, timestamp, 6).with_payload(ConditionPayload::Pain(details))
    }

    fn flexion(id: &str, timestamp: &str, degrees: f32) -> Measurement {
        Measurement::new(id, timestamp, MeasurementReading::ForwardFlexion { degrees })
    }

    #[test]
    fn lowest_flexion_reading_drives_the_rating() {
        let entries = vec![pain("p1", "2025-02-01", PainDetails::default())];
        let measurements = vec![
            flexion("rom-1", "2025-02-01", 70.0),
            flexion("rom-2", "2025-02-15", 55.0),
        ];

        let result = MODULE.analyze(&EvidenceSnapshot::with_measurements(&entries, &measurements));

        assert_eq!(result.supported_rating, Some(20));
        assert_eq!(
            result.metrics.get(MIN_FORWARD_FLEXION),
            Some(&MetricValue::Number(55.0))
        );
        assert_eq!(result.gaps.len(), 1);
        assert!(result.gaps[0].starts_with("record forward flexion in degrees at or below 30 (lowest so far 55)"));
        assert!(result.gaps[0].ends_with("to reach 40%"));
    }

    #[test]
    fn bed_rest_more_than_a_year_apart_is_not_summed() {
        let entries = vec![
            pain(
                "old",
                "2023-01-10",
                PainDetails {
                    bed_rest_days: Some(21.0),
                    ..PainDetails::default()
                },
            ),
            pain(
                "recent",
                "2025-01-10",
                PainDetails {
                    bed_rest_days: Some(14.0),
                    ..PainDetails::default()
                },
            ),
        ];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(
            result.metrics.get(INCAPACITATING_WEEKS),
            Some(&MetricValue::Number(3.0))
        );
        assert_eq!(result.supported_rating, Some(20));
    }

    #[test]
    fn later_bed_rest_keeps_the_heaviest_year() {
        let heavy = PainDetails {
            bed_rest_days: Some(21.0),
            ..PainDetails::default()
        };
        let mut entries = vec![
            pain("a", "2024-01-10", heavy.clone()),
            pain("b", "2024-03-10", heavy),
        ];
        let before = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        entries.push(pain(
            "c",
            "2025-06-01",
            PainDetails {
                bed_rest_days: Some(2.0),
                ..PainDetails::default()
            },
        ));
        let after = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(before.supported_rating, Some(60));
        assert_eq!(after.supported_rating, Some(60));
        assert_eq!(
            after.metrics.get(INCAPACITATING_WEEKS),
            Some(&MetricValue::Number(6.0))
        );
    }

    #[test]
    fn six_weeks_of_bed_rest_reach_the_maximum() {
        let entries = vec![
            pain(
                "a",
                "2025-01-10",
                PainDetails {
                    bed_rest_days: Some(21.0),
                    ..PainDetails::default()
                },
            ),
            pain(
                "b",
                "2025-06-10",
                PainDetails {
                    bed_rest_days: Some(21.0),
                    muscle_spasm: Some(true),
                    pain_type: Some(PainType::Sharp),
                    ..PainDetails::default()
                },
            ),
        ];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(result.supported_rating, Some(60));
        assert!(result.gaps.is_empty());
        assert_eq!(
            result.metrics.get(PAIN_TYPE),
            Some(&MetricValue::Category("sharp".to_string()))
        );
    }

    #[test]
    fn unanswered_spasm_is_not_a_denial() {
        let entries = vec![pain("p1", "2025-02-01", PainDetails::default())];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(result.supported_rating, Some(0));
        assert_eq!(result.metrics.get(MUSCLE_SPASM), Some(&MetricValue::Unreported));
        assert_eq!(
            result.metrics.get(MIN_FORWARD_FLEXION),
            Some(&MetricValue::Unreported)
        );
    }
}
