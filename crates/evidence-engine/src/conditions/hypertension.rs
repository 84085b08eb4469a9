use super::ConditionKey;
use crate::analysis::metrics::lower_median;
use crate::analysis::{
    ConditionModule, CriteriaTable, CriteriaTier, MetricsBag, Predicate, Requirement, Threshold,
};
use crate::observations::{LogSelector, MeasurementKind, MeasurementReading, Selection};

const READINGS: &str = "blood_pressure_readings";
const PREDOMINANT_SYSTOLIC: &str = "predominant_systolic";
const PREDOMINANT_DIASTOLIC: &str = "predominant_diastolic";
const MAX_DIASTOLIC: &str = "max_diastolic";

const fn diastolic(limit: f64) -> Requirement {
    Requirement {
        metric: PREDOMINANT_DIASTOLIC,
        threshold: Threshold::AtLeast(limit),
        evidence: "predominant diastolic pressure",
    }
}

const fn systolic(limit: f64) -> Requirement {
    Requirement {
        metric: PREDOMINANT_SYSTOLIC,
        threshold: Threshold::AtLeast(limit),
        evidence: "predominant systolic pressure",
    }
}

pub(crate) static MODULE: ConditionModule = ConditionModule {
    key: ConditionKey::Hypertension,
    selector: LogSelector {
        condition: ConditionKey::Hypertension,
        aliases: &["high-blood-pressure", "blood-pressure", "htn"],
        measurements: &[MeasurementKind::BloodPressure],
    },
    metrics: &[READINGS, PREDOMINANT_SYSTOLIC, PREDOMINANT_DIASTOLIC, MAX_DIASTOLIC],
    aggregate,
    criteria: &CRITERIA,
};

static CRITERIA: CriteriaTable = CriteriaTable {
    lowest: CriteriaTier {
        percent: 0,
        predicate: Predicate::Always,
        summary: "blood pressure logged below the compensable readings",
    },
    higher: &[
        CriteriaTier {
            percent: 10,
            predicate: Predicate::Any(&[diastolic(100.0), systolic(160.0)]),
            summary: "diastolic pressure predominantly 100 or more, or systolic predominantly 160 or more",
        },
        CriteriaTier {
            percent: 20,
            predicate: Predicate::Any(&[diastolic(110.0), systolic(200.0)]),
            summary: "diastolic pressure predominantly 110 or more, or systolic predominantly 200 or more",
        },
        CriteriaTier {
            percent: 40,
            predicate: Predicate::All(&[diastolic(120.0)]),
            summary: "diastolic pressure predominantly 120 or more",
        },
        CriteriaTier {
            percent: 60,
            predicate: Predicate::All(&[diastolic(130.0)]),
            summary: "diastolic pressure predominantly 130 or more",
        },
    ],
};

/// "Predominantly" is read as the lower median of all readings.
fn aggregate(selection: &Selection<'_>, bag: &mut MetricsBag) {
    let readings: Vec<(f64, f64)> = selection
        .measurements
        .iter()
        .filter_map(|selected| match selected.reading() {
            MeasurementReading::BloodPressure {
                systolic,
                diastolic,
            } => Some((f64::from(systolic), f64::from(diastolic))),
            _ => None,
        })
        .collect();

    bag.count(READINGS, readings.len());
    bag.number_or_unreported(
        PREDOMINANT_SYSTOLIC,
        lower_median(readings.iter().map(|(systolic, _)| *systolic).collect()),
    );
    bag.number_or_unreported(
        PREDOMINANT_DIASTOLIC,
        lower_median(readings.iter().map(|(_, diastolic)| *diastolic).collect()),
    );
    bag.number_or_unreported(
        MAX_DIASTOLIC,
        readings.iter().map(|(_, diastolic)| *diastolic).reduce(f64::max),
    );
}
