use super::ConditionKey;
use crate::analysis::metrics::{
    busiest_window, days_answered_yes, rate_per_period, tally, DAYS_PER_MONTH, DAYS_PER_YEAR,
};
use crate::analysis::{
    ConditionModule, CriteriaTable, CriteriaTier, MetricsBag, Predicate, Requirement, Threshold,
};
use crate::observations::{
    ConditionPayload, LogSelector, MeasurementKind, MeasurementReading, RespiratoryDetails,
    SelectedEntry, Selection,
};

const LOWEST_FEV1: &str = "lowest_fev1_percent";
const RESCUE_INHALER_DAYS: &str = "rescue_inhaler_days";
const CONTROLLER_DAYS: &str = "controller_days";
const CONTROLLER_SHARE: &str = "controller_share";
const STEROID_COURSES: &str = "oral_steroid_courses_12mo";
const VISITS_PER_MONTH: &str = "exacerbation_visits_per_month";

const FEV1: Requirement = Requirement {
    metric: LOWEST_FEV1,
    threshold: Threshold::AtMost(80.0),
    evidence: "FEV-1 percent predicted",
};

pub(crate) static MODULE: ConditionModule = ConditionModule {
    key: ConditionKey::Asthma,
    selector: LogSelector {
        condition: ConditionKey::Asthma,
        aliases: &["bronchial-asthma", "wheezing"],
        measurements: &[MeasurementKind::Fev1],
    },
    metrics: &[
        LOWEST_FEV1,
        RESCUE_INHALER_DAYS,
        CONTROLLER_DAYS,
        CONTROLLER_SHARE,
        STEROID_COURSES,
        VISITS_PER_MONTH,
    ],
    aggregate,
    criteria: &CRITERIA,
};

static CRITERIA: CriteriaTable = CriteriaTable {
    lowest: CriteriaTier {
        percent: 0,
        predicate: Predicate::Always,
        summary: "asthma symptoms logged without reduced lung function or inhalational therapy",
    },
    higher: &[
        CriteriaTier {
            percent: 10,
            predicate: Predicate::Any(&[
                FEV1,
                Requirement {
                    metric: RESCUE_INHALER_DAYS,
                    threshold: Threshold::AtLeast(1.0),
                    evidence: "days using a rescue inhaler",
                },
            ]),
            summary: "FEV-1 of 71 to 80 percent predicted, or intermittent inhalational therapy",
        },
        CriteriaTier {
            percent: 30,
            predicate: Predicate::Any(&[
                Requirement {
                    threshold: Threshold::AtMost(70.0),
                    ..FEV1
                },
                Requirement {
                    metric: CONTROLLER_SHARE,
                    threshold: Threshold::AtLeast(0.8),
                    evidence: "share of entries with daily controller therapy",
                },
            ]),
            summary: "FEV-1 of 56 to 70 percent predicted, or daily inhalational therapy",
        },
        CriteriaTier {
            percent: 60,
            predicate: Predicate::Any(&[
                Requirement {
                    threshold: Threshold::AtMost(55.0),
                    ..FEV1
                },
                Requirement {
                    metric: VISITS_PER_MONTH,
                    threshold: Threshold::AtLeast(1.0),
                    evidence: "physician visits for exacerbations per month",
                },
                Requirement {
                    metric: STEROID_COURSES,
                    threshold: Threshold::AtLeast(3.0),
                    evidence: "courses of oral corticosteroids within 12 months",
                },
            ]),
            summary: "FEV-1 of 40 to 55 percent predicted, monthly visits for exacerbations, or three or more steroid courses a year",
        },
        CriteriaTier {
            percent: 100,
            predicate: Predicate::Any(&[Requirement {
                threshold: Threshold::Below(40.0),
                ..FEV1
            }]),
            summary: "FEV-1 less than 40 percent predicted",
        },
    ],
};

fn details<'a>(selected: &SelectedEntry<'a>) -> Option<&'a RespiratoryDetails> {
    match selected.payload()? {
        ConditionPayload::Respiratory(details) => Some(details),
        _ => None,
    }
}

fn controller(selected: &SelectedEntry<'_>) -> Option<bool> {
    details(selected)?.daily_controller_used
}

fn aggregate(selection: &Selection<'_>, bag: &mut MetricsBag) {
    let lowest_fev1 = selection
        .measurements
        .iter()
        .filter_map(|selected| match selected.reading() {
            MeasurementReading::Fev1 { percent_predicted } => Some(f64::from(percent_predicted)),
            _ => None,
        })
        .reduce(f64::min);
    bag.number_or_unreported(LOWEST_FEV1, lowest_fev1);

    bag.count_or_unreported(
        RESCUE_INHALER_DAYS,
        days_answered_yes(&selection.entries, |selected| {
            details(selected).and_then(|details| details.rescue_inhaler_used)
        }),
    );

    bag.count_or_unreported(
        CONTROLLER_DAYS,
        days_answered_yes(&selection.entries, controller),
    );
    bag.answered_share(CONTROLLER_SHARE, tally(&selection.entries, controller));

    bag.answered_count(
        STEROID_COURSES,
        busiest_window(selection, DAYS_PER_YEAR, |selected| {
            details(selected).and_then(|details| details.oral_steroid_course)
        }),
    );

    let visits = tally(&selection.entries, |selected| {
        details(selected).and_then(|details| details.physician_visit_for_exacerbation)
    });
    bag.number_or_unreported(
        VISITS_PER_MONTH,
        (visits.answered() > 0)
            .then(|| rate_per_period(visits.yes, selection.span_days(), DAYS_PER_MONTH)),
    );
}
