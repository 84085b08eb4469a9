use super::criteria::{ClauseStatus, CriteriaTable, Predicate, Requirement, Threshold};
use super::evaluator::TierDecision;
use super::metrics::{
    format_number, MetricValue, MetricsBag, AVERAGE_SEVERITY, EXCLUDED_ENTRIES, FLARE_UPS,
    MAX_SEVERITY, MEASUREMENTS, SPAN_DAYS, TOTAL_ENTRIES,
};

/// Display-ready statements behind the chosen tier.
///
/// Only metrics present in the bag and actually reported are mentioned.
pub(crate) fn rationale(decision: &TierDecision<'_>, bag: &MetricsBag) -> Vec<String> {
    let tier = decision.tier;
    let mut statements = vec![format!(
        "Evidence supports {}%: {}",
        tier.percent, tier.summary
    )];

    if decision.matched {
        statements.extend(
            tier.predicate
                .requirements()
                .iter()
                .filter(|requirement| requirement.check(bag) == ClauseStatus::Met)
                .filter_map(|requirement| met_statement(requirement, bag)),
        );
    } else {
        statements.push(format!(
            "No tier criteria met; defaulting to the lowest defined tier ({}%)",
            tier.percent
        ));
    }

    statements.extend(generic_facts(bag));
    statements
}

fn met_statement(requirement: &Requirement, bag: &MetricsBag) -> Option<String> {
    let value = bag.get(requirement.metric)?;
    Some(format!(
        "{}: {} (meets {})",
        requirement.evidence,
        value.display(),
        requirement.threshold.describe()
    ))
}

fn generic_facts(bag: &MetricsBag) -> Vec<String> {
    let mut facts = Vec::new();

    if let Some(total) = bag.number(TOTAL_ENTRIES).filter(|total| *total > 0.0) {
        let span = bag.number(SPAN_DAYS).unwrap_or_default();
        facts.push(format!(
            "{} matching {} over {} days",
            format_number(total),
            plural(total, "entry", "entries"),
            format_number(span)
        ));
    }

    if let (Some(average), Some(max)) = (
        bag.number(AVERAGE_SEVERITY),
        bag.number(MAX_SEVERITY),
    ) {
        facts.push(format!(
            "average severity {} of 10 (maximum {})",
            format_number(average),
            format_number(max)
        ));
    }

    if let Some(flare_ups) = bag.number(FLARE_UPS).filter(|count| *count > 0.0) {
        facts.push(format!(
            "{} {} marked",
            format_number(flare_ups),
            plural(flare_ups, "flare-up", "flare-ups")
        ));
    }

    if let Some(readings) = bag.number(MEASUREMENTS).filter(|count| *count > 0.0) {
        facts.push(format!(
            "{} {} on record",
            format_number(readings),
            plural(readings, "measurement", "measurements")
        ));
    }

    if let Some(excluded) = bag.number(EXCLUDED_ENTRIES).filter(|count| *count > 0.0) {
        facts.push(format!(
            "{} {} excluded for a missing timestamp or severity",
            format_number(excluded),
            plural(excluded, "entry", "entries")
        ));
    }

    facts
}

fn plural(count: f64, one: &'static str, many: &'static str) -> &'static str {
    if (count - 1.0).abs() < f64::EPSILON {
        one
    } else {
        many
    }
}

/// Outstanding evidence for the tier immediately above the chosen one.
///
/// Empty when the chosen tier is already the maximum.
pub(crate) fn gaps(
    table: &CriteriaTable,
    decision: &TierDecision<'_>,
    bag: &MetricsBag,
) -> Vec<String> {
    let Some(next) = table.next_above(decision.tier.percent) else {
        return Vec::new();
    };

    let unmet: Vec<&Requirement> = next
        .predicate
        .requirements()
        .iter()
        .filter(|requirement| requirement.check(bag) != ClauseStatus::Met)
        .collect();

    match next.predicate {
        Predicate::All(_) => unmet
            .into_iter()
            .map(|requirement| format!("{} to reach {}%", shortfall(requirement, bag), next.percent))
            .collect(),
        Predicate::Any(_) => {
            let alternatives: Vec<String> = unmet
                .into_iter()
                .map(|requirement| shortfall(requirement, bag))
                .collect();
            vec![format!(
                "{} to reach {}%",
                alternatives.join(", or "),
                next.percent
            )]
        }
        Predicate::Always => Vec::new(),
    }
}

/// What is missing for one clause, phrased as evidence still to collect.
fn shortfall(requirement: &Requirement, bag: &MetricsBag) -> String {
    let evidence = requirement.evidence;
    let value = match bag.get(requirement.metric) {
        None | Some(MetricValue::Unreported) => {
            return format!("record {evidence} (not yet reported)");
        }
        Some(value) => value,
    };

    match (requirement.threshold, value) {
        (Threshold::AtLeast(limit), MetricValue::Count(current)) => {
            let needed = limit.ceil().max(0.0) as u32;
            count_shortfall(evidence, *current, needed)
        }
        (Threshold::Above(limit), MetricValue::Count(current)) => {
            let needed = limit.floor().max(-1.0) as i64 + 1;
            count_shortfall(evidence, *current, u32::try_from(needed).unwrap_or(0))
        }
        (Threshold::AtLeast(limit), current) => format!(
            "raise {evidence} from {} to at least {}",
            current.display(),
            format_number(limit)
        ),
        (Threshold::Above(limit), current) => format!(
            "raise {evidence} from {} to above {}",
            current.display(),
            format_number(limit)
        ),
        (Threshold::AtMost(limit), current) => format!(
            "record {evidence} at or below {} (lowest so far {})",
            format_number(limit),
            current.display()
        ),
        (Threshold::Below(limit), current) => format!(
            "record {evidence} below {} (lowest so far {})",
            format_number(limit),
            current.display()
        ),
        (Threshold::IsTrue, _) => format!("document {evidence}"),
        (Threshold::OneOf(options), current) => format!(
            "document {evidence} as {} (currently {})",
            options.join(" or "),
            current.display()
        ),
    }
}

fn count_shortfall(evidence: &str, current: u32, needed: u32) -> String {
    let more = needed.saturating_sub(current).max(1);
    format!("document {more} more {evidence} (currently {current}, need {needed})")
}
