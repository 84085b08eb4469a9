use super::views::{CoverageLevel, EvidenceInsights, EvidenceSummary, FocusEntry};
use crate::analysis::AnalysisResult;

const MAX_RECOMMENDATIONS: usize = 3;

pub(crate) fn generate_insights(
    summary: &EvidenceSummary,
    results: &[AnalysisResult],
) -> EvidenceInsights {
    let registered = summary.conditions.len();

    let coverage_level = if registered > 0 && summary.with_evidence == registered {
        CoverageLevel::Complete
    } else if summary.with_evidence > 0 && summary.with_evidence * 2 >= registered {
        CoverageLevel::Partial
    } else {
        CoverageLevel::Sparse
    };

    let mut focus: Vec<(FocusEntry, Option<&String>)> = results
        .iter()
        .filter(|result| result.has_data && !result.at_max_rating())
        .filter_map(|result| {
            Some((
                FocusEntry {
                    condition: result.condition,
                    label: result.label,
                    supported_rating: result.supported_rating?,
                    next_rating: result.next_rating?,
                    gap_count: result.gaps.len(),
                },
                result.gaps.first(),
            ))
        })
        .collect();
    focus.sort_by(|(a, _), (b, _)| {
        a.gap_count
            .cmp(&b.gap_count)
            .then_with(|| a.label.cmp(b.label))
    });

    let focus_condition = focus.first().map(|(entry, _)| entry.label);

    let recommended_actions: Vec<String> = focus
        .iter()
        .filter_map(|(entry, gap)| gap.map(|gap| format!("{}: {}", entry.label, gap)))
        .take(MAX_RECOMMENDATIONS)
        .collect();

    let no_evidence_yet: Vec<&'static str> = summary
        .conditions
        .iter()
        .filter(|entry| !entry.has_data)
        .map(|entry| entry.label)
        .collect();

    let mut observations = vec![format!(
        "{} of {} registered conditions have evidence",
        summary.with_evidence, registered
    )];

    observations.extend(
        summary
            .conditions
            .iter()
            .filter(|entry| entry.has_data && entry.supported_rating == Some(entry.max_rating))
            .map(|entry| {
                format!(
                    "{} is documented at its maximum rating of {}%",
                    entry.label, entry.max_rating
                )
            }),
    );

    let coverage = &summary.observations;
    if coverage.malformed_entries > 0 {
        observations.push(format!(
            "{} entries skipped for a missing timestamp or out-of-range severity",
            coverage.malformed_entries
        ));
    }
    if coverage.unmatched_entries > 0 {
        observations.push(format!(
            "{} entries did not match any registered condition",
            coverage.unmatched_entries
        ));
    }
    if coverage.unused_measurements > 0 {
        observations.push(format!(
            "{} measurements are not used by any registered condition",
            coverage.unused_measurements
        ));
    }

    EvidenceInsights {
        coverage_level,
        focus_condition,
        focus: focus.into_iter().map(|(entry, _)| entry).collect(),
        no_evidence_yet,
        observations,
        recommended_actions,
    }
}
