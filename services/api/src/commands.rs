use std::path::PathBuf;

use clap::Args;
use evidence_engine::analysis::report::views::EvidenceInsights;
use evidence_engine::config::AppConfig;
use evidence_engine::error::AppError;
use evidence_engine::{AnalysisOutcome, AnalysisResult, EvidenceReport, RatingEngine};

use crate::infra::{build_engine, load_batch};
use crate::routes::{condition_views, BulkAnalysisResponse};

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Condition slug or diagnostic code (e.g. `migraine` or `8100`)
    #[arg(long)]
    pub(crate) condition: String,
    /// Observation file; `.csv` is read as CSV, anything else as JSON
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Optional measurement file (CSV or JSON)
    #[arg(long)]
    pub(crate) measurements: Option<PathBuf>,
    /// Print the raw analysis as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// Observation file; `.csv` is read as CSV, anything else as JSON
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Optional measurement file (CSV or JSON)
    #[arg(long)]
    pub(crate) measurements: Option<PathBuf>,
    /// Print the summary, insights and per-condition results as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

fn configured_engine() -> Result<RatingEngine, AppError> {
    let config = AppConfig::load()?;
    Ok(build_engine(&config.analysis))
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        condition,
        input,
        measurements,
        json,
    } = args;

    let engine = configured_engine()?;
    let batch = load_batch(&input, measurements.as_ref())?;
    let outcome = engine.analyze_snapshot(&condition, &batch.snapshot());

    if json {
        print_json(&outcome);
        return Ok(());
    }

    match &outcome {
        AnalysisOutcome::Supported(result) => render_result(result),
        AnalysisOutcome::Unsupported { condition_key } => {
            println!("Condition '{}' is not registered", condition_key);
        }
    }
    Ok(())
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let SummaryArgs {
        input,
        measurements,
        json,
    } = args;

    let engine = configured_engine()?;
    let batch = load_batch(&input, measurements.as_ref())?;
    let report = engine.analyze_all(&batch.snapshot());

    if json {
        print_json(&BulkAnalysisResponse::from(report));
        return Ok(());
    }

    render_report(&report);
    Ok(())
}

pub(crate) fn run_conditions() -> Result<(), AppError> {
    let engine = configured_engine()?;

    println!("Registered conditions");
    for condition in condition_views(&engine) {
        println!(
            "- {} ({}) [{}] max {}%",
            condition.label, condition.code, condition.key, condition.max_rating
        );
        for tier in condition.tiers {
            println!("    {:>3}%  {}", tier.percent, tier.summary);
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("JSON output unavailable: {}", err),
    }
}

fn render_result(result: &AnalysisResult) {
    for line in result_lines(result) {
        println!("{}", line);
    }
}

fn result_lines(result: &AnalysisResult) -> Vec<String> {
    let mut lines = vec![format!("{} (diagnostic code {})", result.label, result.code)];
    let Some(rating) = result.supported_rating else {
        lines.push(format!(
            "- No matching observations yet (maximum {}%)",
            result.max_rating
        ));
        return lines;
    };

    lines.push(format!(
        "- Supported rating: {}% of a possible {}%",
        rating, result.max_rating
    ));
    lines.push("Rationale:".to_string());
    lines.extend(result.rating_rationale.iter().map(|line| format!("  - {}", line)));

    if result.gaps.is_empty() {
        lines.push("Missing evidence: none, already at the maximum tier".to_string());
    } else {
        lines.push(match result.next_rating {
            Some(next) => format!("Missing evidence for {}%:", next),
            None => "Missing evidence:".to_string(),
        });
        lines.extend(result.gaps.iter().map(|gap| format!("  - {}", gap)));
    }

    if !result.metrics.is_empty() {
        lines.push("Metrics:".to_string());
        lines.extend(
            result
                .metrics
                .iter()
                .map(|(name, value)| format!("  {:<36} {}", name, value.display())),
        );
    }
    lines
}

fn render_report(report: &EvidenceReport) {
    let summary = report.summary();
    println!("Evidence summary");
    println!(
        "- {} conditions with evidence | {} without",
        summary.with_evidence, summary.without_evidence
    );
    let observations = summary.observations;
    println!(
        "- {} entries ({} malformed, {} unmatched) | {} measurements ({} unused)",
        observations.total_entries,
        observations.malformed_entries,
        observations.unmatched_entries,
        observations.total_measurements,
        observations.unused_measurements
    );

    println!("Conditions:");
    for entry in &summary.conditions {
        match entry.supported_rating {
            Some(rating) => println!(
                "  - {}: {}% of {}% ({} gaps)",
                entry.label, rating, entry.max_rating, entry.gap_count
            ),
            None => println!("  - {}: no evidence", entry.label),
        }
    }

    render_insights(&report.insights());
}

fn render_insights(insights: &EvidenceInsights) {
    println!("Insights ({} coverage):", insights.coverage_level.label());
    if let Some(focus) = insights.focus_condition {
        println!("  Focus next on {}", focus);
    }
    for line in &insights.observations {
        println!("  - {}", line);
    }
    if !insights.recommended_actions.is_empty() {
        println!("Recommended actions:");
        for action in &insights.recommended_actions {
            println!("  - {}", action);
        }
    }
}
