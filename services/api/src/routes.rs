use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use evidence_engine::analysis::report::views::{EvidenceInsights, EvidenceSummary};
use evidence_engine::error::AppError;
use evidence_engine::import::ObservationImporter;
use evidence_engine::observations::{
    Measurement, ObservationBatch, ObservationEntry, ObservationStore,
};
use evidence_engine::{AnalysisOutcome, AnalysisResult, ConditionKey, EvidenceReport, RatingEngine};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::infra::{AnalysisState, AppState};

#[derive(Debug, Serialize)]
pub(crate) struct TierView {
    pub(crate) percent: u8,
    pub(crate) summary: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConditionView {
    pub(crate) key: ConditionKey,
    pub(crate) code: &'static str,
    pub(crate) label: &'static str,
    pub(crate) max_rating: u8,
    pub(crate) tiers: Vec<TierView>,
}

pub(crate) fn condition_views(engine: &RatingEngine) -> Vec<ConditionView> {
    engine
        .registry()
        .modules()
        .map(|module| ConditionView {
            key: module.key,
            code: module.key.code(),
            label: module.key.label(),
            max_rating: module.criteria.max_percent(),
            tiers: module
                .criteria
                .tiers()
                .map(|tier| TierView {
                    percent: tier.percent,
                    summary: tier.summary,
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkAnalysisResponse {
    pub(crate) summary: EvidenceSummary,
    pub(crate) insights: EvidenceInsights,
    pub(crate) results: Vec<AnalysisResult>,
}

impl From<EvidenceReport> for BulkAnalysisResponse {
    fn from(report: EvidenceReport) -> Self {
        Self {
            summary: report.summary(),
            insights: report.insights(),
            results: report.results,
        }
    }
}

/// Observations posted inline, either as structured records or as a CSV export.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnalysisRequest {
    #[serde(default)]
    pub(crate) condition: Option<String>,
    #[serde(default)]
    pub(crate) entries: Vec<ObservationEntry>,
    #[serde(default)]
    pub(crate) measurements: Vec<Measurement>,
    #[serde(default)]
    pub(crate) entries_csv: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum AnalysisResponse {
    Condition(AnalysisOutcome),
    All(BulkAnalysisResponse),
}

pub(crate) fn analysis_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/conditions", get(conditions_endpoint))
        .route(
            "/api/v1/analysis",
            get(stored_summary_endpoint).post(posted_analysis_endpoint),
        )
        .route("/api/v1/analysis/:condition", get(stored_condition_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn conditions_endpoint(
    Extension(state): Extension<AnalysisState>,
) -> Json<Vec<ConditionView>> {
    Json(condition_views(&state.engine))
}

pub(crate) async fn stored_summary_endpoint(
    Extension(state): Extension<AnalysisState>,
) -> Result<Json<BulkAnalysisResponse>, AppError> {
    let batch = state.store.batch()?;
    let report = state.engine.analyze_all(&batch.snapshot());
    Ok(Json(report.into()))
}

/// Unknown or disabled conditions answer 200 with an `unsupported` status.
pub(crate) async fn stored_condition_endpoint(
    Extension(state): Extension<AnalysisState>,
    Path(condition): Path<String>,
) -> Result<Json<AnalysisOutcome>, AppError> {
    let batch = state.store.batch()?;
    Ok(Json(
        state.engine.analyze_snapshot(&condition, &batch.snapshot()),
    ))
}

pub(crate) async fn posted_analysis_endpoint(
    Extension(state): Extension<AnalysisState>,
    Json(payload): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let AnalysisRequest {
        condition,
        entries,
        measurements,
        entries_csv,
    } = payload;

    let mut batch = ObservationBatch {
        entries,
        measurements,
    };
    if let Some(csv) = entries_csv {
        batch.extend(ObservationImporter::from_csv_reader(csv.as_bytes())?);
    }

    let snapshot = batch.snapshot();
    let response = match condition {
        Some(condition) => {
            AnalysisResponse::Condition(state.engine.analyze_snapshot(&condition, &snapshot))
        }
        None => AnalysisResponse::All(state.engine.analyze_all(&snapshot).into()),
    };
    Ok(Json(response))
}
