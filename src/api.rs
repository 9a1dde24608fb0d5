// src/api.rs
//! JSON surface for the presentation layer. Holds no state beyond the shared
//! pipeline handle.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::PipelineError;
use crate::ingest;
use crate::pipeline::{CommentAnalysis, OpinionPipeline};
use crate::report::CorpusReport;
use crate::sentiment::{ClassifierMode, SentimentLabel};
use crate::summarize::SummaryResult;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<OpinionPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<OpinionPipeline>) -> Self {
        Self { pipeline }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/labels", get(labels))
        .route("/report", post(report))
        .route("/analyze", post(analyze))
        .route("/classify", post(classify))
        .route("/summarize", post(summarize))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = match &self {
            PipelineError::MalformedInput(_) | PipelineError::EmptyInput => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PipelineError::ClassificationUnavailable(_)
            | PipelineError::SummarizationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
struct TextReq {
    text: String,
}

type TextPayload = Result<Json<TextReq>, JsonRejection>;

/// Body rejections answer in the same JSON error shape as pipeline errors.
fn text_of(payload: TextPayload) -> Result<String, PipelineError> {
    payload
        .map(|Json(req)| req.text)
        .map_err(|rej| PipelineError::MalformedInput(rej.body_text()))
}

#[derive(Serialize)]
struct LabelsResp {
    mode: ClassifierMode,
    labels: Vec<SentimentLabel>,
}

#[derive(Serialize)]
struct ClassifyResp {
    sentiment: SentimentLabel,
}

async fn labels(State(state): State<AppState>) -> Json<LabelsResp> {
    Json(LabelsResp {
        mode: state.pipeline.mode(),
        labels: state.pipeline.labels().to_vec(),
    })
}

/// Body is the uploaded document as-is; parsing failures are `MalformedInput`.
async fn report(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CorpusReport>, PipelineError> {
    let comments = ingest::parse_batch(&body)?;
    let report = state.pipeline.build_report(&comments).await?;
    Ok(Json(report))
}

async fn analyze(
    State(state): State<AppState>,
    payload: TextPayload,
) -> Result<Json<CommentAnalysis>, PipelineError> {
    let text = text_of(payload)?;
    Ok(Json(state.pipeline.analyze_comment(&text).await?))
}

async fn classify(
    State(state): State<AppState>,
    payload: TextPayload,
) -> Result<Json<ClassifyResp>, PipelineError> {
    let text = text_of(payload)?;
    let sentiment = state.pipeline.classify(&text).await?;
    Ok(Json(ClassifyResp { sentiment }))
}

async fn summarize(
    State(state): State<AppState>,
    payload: TextPayload,
) -> Result<Json<SummaryResult>, PipelineError> {
    let text = text_of(payload)?;
    Ok(Json(state.pipeline.summarize(&text).await?))
}
