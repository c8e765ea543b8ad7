//! HTTP surface for briefly.
//!
//! One axum router exposes every handler style:
//!
//! - `POST /summarize` – Backed by the sync handler (run the pipeline inline,
//!   answer with the summary) or the deferred handler (hand the work to the
//!   job tracker, answer with a task id), selected by [`SummarizeMode`].
//! - `GET /status/{task_id}` – Current status of a deferred job, or the
//!   `Not Found` sentinel for unknown ids.
//! - `GET /ws` – WebSocket pushing one summary (or error) per inbound request.
//! - `GET /metrics` – Summarization counters.
//!
//! Every handler converts pipeline failures into its protocol's error shape;
//! nothing propagates far enough to crash the serving process.

mod ws;

use crate::config::SummarizeMode;
use crate::jobs::JobTracker;
use crate::metrics::MetricsSnapshot;
use crate::pipeline::{PipelineError, SummaryApi};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Shared state handed to every handler.
pub struct AppState<S> {
    /// Pipeline facade shared across handler styles.
    pub service: Arc<S>,
    /// Registry backing the deferred handlers.
    pub tracker: Arc<JobTracker>,
}

/// Build the router exposing the summarization API surface.
pub fn create_router<S>(
    service: Arc<S>,
    tracker: Arc<JobTracker>,
    mode: SummarizeMode,
    allowed_origin: Option<&str>,
) -> Router
where
    S: SummaryApi + 'static,
{
    let state = Arc::new(AppState { service, tracker });
    let summarize = match mode {
        SummarizeMode::Sync => post(summarize_sync::<S>),
        SummarizeMode::Deferred => post(summarize_deferred::<S>),
    };

    Router::new()
        .route("/summarize", summarize)
        .route("/status/:task_id", get(job_status::<S>))
        .route("/ws", get(ws::websocket_handler::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .layer(cors_layer(allowed_origin))
        .with_state(state)
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match allowed_origin {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(error) => {
                tracing::warn!(%error, origin, "Invalid FRONTEND_URL; allowing any origin");
                layer.allow_origin(Any)
            }
        },
        None => layer.allow_origin(Any),
    }
}

/// Request body for `POST /summarize`.
#[derive(Deserialize)]
struct SummarizeRequest {
    /// URL of a PDF or CSV document to download and summarize.
    #[serde(default)]
    url: Option<String>,
    /// Raw text to summarize in a single shot (sync handler only).
    #[serde(default)]
    text: Option<String>,
}

/// Success response for the sync handler.
#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
    /// Present only on the raw-text path.
    #[serde(skip_serializing_if = "Option::is_none")]
    was_truncated: Option<bool>,
}

/// Run the full pipeline inline and answer with the summary.
///
/// A `text` body takes the single-shot path and reports whether the input was
/// truncated to the token budget; a `url` body takes the download-and-stitch
/// path.
async fn summarize_sync<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummaryResponse>, AppError>
where
    S: SummaryApi,
{
    if let Some(text) = request.text {
        let outcome = state.service.summarize_text(&text).await?;
        tracing::info!(
            was_truncated = outcome.was_truncated,
            "Single-shot summarize completed"
        );
        return Ok(Json(SummaryResponse {
            summary: outcome.summary,
            was_truncated: Some(outcome.was_truncated),
        }));
    }

    let url = request.url.ok_or(PipelineError::MissingReference)?;
    let summary = state.service.summarize_url(&url).await?;
    tracing::info!(url, "Summarize request completed");
    Ok(Json(SummaryResponse {
        summary,
        was_truncated: None,
    }))
}

/// Response for the deferred handler: the job was accepted, poll for status.
#[derive(Serialize)]
struct TaskAccepted {
    task_id: String,
}

/// Register the work with the job tracker and answer immediately.
async fn summarize_deferred<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<TaskAccepted>, AppError>
where
    S: SummaryApi + 'static,
{
    let url = request.url.ok_or(PipelineError::MissingReference)?;
    let service = Arc::clone(&state.service);
    let id = state
        .tracker
        .submit(async move { service.summarize_url(&url).await });
    Ok(Json(TaskAccepted {
        task_id: id.to_string(),
    }))
}

/// Response body for `GET /status/{task_id}`.
#[derive(Serialize)]
struct JobStatusResponse {
    task_id: String,
    status: String,
}

/// Report a job's current status.
///
/// Unknown and unparsable ids get the `Not Found` sentinel rather than a
/// transport error.
async fn job_status<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(task_id): Path<String>,
) -> Json<JobStatusResponse>
where
    S: SummaryApi,
{
    let status = Uuid::parse_str(&task_id)
        .ok()
        .and_then(|id| state.tracker.status(&id))
        .map(|status| status.to_string())
        .unwrap_or_else(|| "Not Found".to_string());
    Json(JobStatusResponse { task_id, status })
}

/// Return a concise snapshot of summarization counters.
async fn get_metrics<S>(State(state): State<Arc<AppState<S>>>) -> Json<MetricsSnapshot>
where
    S: SummaryApi,
{
    Json(state.service.metrics_snapshot())
}

/// Maps pipeline failures onto the `{"detail": ...}` error body.
struct AppError(PipelineError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        tracing::error!(error = %self.0, "Request failed");
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self(inner)
    }
}
