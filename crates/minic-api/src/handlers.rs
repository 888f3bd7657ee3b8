//! API Handlers
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use minic_core::{LogEntry, Phase, PipelineError, SessionSnapshot, Stage, MINIC_VERSION};
use minic_out::TranscriptFormat;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

type Shared = State<Arc<AppState>>;

#[derive(Debug, Deserialize)]
pub struct SourceBody {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub entry: LogEntry,
    pub stage: Stage,
    pub runnable: Option<Phase>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptQuery {
    pub format: Option<String>,
}

pub async fn create_session(State(state): Shared) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
    let (id, handle) = state.open().await.inspect_err(|e| tracing::warn!(error = %e, "session refused"))?;
    tracing::info!(session = %id, "session created");
    let snapshot = handle.lock().await.snapshot();
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get_session(State(state): Shared, Path(id): Path<Uuid>) -> Result<Json<SessionSnapshot>, ApiError> {
    let handle = state.get(id).await?;
    let snapshot = handle.lock().await.snapshot();
    Ok(Json(snapshot))
}

pub async fn delete_session(State(state): Shared, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state.close(id).await?;
    tracing::info!(session = %id, "session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// Load: replace the source text.
pub async fn put_source(
    State(state): Shared,
    Path(id): Path<Uuid>,
    Json(body): Json<SourceBody>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let handle = state.get(id).await?;
    let mut session = handle.lock().await;
    session.load(body.text);
    Ok(Json(session.snapshot()))
}

/// Edit: the user changed the source text.
pub async fn patch_source(
    State(state): Shared,
    Path(id): Path<Uuid>,
    Json(body): Json<SourceBody>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let handle = state.get(id).await?;
    let mut session = handle.lock().await;
    session.edit(body.text);
    Ok(Json(session.snapshot()))
}

pub async fn run_phase(
    State(state): Shared,
    Path((id, phase)): Path<(Uuid, String)>,
) -> Result<Json<RunResponse>, ApiError> {
    let phase: Phase = phase.parse()?;
    let handle = state.get(id).await?;

    // Analyzers may shell out, so the run happens off the async workers.
    let result = tokio::task::spawn_blocking(move || {
        let mut session = handle.blocking_lock();
        session
            .run(phase)
            .map(|entry| RunResponse { entry, stage: session.stage(), runnable: session.runnable() })
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    match result {
        Ok(response) => {
            let outcome = if response.entry.outcome.is_success() { "success" } else { "failure" };
            state.metrics.phase_invoked(phase.name(), outcome);
            Ok(Json(response))
        }
        Err(err @ PipelineError::InvalidStageTransition { .. }) => {
            state.metrics.phase_invoked(phase.name(), "rejected");
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn reset_session(State(state): Shared, Path(id): Path<Uuid>) -> Result<Json<SessionSnapshot>, ApiError> {
    let handle = state.get(id).await?;
    let mut session = handle.lock().await;
    session.reset();
    Ok(Json(session.snapshot()))
}

pub async fn transcript(
    State(state): Shared,
    Path(id): Path<Uuid>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Response, ApiError> {
    let format = match query.format.as_deref() {
        None => TranscriptFormat::Plain,
        Some(raw) => raw.parse().map_err(ApiError::BadRequest)?,
    };
    let snapshot = state.get(id).await?.lock().await.snapshot();
    let body = state.transcripts.render(&snapshot, format)?;
    let content_type = match format {
        TranscriptFormat::Plain => "text/plain; charset=utf-8",
        TranscriptFormat::Markdown => "text/markdown; charset=utf-8",
        TranscriptFormat::Json => "application/json",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

pub async fn health(State(state): Shared) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": MINIC_VERSION, "sessions": state.len().await })),
    )
}

pub async fn metrics(State(state): Shared) -> Result<Response, ApiError> {
    let body = state.metrics.encode().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}
