//! API error type and its HTTP mapping.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use minic_core::PipelineError;
use minic_out::RenderError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("session limit of {0} reached; close a session first")]
    SessionLimit(usize),

    #[error(transparent)]
    UnknownPhase(#[from] minic_core::UnknownPhase),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            ApiError::SessionLimit(_) => (StatusCode::SERVICE_UNAVAILABLE, "session_limit_reached"),
            ApiError::UnknownPhase(_) => (StatusCode::NOT_FOUND, "phase_not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Pipeline(PipelineError::InvalidStageTransition { .. }) => {
                (StatusCode::CONFLICT, "invalid_stage_transition")
            }
            ApiError::Pipeline(PipelineError::SourceUnreadable { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "source_unreadable")
            }
            ApiError::Render(RenderError::UnknownTemplate(_)) => (StatusCode::BAD_REQUEST, "unknown_template"),
            ApiError::Render(_) | ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": code, "message": self.to_string() }))).into_response()
    }
}
