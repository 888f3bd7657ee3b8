//! Data Model: AnalysisOutcome, LogEntry, SessionSnapshot
use crate::error::AnalyzerError;
use crate::phase::Phase;
use crate::stage::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder printed when an analyzer succeeds with a blank payload.
pub const NO_OUTPUT: &str = "No output";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    Success { text: String },
    Failure { message: String },
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success { .. })
    }

    /// Payload on success, error message on failure.
    pub fn text(&self) -> &str {
        match self {
            AnalysisOutcome::Success { text } => text,
            AnalysisOutcome::Failure { message } => message,
        }
    }
}

impl From<Result<String, AnalyzerError>> for AnalysisOutcome {
    fn from(result: Result<String, AnalyzerError>) -> Self {
        match result {
            Ok(text) => AnalysisOutcome::Success { text },
            Err(e) => AnalysisOutcome::Failure {
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the log, starting at 1.
    pub seq: usize,
    pub phase: Phase,
    pub outcome: AnalysisOutcome,
    /// `blake3:<hex>` of the source the phase ran against.
    pub source_hash: String,
    pub latency_ms: u64,
    pub at: DateTime<Utc>,
}

impl LogEntry {
    /// The labeled block this entry contributes to the transcript.
    pub fn render(&self) -> String {
        match &self.outcome {
            AnalysisOutcome::Success { text } => {
                let body = if text.trim().is_empty() { NO_OUTPUT } else { text.trim_end() };
                format!("=== {} ===\n{}\n\n", self.phase.label(), body)
            }
            AnalysisOutcome::Failure { message } => {
                format!("ERROR in {}:\n{}\n\n", self.phase.label(), message.trim_end())
            }
        }
    }
}

/// Read-only view of a session for presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub stage: Stage,
    /// The phase that may run next, if any.
    pub runnable: Option<Phase>,
    pub source: String,
    pub entries: Vec<LogEntry>,
    pub transcript: String,
    pub created_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| !e.outcome.is_success()).count()
    }
}
