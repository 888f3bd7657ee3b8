//! Unified Error Model
use crate::phase::Phase;
use crate::stage::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by a session to its caller.
///
/// Analyzer failures never show up here: they are recorded in the output
/// log and the pipeline falls back to [`Stage::Idle`].
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("STAGE/TRANSITION: {phase} analysis is not runnable while the pipeline is {stage}")]
    InvalidStageTransition { phase: Phase, stage: Stage },

    #[error("SOURCE/READ: cannot read {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single analyzer invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("no analyzer bound for {0} analysis")]
    Missing(Phase),

    /// The analyzer ran and rejected the source (diagnostics in the message).
    #[error("{0}")]
    Rejected(String),

    #[error("analyzer execution failed: {0}")]
    Execution(String),

    #[error("analyzer panicked: {0}")]
    Panicked(String),
}

impl AnalyzerError {
    pub fn rejected(messages: impl IntoIterator<Item = impl ToString>) -> Self {
        let joined = messages
            .into_iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::Rejected(joined)
    }
}
