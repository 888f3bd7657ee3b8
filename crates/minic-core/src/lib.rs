//! MiniC Core: Session, Stage Controller and Output Log
//!
//! Phase-gated front-end pipeline (lexical → syntax → semantic). Analyzers
//! are external collaborators reached through [`AnalyzerAdapter`].

pub mod phase;
pub mod stage;
pub mod controller;
pub mod data_model;
pub mod error;
pub mod log;
pub mod session;

pub use phase::{AnalysisResult, Analyzer, AnalyzerAdapter, AnalyzerSet, FnAdapter, Phase, UnknownPhase};
pub use stage::Stage;
pub use controller::StageController;
pub use data_model::{AnalysisOutcome, LogEntry, SessionSnapshot, NO_OUTPUT};
pub use error::{AnalyzerError, PipelineError};
pub use log::OutputLog;
pub use session::{Event, Session};

/// MiniC pipeline version
pub const MINIC_VERSION: &str = "1.0.0";
