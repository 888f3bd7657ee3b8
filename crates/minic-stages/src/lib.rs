//! MiniC Stages: analyzer implementations bound to the pipeline phases.
//!
//! The built-in stages run the MiniC front-end; [`CommandAnalyzer`] hands a
//! phase to an external program instead. Which one serves each phase is
//! decided by [`PipelineConfig`].
//!
//! # Phase Flow
//!
//! ```text
//! Source → Lexical → Syntax → Semantic
//!             ↓         ↓         ↓
//!          Tokens      AST     Symbols
//! ```

mod command;
mod config;
mod lexical;
mod semantic;
mod syntax;

pub use command::CommandAnalyzer;
pub use config::{Binding, ConfigError, PipelineConfig, CONFIG_ENV};
pub use lexical::LexicalStage;
pub use semantic::SemanticStage;
pub use syntax::SyntaxStage;

use minic_core::{AnalyzerError, AnalyzerSet, Phase};
use std::fmt::Display;

/// Built-in analyzer for `phase`.
pub fn builtin(phase: Phase) -> Box<dyn minic_core::Analyzer> {
    match phase {
        Phase::Lexical => Box::new(LexicalStage),
        Phase::Syntax => Box::new(SyntaxStage),
        Phase::Semantic => Box::new(SemanticStage),
    }
}

/// All three phases bound to the built-in MiniC stages.
pub fn default_analyzers() -> AnalyzerSet {
    Phase::ALL
        .iter()
        .fold(AnalyzerSet::new(), |set, &phase| set.bind(phase, builtin(phase)))
}

/// Collapses front-end diagnostics into one rejection message.
pub(crate) fn rejected<E: Display>(what: &str, errors: &[E]) -> AnalyzerError {
    let mut lines = vec![format!(
        "{} analysis failed with {} error{}:",
        what,
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    )];
    lines.extend(errors.iter().map(|e| format!("  {}", e)));
    AnalyzerError::rejected(lines)
}

// ============================================================================
// TESTS
// ============================================================================
