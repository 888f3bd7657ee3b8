//! Phases and the analyzer contract: the single boundary every analysis
//! implementation must satisfy.
use crate::error::AnalyzerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

/// One step of the front-end, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lexical,
    Syntax,
    Semantic,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Lexical, Phase::Syntax, Phase::Semantic];

    /// Stable machine name (used in config files, URLs and logs).
    pub fn name(self) -> &'static str {
        match self {
            Phase::Lexical => "lexical",
            Phase::Syntax => "syntax",
            Phase::Semantic => "semantic",
        }
    }

    /// Display label used in the output log.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Lexical => "Lexical Analysis",
            Phase::Syntax => "Syntax Analysis",
            Phase::Semantic => "Semantic Analysis",
        }
    }

    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Lexical => Some(Phase::Syntax),
            Phase::Syntax => Some(Phase::Semantic),
            Phase::Semantic => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPhase(pub String);

impl fmt::Display for UnknownPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown phase '{}' (expected lexical, syntax or semantic)", self.0)
    }
}

impl std::error::Error for UnknownPhase {}

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" | "lex" => Ok(Phase::Lexical),
            "syntax" | "parse" => Ok(Phase::Syntax),
            "semantic" | "sema" => Ok(Phase::Semantic),
            _ => Err(UnknownPhase(s.to_string())),
        }
    }
}

/// Result of one analyzer invocation: free-form text or a failure.
pub type AnalysisResult = Result<String, AnalyzerError>;

/// A single phase implementation.
///
/// Implementations receive the full source text and must not depend on
/// session state. The same input may be analyzed any number of times.
pub trait Analyzer: Send + Sync {
    /// Identifier shown in logs (ex: "builtin.lexical.v1").
    fn id(&self) -> &str;

    fn analyze(&self, source: &str) -> AnalysisResult;
}

/// The invocation boundary the session talks to.
pub trait AnalyzerAdapter: Send + Sync {
    /// Runs `phase` against `source`. Always completes with a result.
    fn invoke(&self, phase: Phase, source: &str) -> AnalysisResult;
}

/// Binds one [`Analyzer`] per phase.
#[derive(Default)]
pub struct AnalyzerSet {
    bindings: HashMap<Phase, Box<dyn Analyzer>>,
}

impl AnalyzerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, phase: Phase, analyzer: Box<dyn Analyzer>) -> Self {
        self.bindings.insert(phase, analyzer);
        self
    }

    pub fn get(&self, phase: Phase) -> Option<&dyn Analyzer> {
        self.bindings.get(&phase).map(|a| a.as_ref())
    }

    pub fn is_bound(&self, phase: Phase) -> bool {
        self.bindings.contains_key(&phase)
    }

    /// `(phase, analyzer id)` pairs in phase order.
    pub fn describe(&self) -> Vec<(Phase, String)> {
        Phase::ALL
            .iter()
            .filter_map(|p| self.get(*p).map(|a| (*p, a.id().to_string())))
            .collect()
    }
}

impl AnalyzerAdapter for AnalyzerSet {
    fn invoke(&self, phase: Phase, source: &str) -> AnalysisResult {
        let analyzer = self.get(phase).ok_or(AnalyzerError::Missing(phase))?;
        tracing::debug!(phase = %phase, analyzer = analyzer.id(), "invoking analyzer");

        match panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(source))) {
            Ok(result) => result,
            Err(payload) => Err(AnalyzerError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Adapter built from a closure, handy for wiring tests and embedders.
pub struct FnAdapter<F>(pub F);

impl<F> AnalyzerAdapter for FnAdapter<F>
where
    F: Fn(Phase, &str) -> AnalysisResult + Send + Sync,
{
    fn invoke(&self, phase: Phase, source: &str) -> AnalysisResult {
        (self.0)(phase, source)
    }
}
