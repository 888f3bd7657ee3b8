//! Stage Controller: enforces the linear lexical → syntax → semantic gating.
//!
//! ```text
//!  load/edit/reset ──▶ Idle ──lex ok──▶ LexicalDone ──syn ok──▶ SyntaxDone ──sem ok──▶ SemanticDone
//!                       ▲                   │                      │                      │
//!                       └──── any failure ──┴──────────────────────┘                      │
//!                       └──────────────────────── load/edit/reset ───────────────────────┘
//! ```
use crate::error::PipelineError;
use crate::phase::Phase;
use crate::stage::Stage;

#[derive(Debug, Clone, Default)]
pub struct StageController {
    stage: Stage,
    /// Whether the current source is non-blank; gates the lexical phase.
    source_ready: bool,
}

impl StageController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The single phase that may run now, if any.
    pub fn runnable(&self) -> Option<Phase> {
        match self.stage.unlocks() {
            Some(Phase::Lexical) if !self.source_ready => None,
            other => other,
        }
    }

    pub fn is_runnable(&self, phase: Phase) -> bool {
        self.runnable() == Some(phase)
    }

    /// Handles `load(text)` and `edit(text)`: always back to `Idle`.
    pub fn source_changed(&mut self, text: &str) {
        self.stage = Stage::Idle;
        self.source_ready = !text.trim().is_empty();
    }

    pub fn reset(&mut self) {
        self.stage = Stage::Idle;
        self.source_ready = false;
    }

    /// Rejects `phase` unless it is the runnable one. Never changes state.
    pub fn check(&self, phase: Phase) -> Result<(), PipelineError> {
        if self.is_runnable(phase) {
            Ok(())
        } else {
            Err(PipelineError::InvalidStageTransition {
                phase,
                stage: self.stage,
            })
        }
    }

    /// Applies the outcome of a checked invocation of `phase`.
    pub fn complete(&mut self, phase: Phase, succeeded: bool) -> Stage {
        self.stage = if succeeded { Stage::after(phase) } else { Stage::Idle };
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> StageController {
        let mut c = StageController::new();
        c.source_changed("x = 1");
        c
    }

    #[test]
    fn test_blank_source_is_not_runnable() {
        let mut c = StageController::new();
        assert_eq!(c.runnable(), None);
        c.source_changed("   \n\t");
        assert_eq!(c.runnable(), None);
        assert!(c.check(Phase::Lexical).is_err());
    }

    #[test]
    fn test_success_advances_one_phase() {
        let mut c = ready();
        assert_eq!(c.runnable(), Some(Phase::Lexical));
        assert_eq!(c.complete(Phase::Lexical, true), Stage::LexicalDone);
        assert_eq!(c.runnable(), Some(Phase::Syntax));
        assert_eq!(c.complete(Phase::Syntax, true), Stage::SyntaxDone);
        assert_eq!(c.runnable(), Some(Phase::Semantic));
        assert_eq!(c.complete(Phase::Semantic, true), Stage::SemanticDone);
        assert_eq!(c.runnable(), None);
    }

    #[test]
    fn test_failure_reverts_to_idle() {
        let mut c = ready();
        c.complete(Phase::Lexical, true);
        assert_eq!(c.complete(Phase::Syntax, false), Stage::Idle);
        assert_eq!(c.runnable(), Some(Phase::Lexical));
    }

    #[test]
    fn test_check_rejects_out_of_order() {
        let c = ready();
        match c.check(Phase::Semantic) {
            Err(PipelineError::InvalidStageTransition { phase, stage }) => {
                assert_eq!(phase, Phase::Semantic);
                assert_eq!(stage, Stage::Idle);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
