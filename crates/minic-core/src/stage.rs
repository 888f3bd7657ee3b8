//! Pipeline stages: how far the current source has progressed.
use crate::phase::Phase;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No analysis has succeeded for the current source.
    #[default]
    Idle,
    LexicalDone,
    SyntaxDone,
    /// Terminal: nothing is runnable until the source changes or is reset.
    SemanticDone,
}

impl Stage {
    /// The phase this stage unlocks, ignoring whether the source is blank.
    pub fn unlocks(self) -> Option<Phase> {
        match self {
            Stage::Idle => Some(Phase::Lexical),
            Stage::LexicalDone => Some(Phase::Syntax),
            Stage::SyntaxDone => Some(Phase::Semantic),
            Stage::SemanticDone => None,
        }
    }

    /// Stage reached after `phase` succeeds.
    pub fn after(phase: Phase) -> Stage {
        match phase {
            Phase::Lexical => Stage::LexicalDone,
            Phase::Syntax => Stage::SyntaxDone,
            Phase::Semantic => Stage::SemanticDone,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::SemanticDone
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::LexicalDone => "lexical-done",
            Stage::SyntaxDone => "syntax-done",
            Stage::SemanticDone => "semantic-done",
        };
        f.write_str(s)
    }
}
