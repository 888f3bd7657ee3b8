use minic_core::{AnalysisResult, Analyzer};
use minic_lang::{scan, TokenTable};

use crate::rejected;

/// Tokenizes the source and reports the token table.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalStage;

impl Analyzer for LexicalStage {
    fn id(&self) -> &str {
        "builtin.lexical.v1"
    }

    fn analyze(&self, source: &str) -> AnalysisResult {
        let tokens = scan(source).map_err(|errors| rejected("Lexical", &errors))?;
        Ok(TokenTable(&tokens).to_string())
    }
}
