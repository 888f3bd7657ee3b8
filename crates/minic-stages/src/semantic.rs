use minic_core::{AnalysisResult, Analyzer};
use minic_lang::{check, parse, scan};

use crate::rejected;

/// Type-checks the source and reports the symbol table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SemanticStage;

impl Analyzer for SemanticStage {
    fn id(&self) -> &str {
        "builtin.semantic.v1"
    }

    fn analyze(&self, source: &str) -> AnalysisResult {
        let tokens = scan(source).map_err(|errors| rejected("Lexical", &errors))?;
        let program = parse(&tokens).map_err(|errors| rejected("Syntax", &errors))?;
        let analysis = check(&program).map_err(|errors| rejected("Semantic", &errors))?;
        Ok(analysis.to_string())
    }
}
