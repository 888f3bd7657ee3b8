use minic_core::{AnalysisResult, Analyzer};
use minic_lang::{parse, render_ast, scan};

use crate::rejected;

/// Parses the source and reports the AST.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntaxStage;

impl Analyzer for SyntaxStage {
    fn id(&self) -> &str {
        "builtin.syntax.v1"
    }

    fn analyze(&self, source: &str) -> AnalysisResult {
        let tokens = scan(source).map_err(|errors| rejected("Lexical", &errors))?;
        let program = parse(&tokens).map_err(|errors| rejected("Syntax", &errors))?;
        Ok(format!(
            "{}\nParse succeeded: {} top-level statement{}.",
            render_ast(&program),
            program.statements.len(),
            if program.statements.len() == 1 { "" } else { "s" }
        ))
    }
}
