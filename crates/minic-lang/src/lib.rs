//! MiniC language front-end: lexer, parser, AST printer and semantic checker.
//!
//! Each phase is usable on its own; the built-in analyzer stages chain them
//! so that every phase re-derives what it needs from the raw source text.
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod checker;

pub use ast::{Block, Expr, ExprKind, Pos, Program, Stmt};
pub use checker::{check, Analysis, Diagnostic, Symbol, Type};
pub use lexer::{scan, LexError, Token, TokenKind, TokenTable};
pub use parser::{parse, ParseError};
pub use printer::render_ast;
