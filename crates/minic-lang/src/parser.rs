//! # MiniC Parser
//!
//! Recursive descent over the token stream produced by [`crate::lexer`].
//! Semicolons are optional statement terminators. On an error the parser
//! records it, skips to the next statement boundary and keeps going, so one
//! run reports every independent syntax error.

use crate::ast::{BinaryOp, Block, Expr, ExprKind, Pos, Program, Stmt, UnaryOp};
use crate::lexer::{Token, TokenKind};
use thiserror::Error;

/// Deepest nesting accepted. Blocks, parentheses, unary operators, each
/// operator of a binary chain and each `else if` count one level, so the
/// AST never gets deeper than this.
const MAX_DEPTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

/// Parses a full token stream (as returned by [`crate::lexer::scan`]).
pub fn parse(tokens: &[Token]) -> Result<Program, Vec<ParseError>> {
    if tokens.is_empty() {
        return Ok(Program::default());
    }
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors)
    }
}

type ParseResult<T> = Result<T, ParseError>;

struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    depth: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, current: 0, depth: 0, errors: Vec::new() }
    }

    fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            self.statement_into(&mut statements);
        }
        Program { statements }
    }

    /// Parses one statement (or a stray `;`) into `out`, recovering on error.
    fn statement_into(&mut self, out: &mut Vec<Stmt>) {
        if self.match_token(&TokenKind::Semicolon) {
            return;
        }
        let depth = self.depth;
        match self.statement() {
            Ok(stmt) => out.push(stmt),
            Err(e) => {
                self.depth = depth;
                self.errors.push(e);
                self.synchronize();
            }
        }
    }

    /// Skips tokens until something that can start a statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            let next = self.peek();
            match next.kind {
                TokenKind::Let
                | TokenKind::Print
                | TokenKind::If
                | TokenKind::While
                | TokenKind::LBrace
                | TokenKind::RBrace => return,
                TokenKind::Identifier(_) if next.line > self.previous().line => return,
                _ => {}
            }
            self.advance();
        }
    }

    // --- Statements ---

    fn statement(&mut self) -> ParseResult<Stmt> {
        let token = self.peek();
        let pos = pos_of(token);
        match &token.kind {
            TokenKind::Let => {
                self.advance();
                let name = self.consume_identifier("expected variable name after 'let'")?;
                self.consume(&TokenKind::Assign, &format!("expected '=' after 'let {}'", name))?;
                let value = self.expression()?;
                self.match_token(&TokenKind::Semicolon);
                Ok(Stmt::Let { name, value, pos })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                self.consume(&TokenKind::Assign, &format!("expected '=' after '{}'", name))?;
                let value = self.expression()?;
                self.match_token(&TokenKind::Semicolon);
                Ok(Stmt::Assign { name: name.clone(), value, pos })
            }
            TokenKind::Print => {
                self.advance();
                let value = self.expression()?;
                self.match_token(&TokenKind::Semicolon);
                Ok(Stmt::Print { value, pos })
            }
            TokenKind::If => self.if_statement(),
            TokenKind::While => {
                self.advance();
                let cond = self.expression()?;
                let body = self.block()?;
                Ok(Stmt::While { cond, body, pos })
            }
            TokenKind::LBrace => Ok(Stmt::Block(self.block()?)),
            _ => Err(self.error_at(token, "expected statement")),
        }
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let pos = pos_of(self.advance());
        let cond = self.expression()?;
        let then_branch = self.block()?;
        let else_branch = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                self.enter(self.peek())?;
                let nested = self.if_statement()?;
                self.depth -= 1;
                Some(Block { pos: nested.pos(), statements: vec![nested] })
            } else {
                Some(self.block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If { cond, then_branch, else_branch, pos })
    }

    fn block(&mut self) -> ParseResult<Block> {
        let open = self.consume(&TokenKind::LBrace, "expected '{'")?;
        let pos = pos_of(open);
        self.enter(open)?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            self.statement_into(&mut statements);
        }
        self.consume(
            &TokenKind::RBrace,
            &format!("expected '}}' to close block opened at {}", pos),
        )?;

        self.depth -= 1;
        Ok(Block { statements, pos })
    }

    // --- Expressions (lowest to highest precedence) ---

    fn expression(&mut self) -> ParseResult<Expr> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::and_expr, &[(TokenKind::OrOr, BinaryOp::Or)])
    }

    fn and_expr(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::equality, &[(TokenKind::AndAnd, BinaryOp::And)])
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            Self::comparison,
            &[(TokenKind::EqEq, BinaryOp::Eq), (TokenKind::NotEq, BinaryOp::NotEq)],
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            Self::term,
            &[
                (TokenKind::Less, BinaryOp::Less),
                (TokenKind::LessEq, BinaryOp::LessEq),
                (TokenKind::Greater, BinaryOp::Greater),
                (TokenKind::GreaterEq, BinaryOp::GreaterEq),
            ],
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            Self::factor,
            &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
        )
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            Self::unary,
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Rem),
            ],
        )
    }

    /// Left-associative chain of `ops` over operands parsed by `operand`.
    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> ParseResult<Expr>,
        ops: &[(TokenKind, BinaryOp)],
    ) -> ParseResult<Expr> {
        let mut lhs = operand(self)?;
        let mut chained = 0;
        while let Some(op) = ops.iter().find(|(kind, _)| self.check(kind)).map(|(_, op)| *op) {
            let token = self.advance();
            // Each operator deepens the left-leaning tree by one.
            self.enter(token)?;
            chained += 1;
            let rhs = operand(self)?;
            lhs = Expr {
                kind: ExprKind::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                pos: pos_of(token),
            };
        }
        self.depth -= chained;
        Ok(lhs)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.primary(),
        };
        let token = self.advance();
        self.enter(token)?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr {
            kind: ExprKind::Unary { op, operand: Box::new(operand) },
            pos: pos_of(token),
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek();
        let kind = match &token.kind {
            TokenKind::Int(v) => ExprKind::Int(*v),
            TokenKind::Float(v) => ExprKind::Float(*v),
            TokenKind::Str(s) => ExprKind::Str(s.clone()),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Identifier(name) => ExprKind::Var(name.clone()),
            TokenKind::LParen => {
                self.advance();
                self.enter(token)?;
                let inner = self.expression()?;
                self.consume(&TokenKind::RParen, "expected ')' after expression")?;
                self.depth -= 1;
                return Ok(inner);
            }
            _ => return Err(self.error_at(token, "expected expression")),
        };
        self.advance();
        Ok(Expr { kind, pos: pos_of(token) })
    }

    // --- Token helpers ---

    fn enter(&mut self, token: &Token) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error_at(token, "nesting too deep"));
        }
        Ok(())
    }

    fn peek(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        &tokens[self.current.min(tokens.len() - 1)]
    }

    fn previous(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        &tokens[self.current.saturating_sub(1).min(tokens.len() - 1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfFile
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: &TokenKind, message: &str) -> ParseResult<&'a Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at(self.peek(), message))
        }
    }

    fn consume_identifier(&mut self, message: &str) -> ParseResult<String> {
        let token = self.peek();
        if let TokenKind::Identifier(name) = &token.kind {
            self.advance();
            Ok(name.clone())
        } else {
            Err(self.error_at(token, message))
        }
    }

    fn error_at(&self, token: &Token, message: &str) -> ParseError {
        let found = if token.kind == TokenKind::EndOfFile {
            "end of input".to_string()
        } else {
            format!("'{}'", token.lexeme)
        };
        ParseError {
            message: format!("{}, found {}", message, found),
            line: token.line,
            col: token.col,
        }
    }
}

fn pos_of(token: &Token) -> Pos {
    Pos { line: token.line, col: token.col }
}
