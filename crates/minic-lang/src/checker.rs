//! # MiniC Semantic Checker
//!
//! Walks the AST with a scoped symbol table, infers a static type for every
//! expression and reports misuse. Blocks open a new scope; assigning to an
//! unknown name declares it in the current scope.
//!
//! Errors fail the analysis. Variables that are never read only produce
//! warnings.

use crate::ast::{BinaryOp, Block, Expr, ExprKind, Pos, Program, Stmt, UnaryOp};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Str,
    Bool,
}

impl Type {
    fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Str => "string",
            Type::Bool => "bool",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub pos: Pos,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pos, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    /// `None` when the initializer itself was ill-typed.
    pub ty: Option<Type>,
    pub depth: usize,
    pub declared_at: Pos,
    pub reads: usize,
    pub writes: usize,
}

/// Successful result of [`check`].
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub symbols: Vec<Symbol>,
    pub warnings: Vec<Diagnostic>,
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Symbol table:")?;
        if self.symbols.is_empty() {
            writeln!(f, "  (no symbols)")?;
        } else {
            writeln!(
                f,
                "  {:<16} {:<8} {:<6} {:<10} {:<6} {}",
                "NAME", "TYPE", "SCOPE", "DECLARED", "READS", "WRITES"
            )?;
            for sym in &self.symbols {
                let ty = sym.ty.map_or_else(|| "?".to_string(), |t| t.to_string());
                writeln!(
                    f,
                    "  {:<16} {:<8} {:<6} {:<10} {:<6} {}",
                    sym.name,
                    ty,
                    sym.depth,
                    sym.declared_at.to_string(),
                    sym.reads,
                    sym.writes
                )?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for w in &self.warnings {
                writeln!(f, "  warning: {}", w)?;
            }
        }
        write!(
            f,
            "Semantic analysis passed: {} symbol{}, {} warning{}.",
            self.symbols.len(),
            if self.symbols.len() == 1 { "" } else { "s" },
            self.warnings.len(),
            if self.warnings.len() == 1 { "" } else { "s" }
        )
    }
}

/// Checks `program`, returning the symbol table or every error found.
pub fn check(program: &Program) -> Result<Analysis, Vec<Diagnostic>> {
    let mut checker = Checker::new();
    checker.push_scope();
    for stmt in &program.statements {
        checker.stmt(stmt);
    }
    checker.pop_scope();

    if checker.errors.is_empty() {
        Ok(Analysis { symbols: checker.symbols, warnings: checker.warnings })
    } else {
        Err(checker.errors)
    }
}

struct Checker {
    /// Each scope maps a name to its index in `symbols`.
    scopes: Vec<HashMap<String, usize>>,
    symbols: Vec<Symbol>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl Checker {
    fn new() -> Self {
        Checker { scopes: Vec::new(), symbols: Vec::new(), errors: Vec::new(), warnings: Vec::new() }
    }

    // --- Scopes ---

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        let mut unused: Vec<&Symbol> = scope
            .values()
            .map(|&idx| &self.symbols[idx])
            .filter(|sym| sym.reads == 0)
            .collect();
        unused.sort_by_key(|sym| (sym.declared_at.line, sym.declared_at.col));
        for sym in unused {
            self.warnings.push(Diagnostic {
                message: format!("variable '{}' is never read", sym.name),
                pos: sym.declared_at,
            });
        }
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).copied())
    }

    fn declare(&mut self, name: &str, ty: Option<Type>, pos: Pos) {
        let depth = self.scopes.len().saturating_sub(1);
        let idx = self.symbols.len();
        self.symbols.push(Symbol {
            name: name.to_string(),
            ty,
            depth,
            declared_at: pos,
            reads: 0,
            writes: 1,
        });
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), idx);
        }
    }

    fn error(&mut self, pos: Pos, message: String) {
        self.errors.push(Diagnostic { message, pos });
    }

    // --- Statements ---

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { name, value, pos } => {
                let ty = self.expr(value);
                let existing = self.scopes.last().and_then(|scope| scope.get(name).copied());
                if let Some(idx) = existing {
                    let first = self.symbols[idx].declared_at;
                    self.error(
                        *pos,
                        format!("variable '{}' is already declared in this scope (at {})", name, first),
                    );
                } else {
                    self.declare(name, ty, *pos);
                }
            }
            Stmt::Assign { name, value, pos } => {
                let value_ty = self.expr(value);
                match self.lookup(name) {
                    Some(idx) => {
                        self.symbols[idx].writes += 1;
                        if let (Some(var_ty), Some(value_ty)) = (self.symbols[idx].ty, value_ty) {
                            let widening = var_ty == Type::Float && value_ty == Type::Int;
                            if var_ty != value_ty && !widening {
                                self.error(
                                    *pos,
                                    format!(
                                        "cannot assign {} to variable '{}' of type {}",
                                        value_ty, name, var_ty
                                    ),
                                );
                            }
                        }
                    }
                    None => self.declare(name, value_ty, *pos),
                }
            }
            Stmt::Print { value, .. } => {
                self.expr(value);
            }
            Stmt::If { cond, then_branch, else_branch, .. } => {
                self.condition(cond, "if");
                self.block(then_branch);
                if let Some(else_block) = else_branch {
                    self.block(else_block);
                }
            }
            Stmt::While { cond, body, .. } => {
                self.condition(cond, "while");
                self.block(body);
            }
            Stmt::Block(block) => self.block(block),
        }
    }

    fn block(&mut self, block: &Block) {
        self.push_scope();
        for stmt in &block.statements {
            self.stmt(stmt);
        }
        self.pop_scope();
    }

    fn condition(&mut self, cond: &Expr, keyword: &str) {
        if let Some(ty) = self.expr(cond) {
            if ty != Type::Bool {
                self.error(cond.pos, format!("'{}' condition must be bool, found {}", keyword, ty));
            }
        }
    }

    // --- Expressions ---

    /// Type of `expr`, or `None` if an error was already reported inside it.
    fn expr(&mut self, expr: &Expr) -> Option<Type> {
        match &expr.kind {
            ExprKind::Int(_) => Some(Type::Int),
            ExprKind::Float(_) => Some(Type::Float),
            ExprKind::Str(_) => Some(Type::Str),
            ExprKind::Bool(_) => Some(Type::Bool),
            ExprKind::Var(name) => match self.lookup(name) {
                Some(idx) => {
                    self.symbols[idx].reads += 1;
                    self.symbols[idx].ty
                }
                None => {
                    self.error(expr.pos, format!("undefined variable '{}'", name));
                    None
                }
            },
            ExprKind::Unary { op, operand } => {
                let ty = self.expr(operand)?;
                match (op, ty) {
                    (UnaryOp::Neg, t) if t.is_numeric() => Some(t),
                    (UnaryOp::Not, Type::Bool) => Some(Type::Bool),
                    _ => {
                        self.error(
                            expr.pos,
                            format!("operator '{}' cannot be applied to {}", op.symbol(), ty),
                        );
                        None
                    }
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lt = self.expr(lhs);
                let rt = self.expr(rhs);
                if matches!(op, BinaryOp::Div | BinaryOp::Rem) && is_literal_zero(rhs) {
                    self.error(rhs.pos, "division by zero".to_string());
                    return None;
                }
                let (lt, rt) = (lt?, rt?);
                match binary_type(*op, lt, rt) {
                    Some(t) => Some(t),
                    None => {
                        self.error(
                            expr.pos,
                            format!("operator '{}' cannot be applied to {} and {}", op.symbol(), lt, rt),
                        );
                        None
                    }
                }
            }
        }
    }
}

fn binary_type(op: BinaryOp, lt: Type, rt: Type) -> Option<Type> {
    use Type::*;
    match op {
        BinaryOp::Add if lt == Str && rt == Str => Some(Str),
        _ if op.is_arithmetic() => match (lt, rt) {
            (Int, Int) => Some(Int),
            (l, r) if l.is_numeric() && r.is_numeric() => Some(Float),
            _ => None,
        },
        _ if op.is_ordering() => (lt.is_numeric() && rt.is_numeric()).then_some(Bool),
        BinaryOp::Eq | BinaryOp::NotEq => {
            (lt == rt || (lt.is_numeric() && rt.is_numeric())).then_some(Bool)
        }
        BinaryOp::And | BinaryOp::Or => (lt == Bool && rt == Bool).then_some(Bool),
        _ => None,
    }
}

fn is_literal_zero(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Int(0) => true,
        ExprKind::Float(v) => *v == 0.0,
        _ => false,
    }
}
