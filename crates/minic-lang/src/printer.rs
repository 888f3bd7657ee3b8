//! Indented, human-readable rendering of the AST.

use crate::ast::{BinaryOp, Block, Expr, ExprKind, Program, Stmt};
use std::fmt::Write;

/// Indent guides drawn before a line; deeper lines show their level instead.
const MAX_GUIDES: usize = 32;

/// Renders `program` as an indented tree, one node per line.
pub fn render_ast(program: &Program) -> String {
    let mut printer = AstPrinter { indent: 0, out: String::new() };
    printer.program(program);
    printer.out.truncate(printer.out.trim_end().len());
    printer.out
}

struct AstPrinter {
    indent: usize,
    out: String,
}

impl AstPrinter {
    fn line(&mut self, text: &str) {
        let guides = "| ".repeat(self.indent.min(MAX_GUIDES));
        if self.indent > MAX_GUIDES {
            let _ = writeln!(self.out, "{}[{}] {}", guides, self.indent, text);
        } else {
            let _ = writeln!(self.out, "{}{}", guides, text);
        }
    }

    fn indented<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn program(&mut self, program: &Program) {
        let count = program.statements.len();
        self.line(&format!("Program ({} statement{})", count, if count == 1 { "" } else { "s" }));
        self.indented(|p| {
            for stmt in &program.statements {
                p.stmt(stmt);
            }
        });
    }

    fn block(&mut self, label: &str, block: &Block) {
        self.line(label);
        self.indented(|p| {
            for stmt in &block.statements {
                p.stmt(stmt);
            }
        });
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { name, value, pos } => {
                self.line(&format!("Let {} @{}", name, pos));
                self.indented(|p| p.expr(value));
            }
            Stmt::Assign { name, value, pos } => {
                self.line(&format!("Assign {} @{}", name, pos));
                self.indented(|p| p.expr(value));
            }
            Stmt::Print { value, pos } => {
                self.line(&format!("Print @{}", pos));
                self.indented(|p| p.expr(value));
            }
            Stmt::If { cond, then_branch, else_branch, pos } => {
                self.line(&format!("If @{}", pos));
                self.indented(|p| {
                    p.line("Condition");
                    p.indented(|p2| p2.expr(cond));
                    p.block("Then", then_branch);
                    if let Some(else_block) = else_branch {
                        p.block("Else", else_block);
                    }
                });
            }
            Stmt::While { cond, body, pos } => {
                self.line(&format!("While @{}", pos));
                self.indented(|p| {
                    p.line("Condition");
                    p.indented(|p2| p2.expr(cond));
                    p.block("Body", body);
                });
            }
            Stmt::Block(block) => self.block(&format!("Block @{}", block.pos), block),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Int(v) => self.line(&format!("Int {}", v)),
            ExprKind::Float(v) => self.line(&format!("Float {:?}", v)),
            ExprKind::Str(s) => self.line(&format!("String {:?}", s)),
            ExprKind::Bool(b) => self.line(&format!("Bool {}", b)),
            ExprKind::Var(name) => self.line(&format!("Var {}", name)),
            ExprKind::Unary { op, operand } => {
                self.line(&format!("Unary {}", op.symbol()));
                self.indented(|p| p.expr(operand));
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let operands = chain_operands(*op, lhs, rhs);
                if operands.len() == 2 {
                    self.line(&format!("Binary {}", op.symbol()));
                } else {
                    self.line(&format!("Binary {} ({} operands)", op.symbol(), operands.len()));
                }
                self.indented(|p| {
                    for operand in operands {
                        p.expr(operand);
                    }
                });
            }
        }
    }
}

/// Operands of a left-nested run of the same operator, in source order, so
/// `a + b + c` prints as one node with three children.
fn chain_operands<'a>(op: BinaryOp, lhs: &'a Expr, rhs: &'a Expr) -> Vec<&'a Expr> {
    let mut operands = vec![rhs];
    let mut left = lhs;
    while let ExprKind::Binary { op: inner, lhs, rhs } = &left.kind {
        if *inner != op {
            break;
        }
        operands.push(rhs);
        left = lhs;
    }
    operands.push(left);
    operands.reverse();
    operands
}
