//! Syntax tree for the Ion subset the reference front-end understands.

use super::error::Pos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Let { name: String, value: Expr, pos: Pos },
    Return { value: Expr, pos: Pos },
    Expr(Expr),
}

impl Stmt {
    pub fn pos(&self) -> Pos {
        match self {
            Stmt::Let { pos, .. } | Stmt::Return { pos, .. } => *pos,
            Stmt::Expr(expr) => expr.pos(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// LLVM instruction mnemonic.
    pub fn instruction(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "sdiv",
            BinaryOp::Rem => "srem",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int { value: i64, pos: Pos },
    Var { name: String, pos: Pos },
    Neg { operand: Box<Expr>, pos: Pos },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        pos: Pos,
    },
    Call { name: String, args: Vec<Expr>, pos: Pos },
}

impl Expr {
    pub fn pos(&self) -> Pos {
        match self {
            Expr::Int { pos, .. }
            | Expr::Var { pos, .. }
            | Expr::Neg { pos, .. }
            | Expr::Binary { pos, .. }
            | Expr::Call { pos, .. } => *pos,
        }
    }
}
