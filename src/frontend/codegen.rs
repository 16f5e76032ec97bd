//! LLVM IR text generation.
//!
//! Every value is an `i32`. `let` bindings are immutable, so a binding simply
//! names the SSA operand of its initializer and no stack slots are needed.
//! Functions called but not defined in the file are emitted as declarations
//! and resolved when modules are linked.
//!
//! Parameters are emitted as `%p.<name>`. Ion identifiers cannot contain a
//! `.`, so they never clash with the `entry` label or the `%tN` temporaries.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use super::ast::{Expr, Function, SourceFile, Stmt};
use super::error::{FrontendError, Pos};

/// Generate a textual LLVM module for a parsed source file.
pub fn generate(
    module_name: &str,
    source_name: &str,
    file: &SourceFile,
) -> Result<String, FrontendError> {
    let mut defined: HashMap<&str, usize> = HashMap::new();
    for func in &file.functions {
        if defined.insert(&func.name, func.params.len()).is_some() {
            return Err(FrontendError::semantic(
                func.pos,
                format!("function `{}` is defined more than once", func.name),
            ));
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "; ModuleID = '{}'", module_name);
    let _ = writeln!(out, "source_filename = \"{}\"", source_name);

    let mut declared: BTreeMap<String, usize> = BTreeMap::new();
    for func in &file.functions {
        let mut gen = FunctionGen {
            defined: &defined,
            declared: &mut declared,
            scope: HashMap::new(),
            body: String::new(),
            next_temp: 0,
        };
        let text = gen.function(func)?;
        out.push('\n');
        out.push_str(&text);
    }

    if !declared.is_empty() {
        out.push('\n');
        for (name, arity) in &declared {
            let _ = writeln!(out, "declare i32 @{}({})", name, vec!["i32"; *arity].join(", "));
        }
    }

    Ok(out)
}

struct FunctionGen<'a> {
    defined: &'a HashMap<&'a str, usize>,
    declared: &'a mut BTreeMap<String, usize>,
    scope: HashMap<String, String>,
    body: String,
    next_temp: usize,
}

impl FunctionGen<'_> {
    fn function(&mut self, func: &Function) -> Result<String, FrontendError> {
        let mut params = Vec::with_capacity(func.params.len());
        for param in &func.params {
            let operand = format!("%p.{}", param.name);
            if self.scope.insert(param.name.clone(), operand.clone()).is_some() {
                return Err(FrontendError::semantic(
                    param.pos,
                    format!("parameter `{}` is declared more than once", param.name),
                ));
            }
            params.push(format!("i32 {}", operand));
        }

        let mut returned = false;
        for stmt in &func.body {
            if returned {
                return Err(FrontendError::semantic(
                    stmt.pos(),
                    "unreachable statement after `return`",
                ));
            }
            returned = self.stmt(stmt)?;
        }
        if !returned {
            self.line("ret i32 0");
        }

        Ok(format!(
            "define i32 @{}({}) {{\nentry:\n{}}}\n",
            func.name,
            params.join(", "),
            self.body
        ))
    }

    /// Emit a statement; returns whether it terminated the block.
    fn stmt(&mut self, stmt: &Stmt) -> Result<bool, FrontendError> {
        match stmt {
            Stmt::Let { name, value, .. } => {
                let operand = self.expr(value)?;
                self.scope.insert(name.clone(), operand);
                Ok(false)
            }
            Stmt::Return { value, .. } => {
                let operand = self.expr(value)?;
                self.line(&format!("ret i32 {}", operand));
                Ok(true)
            }
            Stmt::Expr(expr) => {
                self.expr(expr)?;
                Ok(false)
            }
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<String, FrontendError> {
        match expr {
            Expr::Int { value, .. } => Ok(value.to_string()),
            Expr::Var { name, pos } => self.scope.get(name).cloned().ok_or_else(|| {
                FrontendError::semantic(*pos, format!("cannot find value `{}` in this scope", name))
            }),
            Expr::Neg { operand, .. } => {
                let value = self.expr(operand)?;
                let temp = self.temp();
                self.line(&format!("{} = sub i32 0, {}", temp, value));
                Ok(temp)
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                let temp = self.temp();
                self.line(&format!("{} = {} i32 {}, {}", temp, op.instruction(), lhs, rhs));
                Ok(temp)
            }
            Expr::Call { name, args, pos } => {
                self.check_arity(name, args.len(), *pos)?;

                let mut operands = Vec::with_capacity(args.len());
                for arg in args {
                    operands.push(format!("i32 {}", self.expr(arg)?));
                }
                let temp = self.temp();
                self.line(&format!("{} = call i32 @{}({})", temp, name, operands.join(", ")));
                Ok(temp)
            }
        }
    }

    fn check_arity(&mut self, name: &str, arity: usize, pos: Pos) -> Result<(), FrontendError> {
        let expected = match self.defined.get(name) {
            Some(&expected) => expected,
            None => *self.declared.entry(name.to_string()).or_insert(arity),
        };

        if expected != arity {
            return Err(FrontendError::semantic(
                pos,
                format!(
                    "function `{}` takes {} argument(s) but {} were supplied",
                    name, expected, arity
                ),
            ));
        }
        Ok(())
    }

    fn temp(&mut self) -> String {
        let name = format!("%t{}", self.next_temp);
        self.next_temp += 1;
        name
    }

    fn line(&mut self, text: &str) {
        self.body.push_str("  ");
        self.body.push_str(text);
        self.body.push('\n');
    }
}
