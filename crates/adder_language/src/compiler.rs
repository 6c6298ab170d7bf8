//! Compilation entry point.
//!
//! [`compile`] parses source text and checks the statement-placement rules
//! the grammar alone cannot express, producing a [`Code`] unit that an
//! interpreter [`Context`](crate::Context) can run.

use std::rc::Rc;

use crate::ast::{Stmt, StmtKind};
use crate::error::SyntaxError;
use crate::parser::Parser;

/// How source text is compiled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompileMode {
    /// A single interactive statement.
    Single,
    /// A sequence of statements (a module or an `exec` string).
    Exec,
}

/// A compiled unit of code.
#[derive(Clone, Debug)]
pub struct Code {
    /// Program identifier the code was compiled under.
    pub filename: String,
    /// The mode it was compiled in.
    pub mode: CompileMode,
    /// Whether expression statements echo their values.
    pub interactive: bool,
    /// The top-level statements.
    pub body: Rc<[Stmt]>,
}

/// Compiles `source` into runnable code.
///
/// `interactive` makes top-level expression statements echo their value, the
/// way a prompt does.
///
/// # Errors
///
/// Returns a [`SyntaxError`] if the source does not parse or places
/// `return`, `break` or `continue` where they cannot appear.
pub fn compile(
    source: &str,
    filename: &str,
    mode: CompileMode,
    interactive: bool,
) -> Result<Code, SyntaxError> {
    let mut parser = Parser::new(source, filename);
    let body = match mode {
        CompileMode::Single => parser.parse_single()?,
        CompileMode::Exec => parser.parse_module()?,
    };

    let checker = Placement { source, filename };
    checker.check_block(&body, false, false)?;

    tracing::trace!(filename, ?mode, statements = body.len(), "compiled");
    Ok(Code {
        filename: filename.to_string(),
        mode,
        interactive,
        body: body.into(),
    })
}

/// Checks that control-flow statements appear inside a function or loop.
struct Placement<'a> {
    source: &'a str,
    filename: &'a str,
}

impl Placement<'_> {
    fn check_block(&self, body: &[Stmt], in_function: bool, in_loop: bool) -> Result<(), SyntaxError> {
        for stmt in body {
            self.check_stmt(stmt, in_function, in_loop)?;
        }
        Ok(())
    }

    fn check_stmt(&self, stmt: &Stmt, in_function: bool, in_loop: bool) -> Result<(), SyntaxError> {
        match &stmt.kind {
            StmtKind::Return(_) if !in_function => Err(self.error(stmt, "'return' outside function")),
            StmtKind::Break if !in_loop => Err(self.error(stmt, "'break' outside loop")),
            StmtKind::Continue if !in_loop => {
                Err(self.error(stmt, "'continue' not properly in loop"))
            }
            StmtKind::FunctionDef(def) => self.check_block(&def.body, true, false),
            StmtKind::While { body, orelse, .. } | StmtKind::For { body, orelse, .. } => {
                self.check_block(body, in_function, true)?;
                self.check_block(orelse, in_function, in_loop)
            }
            StmtKind::If { body, orelse, .. } => {
                self.check_block(body, in_function, in_loop)?;
                self.check_block(orelse, in_function, in_loop)
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                self.check_block(body, in_function, in_loop)?;
                for handler in handlers {
                    self.check_block(&handler.body, in_function, in_loop)?;
                }
                self.check_block(orelse, in_function, in_loop)?;
                self.check_block(finalbody, in_function, in_loop)
            }
            _ => Ok(()),
        }
    }

    fn error(&self, stmt: &Stmt, message: &str) -> SyntaxError {
        SyntaxError::new(message, self.filename).at(self.source, stmt.span.line, stmt.span.column)
    }
}
