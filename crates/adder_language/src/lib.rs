//! Lexer, parser, compiler, and interpreter for the Adder scripting language.
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization with indentation tracking and error recovery
//! - [`Parser`] - Parsing tokens into an AST
//! - [`compile`] - Checking an AST and producing a runnable [`Code`] unit
//! - [`Context`] - Builtins, output, and execution of code against a module
//!
//! The REPL relies on two things from this crate beyond running code: the
//! token stream (for highlighting and for deciding whether input is
//! complete) and the exact wording of end-of-input [`SyntaxError`]s.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod compiler;
pub mod error;
pub mod exception;
pub mod interp;
pub mod keywords;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;
pub mod value;


pub use compiler::{Code, CompileMode, compile};
pub use error::{SyntaxError, SyntaxErrorKind, UNEXPECTED_EOF};
pub use exception::{ExceptionObject, ExceptionType, RuntimeError, TraceFrame};
pub use interp::{Context, ContextOptions, Interpreter, Module, Output};
pub use keywords::{KEYWORDS, is_keyword};
pub use lexer::{Diagnostic, EOF_IN_TRIPLE_QUOTED, Lexer};
pub use parser::Parser;
pub use span::Span;
pub use token::{Token, TokenKind};
pub use value::Value;
