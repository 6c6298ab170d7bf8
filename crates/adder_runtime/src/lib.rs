//! REPL front-end for Adder.
//!
//! This crate provides:
//! - [`classify`] - Token classification for highlighting
//! - [`decide`] - Whether Enter continues the buffer or submits it
//! - [`complete`] - Name completion against the live namespaces
//! - [`Session`] and [`Repl`] - The interactive loop and its state

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod classify;
mod completion;
mod config;
mod continuation;
mod document;
mod editor;
mod highlight;
mod prompt;
mod repl;
mod session;

pub use classify::{classify, has_indent};
pub use completion::{Completion, Completions, complete};
pub use config::{DEFAULT_INDENT_WIDTH, DEFAULT_PROGRAM, ReplConfig};
pub use continuation::{CompileFailure, Decision, classify_compile_error, decide, should_continue};
pub use document::Document;
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use highlight::{AdderHighlighter, Rgb, Schema, Style};
pub use prompt::{continuation_text, continuation_tokens, prompt_text, prompt_tokens};
pub use repl::Repl;
pub use session::{Session, Turn};
