//! Line editor abstraction for the REPL.
//!
//! This module provides a trait-based abstraction over line editing libraries,
//! allowing the REPL to use rustyline while remaining swappable and testable.
//! The rustyline adapter wires the REPL core into the editor: completion,
//! highlighting, and an Enter key that asks the completeness detector whether
//! to submit the buffer or open a new line.

use std::borrow::Cow;

use adder_foundation::{Error, Namespace, Result};
use adder_language::{TokenKind, Value};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::history::DefaultHistory;
use rustyline::{
    Cmd, CompletionType, ConditionalEventHandler, Config, Context, Editor, Event, EventContext,
    EventHandler, Helper, Hinter, KeyCode, KeyEvent, Modifiers, RepeatCount, Validator,
};

use crate::completion::complete;
use crate::config::ReplConfig;
use crate::continuation::should_continue;
use crate::document::Document;
use crate::highlight::AdderHighlighter;

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line (or a whole multi-line buffer) was submitted.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing functionality.
pub trait LineEditor {
    /// Read a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Read a continuation line (for multi-line input).
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Hands the editor snapshots of the namespaces to complete against.
    fn set_namespaces(&mut self, globals: Namespace<Value>, builtins: Namespace<Value>);
}

/// Helper for rustyline that provides completion and highlighting.
#[derive(Helper, Hinter, Validator)]
struct AdderHelper {
    globals: Namespace<Value>,
    builtins: Namespace<Value>,
    highlighter: AdderHighlighter,
}

impl Completer for AdderHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Suffixes are inserted at the cursor; nothing typed is replaced.
        let candidates = complete(line, pos, &self.globals, &self.builtins)
            .candidates
            .into_iter()
            .map(|c| Pair {
                display: c.display,
                replacement: c.suffix,
            })
            .collect();
        Ok((pos, candidates))
    }
}

impl Highlighter for AdderHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        let kind = if prompt.trim_start().starts_with("...") {
            TokenKind::Continuation
        } else {
            TokenKind::Prompt
        };
        self.highlighter.prompt(prompt, kind)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        self.highlighter.is_enabled()
    }
}

/// Enter key binding: submit complete input, otherwise open a new line.
///
/// Runs on rustyline's side, so it holds only what it needs to decide.
struct EnterHandler {
    program: String,
    indent: Option<usize>,
}

impl ConditionalEventHandler for EnterHandler {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        let document = Document::new(ctx.line(), ctx.pos());
        if should_continue(&document, &self.program) {
            Some(Cmd::Insert(1, line_break(&document, self.indent)))
        } else {
            Some(Cmd::AcceptLine)
        }
    }
}

/// Text inserted when Enter continues the buffer.
///
/// With auto-indent the new line repeats the current line's indentation, one
/// unit deeper after a line ending in `:`.
pub(crate) fn line_break(document: &Document, indent: Option<usize>) -> String {
    let mut text = String::from("\n");
    let Some(width) = indent else {
        return text;
    };
    let line = document.current_line_before_cursor();
    let body = line.trim_start();
    text.push_str(&line[..line.len() - body.len()]);
    if body.trim_end().ends_with(':') {
        text.push_str(&" ".repeat(width));
    }
    text
}

/// Line editor implementation using rustyline.
pub struct RustylineEditor {
    editor: Editor<AdderHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a new rustyline-based editor.
    ///
    /// # Errors
    ///
    /// Returns an error if rustyline initialization fails.
    pub fn new(config: &ReplConfig) -> Result<Self> {
        let rl_config = Config::builder()
            .auto_add_history(false)
            .completion_type(CompletionType::List)
            .build();

        let helper = AdderHelper {
            globals: Namespace::new(),
            builtins: Namespace::new(),
            highlighter: AdderHighlighter::new(config.color()),
        };

        let mut editor =
            Editor::with_config(rl_config).map_err(|e| Error::editor(e.to_string()))?;
        editor.set_helper(Some(helper));
        editor.bind_sequence(
            KeyEvent(KeyCode::Enter, Modifiers::NONE),
            EventHandler::Conditional(Box::new(EnterHandler {
                program: config.program().to_string(),
                indent: config.auto_indent(),
            })),
        );

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::editor(e.to_string())),
        }
    }

    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        self.read_line(prompt)
    }

    fn set_namespaces(&mut self, globals: Namespace<Value>, builtins: Namespace<Value>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.globals = globals;
            helper.builtins = builtins;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_break() {
        let doc = Document::at_end("x = (1,");
        assert_eq!(line_break(&doc, None), "\n");
        assert_eq!(line_break(&doc, Some(4)), "\n");
    }

    #[test]
    fn block_header_indents() {
        let doc = Document::at_end("if x:");
        assert_eq!(line_break(&doc, Some(4)), "\n    ");
        assert_eq!(line_break(&doc, Some(2)), "\n  ");
    }

    #[test]
    fn indentation_is_kept() {
        let doc = Document::at_end("def f():\n    if x:\n        y = 1");
        assert_eq!(line_break(&doc, Some(4)), "\n        ");
        let doc = Document::at_end("def f():\n    while x:  ");
        assert_eq!(line_break(&doc, Some(4)), "\n        ");
    }

    #[test]
    fn no_indent_when_disabled() {
        let doc = Document::at_end("    if x:");
        assert_eq!(line_break(&doc, None), "\n");
    }

    #[test]
    fn enter_handler_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EnterHandler>();
    }
}
