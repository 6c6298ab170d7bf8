//! Integration tests for the interactive loop
//!
//! Drives a [`Repl`] with a scripted editor and a canned confirmation answer.

use std::collections::VecDeque;

use adder_foundation::{ErrorKind, Namespace, Result};
use adder_language::{Output, Value};
use adder_runtime::{LineEditor, ReadResult, Repl, ReplConfig, Session};

/// Editor that replays a fixed script, then reports end of input.
struct ScriptedEditor {
    script: VecDeque<ReadResult>,
}

impl ScriptedEditor {
    fn lines(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| ReadResult::Line((*l).to_string())))
    }

    fn new(script: impl IntoIterator<Item = ReadResult>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl LineEditor for ScriptedEditor {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(self.script.pop_front().unwrap_or(ReadResult::Eof))
    }

    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        self.read_line(prompt)
    }

    fn set_namespaces(&mut self, _globals: Namespace<Value>, _builtins: Namespace<Value>) {}
}

fn run(editor: ScriptedEditor, answers: &'static [u8]) -> (Result<()>, String) {
    let config = ReplConfig::new().with_color(false);
    let mut repl = Repl::with_editor(editor, &config)
        .with_session(Session::with_output(&config, Output::buffer()))
        .with_confirmation_input(answers);
    let result = repl.run();
    let out = repl.session().output().take();
    (result, out)
}

// =============================================================================
// Turns
// =============================================================================

#[test]
fn transcript() {
    let (result, out) = run(
        ScriptedEditor::lines(&["x = 2", "x ** 10", "x +", "", "y"]),
        b"y",
    );
    assert!(result.is_ok());
    assert_eq!(
        out,
        "Type \"Ctrl-D\" to exit.\n\
         \n\
         1024\n\
         \n\
         compile error: SyntaxError: invalid syntax (<stdin>, line 1)\n\
         \n\
         Traceback (most recent call last):\n  \
         File \"<stdin>\", line 1, in <module>\n\
         NameError: name 'y' is not defined\n\
         \n\
         Do you really want to exit ([y]/n)? "
    );
}

#[test]
fn multi_line_input_is_joined() {
    let (_, out) = run(
        ScriptedEditor::lines(&["for i in range(3):", "    print(i)", "", "i"]),
        b"y",
    );
    assert!(out.contains("0\n1\n2\n\n2\n\n"), "{out:?}");
}

#[test]
fn bracketed_input_spans_lines() {
    let editor = ScriptedEditor::lines(&["x = (1,", "2)", "x"]);
    let config = ReplConfig::new();
    let mut repl = Repl::with_editor(editor, &config)
        .with_session(Session::with_output(&config, Output::buffer()))
        .with_confirmation_input(&b"y"[..]);
    repl.run().unwrap();
    assert_eq!(repl.session().input_count(), 3);
    assert!(repl.session().output().take().contains("(1, 2)\n"));
}

#[test]
fn interrupt_then_continue() {
    let (result, out) = run(
        ScriptedEditor::new([
            ReadResult::Line("def f():".to_string()),
            ReadResult::Interrupted,
            ReadResult::Line("'after'".to_string()),
        ]),
        b"y",
    );
    assert!(result.is_ok());
    assert!(out.contains("'after'\n"));
    assert!(!out.contains("compile error"));
}

// =============================================================================
// Exit Confirmation
// =============================================================================

#[test]
fn yes_exits() {
    let (result, out) = run(ScriptedEditor::lines(&[]), b"y");
    assert!(result.is_ok());
    assert!(out.ends_with("Do you really want to exit ([y]/n)? "));
}

#[test]
fn newline_exits() {
    let (result, _) = run(ScriptedEditor::lines(&[]), b"\n");
    assert!(result.is_ok());
}

#[test]
fn no_resumes() {
    let (result, out) = run(
        ScriptedEditor::new([ReadResult::Eof, ReadResult::Line("1".to_string())]),
        b"ny",
    );
    assert!(result.is_ok());
    assert_eq!(out.matches("Do you really want to exit").count(), 2);
    assert!(out.contains("? 1\n\n"));
}

#[test]
fn closed_input_is_fatal() {
    let (result, _) = run(ScriptedEditor::lines(&[]), b"");
    let err = result.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
    assert_eq!(err.to_string(), "read error: EOF");
}

#[test]
fn only_one_byte_is_read() {
    // `n` then end of input: the second confirmation has nothing to read.
    let (result, _) = run(ScriptedEditor::lines(&[]), b"n");
    assert!(result.unwrap_err().is_io());
}
