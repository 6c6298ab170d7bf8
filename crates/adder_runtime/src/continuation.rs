//! Deciding whether the buffer is ready to run.
//!
//! Called on every Enter. The decision combines a compile round-trip with a
//! token heuristic:
//!
//! 1. A cursor above the last line keeps editing.
//! 2. An empty buffer submits.
//! 3. A compile failure that means "the input stopped too early" continues,
//!    unless the buffer is a dangling comment.
//! 4. Otherwise a buffer that opened an indented block needs a blank final
//!    line before it submits; anything else submits at once.

use adder_language::{CompileMode, EOF_IN_TRIPLE_QUOTED, SyntaxError, UNEXPECTED_EOF, compile};

use crate::classify::{classify, has_indent};
use crate::document::Document;

/// What Enter should do with the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Insert a line break and keep editing.
    Continue,
    /// Hand the buffer to the session.
    Submit,
}

/// The two ways a compile can fail, as far as continuation is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompileFailure {
    /// The input ended in the middle of a construct.
    IncompleteInput,
    /// Any other syntax error.
    Invalid,
}

/// Translates a compile error into a [`CompileFailure`].
///
/// This is the only place that inspects compiler message text.
#[must_use]
pub fn classify_compile_error(error: &SyntaxError) -> CompileFailure {
    let message = error.message.as_str();
    if message.contains(UNEXPECTED_EOF) || message.contains(EOF_IN_TRIPLE_QUOTED) {
        CompileFailure::IncompleteInput
    } else {
        CompileFailure::Invalid
    }
}

/// Decides whether Enter continues the buffer or submits it.
#[must_use]
pub fn decide(document: &Document, program: &str) -> Decision {
    if !document.on_last_line() {
        tracing::trace!("cursor above last line");
        return Decision::Continue;
    }
    let text = document.text();
    if text.is_empty() {
        return Decision::Submit;
    }

    if let Err(error) = compile(&format!("{text}\n"), program, CompileMode::Single, true) {
        if classify_compile_error(&error) == CompileFailure::IncompleteInput {
            let decision = if text.trim().starts_with('#') {
                Decision::Submit
            } else {
                Decision::Continue
            };
            tracing::debug!(?decision, message = %error.message, "incomplete input");
            return decision;
        }
    }

    if !has_indent(&classify(text)) {
        tracing::trace!("no open block");
        return Decision::Submit;
    }
    let decision = if text.trim_end_matches(' ').ends_with('\n') {
        Decision::Submit
    } else {
        Decision::Continue
    };
    tracing::debug!(?decision, "open block");
    decision
}

/// Returns true if Enter should insert a line break instead of submitting.
#[must_use]
pub fn should_continue(document: &Document, program: &str) -> bool {
    decide(document, program) == Decision::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "<stdin>";

    fn at_end(text: &str) -> Decision {
        decide(&Document::at_end(text), PROGRAM)
    }

    #[test]
    fn empty_buffer_submits() {
        assert_eq!(at_end(""), Decision::Submit);
    }

    #[test]
    fn simple_statements_submit() {
        assert_eq!(at_end("x = 1"), Decision::Submit);
        assert_eq!(at_end("print(1)"), Decision::Submit);
    }

    #[test]
    fn syntax_errors_submit() {
        assert_eq!(at_end("1 +"), Decision::Submit);
        assert_eq!(at_end("x = = 2"), Decision::Submit);
        assert_eq!(at_end("'abc"), Decision::Submit);
    }

    #[test]
    fn open_brackets_continue() {
        assert_eq!(at_end("print(1"), Decision::Continue);
        assert_eq!(at_end("[1,\n 2,"), Decision::Continue);
        assert_eq!(at_end("{'a': 1"), Decision::Continue);
    }

    #[test]
    fn unterminated_triple_quote_continues() {
        assert_eq!(at_end("s = '''abc"), Decision::Continue);
        assert_eq!(at_end("s = '''abc\ndef'''"), Decision::Submit);
    }

    #[test]
    fn dangling_comment_submits() {
        assert_eq!(at_end("# print(1"), Decision::Submit);
        assert_eq!(at_end("   # just a note"), Decision::Submit);
    }

    #[test]
    fn block_header_continues() {
        assert_eq!(at_end("if True:"), Decision::Continue);
        assert_eq!(at_end("def f(x):"), Decision::Continue);
    }

    #[test]
    fn block_needs_blank_line() {
        assert_eq!(at_end("if True:\n    pass"), Decision::Continue);
        assert_eq!(at_end("if True:\n    pass\n"), Decision::Submit);
        assert_eq!(at_end("if True:\n    pass\n    "), Decision::Submit);
    }

    #[test]
    fn try_needs_handler_before_blank_line_counts() {
        assert_eq!(at_end("try:\n    x = 1\n"), Decision::Continue);
        assert_eq!(
            at_end("try:\n    x = 1\nexcept:\n    pass\n"),
            Decision::Submit
        );
    }

    #[test]
    fn cursor_above_last_line_continues() {
        let doc = Document::new("x = 1\ny = 2", 2);
        assert_eq!(decide(&doc, PROGRAM), Decision::Continue);
        assert!(should_continue(&doc, PROGRAM));
    }

    #[test]
    fn error_translation() {
        let incomplete = SyntaxError::new(UNEXPECTED_EOF, PROGRAM);
        assert_eq!(
            classify_compile_error(&incomplete),
            CompileFailure::IncompleteInput
        );
        let triple = SyntaxError::new(EOF_IN_TRIPLE_QUOTED, PROGRAM);
        assert_eq!(classify_compile_error(&triple), CompileFailure::IncompleteInput);
        let invalid = SyntaxError::new("invalid syntax", PROGRAM);
        assert_eq!(classify_compile_error(&invalid), CompileFailure::Invalid);
    }
}
