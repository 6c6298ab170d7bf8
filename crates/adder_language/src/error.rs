//! Compile-time errors.

use thiserror::Error;

/// Message used whenever the input ends while the parser needs more.
pub const UNEXPECTED_EOF: &str = "unexpected EOF while parsing";

/// The class of a compile-time error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Anything wrong with the token sequence.
    Syntax,
    /// Wrong or inconsistent indentation.
    Indentation,
}

impl SyntaxErrorKind {
    /// Returns the exception class name reported to the user.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Syntax => "SyntaxError",
            Self::Indentation => "IndentationError",
        }
    }
}

/// A failure to compile source text.
///
/// The `Display` form is the one-line diagnostic; [`SyntaxError::report`]
/// renders the multi-line form with the offending line and a caret.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{}: {message} ({filename}, line {line})", .kind.name())]
pub struct SyntaxError {
    /// Syntax or indentation error.
    pub kind: SyntaxErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Program identifier the source was compiled under.
    pub filename: String,
    /// 1-based line of the error.
    pub line: u32,
    /// 1-based column of the error.
    pub column: u32,
    /// The source line containing the error.
    pub text: String,
}

impl SyntaxError {
    /// Creates a syntax error.
    #[must_use]
    pub fn new(message: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            kind: SyntaxErrorKind::Syntax,
            message: message.into(),
            filename: filename.into(),
            line: 1,
            column: 1,
            text: String::new(),
        }
    }

    /// Marks this as an indentation error.
    #[must_use]
    pub const fn indentation(mut self) -> Self {
        self.kind = SyntaxErrorKind::Indentation;
        self
    }

    /// Sets the position and copies the offending line out of `source`.
    #[must_use]
    pub fn at(mut self, source: &str, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self.text = source
            .lines()
            .nth(line.saturating_sub(1) as usize)
            .unwrap_or_default()
            .to_string();
        self
    }

    /// Renders the multi-line report with a caret under the error column.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = format!("  File \"{}\", line {}\n", self.filename, self.line);
        if !self.text.is_empty() {
            let trimmed = self.text.trim_start();
            let indent = self.text.chars().count() - trimmed.chars().count();
            let caret = (self.column as usize).saturating_sub(indent + 1);
            out.push_str(&format!("    {trimmed}\n    {}^\n", " ".repeat(caret)));
        }
        out.push_str(&format!("{}: {}", self.kind.name(), self.message));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_display() {
        let err = SyntaxError::new(UNEXPECTED_EOF, "<stdin>").at("print(1", 1, 8);
        assert_eq!(
            err.to_string(),
            "SyntaxError: unexpected EOF while parsing (<stdin>, line 1)"
        );
    }

    #[test]
    fn indentation_display() {
        let err = SyntaxError::new("unexpected indent", "<stdin>")
            .indentation()
            .at("  x", 1, 1);
        assert!(err.to_string().starts_with("IndentationError: unexpected indent"));
    }

    #[test]
    fn report_points_at_column() {
        let err = SyntaxError::new("invalid syntax", "<stdin>").at("x = = 1", 1, 5);
        let report = err.report();
        assert!(report.contains("    x = = 1\n        ^\n"));
        assert!(report.ends_with("SyntaxError: invalid syntax"));
    }

    #[test]
    fn position_past_last_line() {
        let err = SyntaxError::new(UNEXPECTED_EOF, "<stdin>").at("if x:\n", 2, 1);
        assert_eq!(err.text, "");
        assert_eq!(err.line, 2);
    }
}
