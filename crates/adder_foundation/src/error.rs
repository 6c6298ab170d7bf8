//! Error types for the Adder system.
//!
//! Uses `thiserror` for ergonomic error definition. Language-level failures
//! (syntax errors, raised exceptions) have their own types in
//! `adder_language`; this error covers the process around them: terminal I/O,
//! the line editor, and configuration.

use thiserror::Error;

/// The main error type for Adder operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io(message.into()))
    }

    /// Creates a line editor error.
    #[must_use]
    pub fn editor(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Editor(message.into()))
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this is an I/O error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Reading from or writing to the terminal failed.
    #[error("read error: {0}")]
    Io(String),

    /// The line editor failed.
    #[error("line editor error: {0}")]
    Editor(String),

    /// Invalid configuration or command-line arguments.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = Error::io("EOF");
        assert!(err.is_io());
        assert_eq!(err.to_string(), "read error: EOF");
    }

    #[test]
    fn from_std_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stdin closed");
        let err = Error::from(io);
        assert!(matches!(err.kind, ErrorKind::Io(ref msg) if msg.contains("stdin closed")));
    }

    #[test]
    fn config_error_is_not_io() {
        let err = Error::config("unknown option: --bogus");
        assert!(!err.is_io());
        assert!(err.to_string().contains("--bogus"));
    }
}
