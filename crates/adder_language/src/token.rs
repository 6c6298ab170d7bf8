//! Token types for the Adder language.
//!
//! Tokens are the output of the lexer and input to the parser. Unlike a
//! parser-only token stream, the lexer keeps every byte of the source:
//! whitespace, comments and newlines are tokens too, so the REPL can
//! highlight a buffer by painting token literals back to back.

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The kind of this token.
    pub kind: TokenKind,
    /// The exact source text of this token.
    pub literal: String,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            literal: literal.into(),
            span,
        }
    }

    /// Creates a token that is not tied to any source position.
    ///
    /// Used for prompt fragments and other synthesized text.
    #[must_use]
    pub fn synthetic(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self::new(kind, literal, Span::default())
    }

    /// Returns true if this token has the given kind.
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Returns true if this token is the operator or delimiter `op`.
    #[must_use]
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.literal == op
    }

    /// Returns true if this is a `Name` token with the given literal.
    #[must_use]
    pub fn is_name(&self, name: &str) -> bool {
        self.kind == TokenKind::Name && self.literal == name
    }
}

/// Token kinds.
///
/// This is a closed set shared by the lexer, the highlighter and the prompt
/// renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    /// Identifier, including reserved words before classification.
    Name,
    /// Reserved word (assigned by classification, never by the lexer).
    Keyword,
    /// Numeric literal.
    Number,
    /// String literal, including prefix and quotes.
    String,
    /// Operator or delimiter.
    Operator,
    /// Comment from `#` to end of line.
    Comment,
    /// End of a logical line.
    Newline,
    /// Start of a more deeply indented block; the literal is the indentation.
    Indent,
    /// End of an indented block; the literal is empty.
    Dedent,
    /// Spaces, tabs, line continuations and non-logical newlines.
    Whitespace,
    /// Text that could not be tokenized.
    Error,
    /// End of input; the literal is empty.
    Eof,
    /// Primary prompt text.
    Prompt,
    /// Continuation prompt text.
    Continuation,
}

impl TokenKind {
    /// Returns true if the parser never needs to see this kind.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }

    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Keyword => "keyword",
            Self::Number => "number",
            Self::String => "string",
            Self::Operator => "operator",
            Self::Comment => "comment",
            Self::Newline => "newline",
            Self::Indent => "indent",
            Self::Dedent => "dedent",
            Self::Whitespace => "whitespace",
            Self::Error => "error",
            Self::Eof => "end of input",
            Self::Prompt => "prompt",
            Self::Continuation => "continuation",
        }
    }
}
