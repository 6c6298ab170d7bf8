//! Token classification for highlighting and block detection.
//!
//! The lexer reports reserved words as plain names. Classification rewrites
//! the kind of every name found in the language's reserved-word table to
//! [`TokenKind::Keyword`] and leaves every other token untouched, literals
//! included.

use adder_language::{Lexer, Token, TokenKind, is_keyword};

/// Lexes `text` and marks reserved words as keywords.
///
/// Lexical errors do not stop classification; the offending text comes back
/// as [`TokenKind::Error`] tokens.
#[must_use]
pub fn classify(text: &str) -> Vec<Token> {
    let (mut tokens, _diagnostics) = Lexer::tokenize(text);
    for token in &mut tokens {
        if token.kind == TokenKind::Name && is_keyword(&token.literal) {
            token.kind = TokenKind::Keyword;
        }
    }
    tokens
}

/// Returns true if the stream opens an indented block anywhere.
#[must_use]
pub fn has_indent(tokens: &[Token]) -> bool {
    tokens.iter().any(|t| t.kind == TokenKind::Indent)
}
