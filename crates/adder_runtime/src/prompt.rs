//! Prompt text derived from the input counter.
//!
//! The primary prompt is `In [n]: `. Continuation lines get `...: ` right
//! aligned under it, so the code of every line starts in the same column.

use adder_language::{Token, TokenKind};
use unicode_width::UnicodeWidthStr;

const CONTINUATION_MARK: &str = "...: ";

/// Returns the primary prompt tokens.
#[must_use]
pub fn prompt_tokens(count: usize) -> Vec<Token> {
    vec![Token::synthetic(TokenKind::Prompt, format!("In [{count}]: "))]
}

/// Returns the continuation prefix tokens, as wide as the primary prompt.
#[must_use]
pub fn continuation_tokens(count: usize) -> Vec<Token> {
    let width = text_of(&prompt_tokens(count)).width();
    let padding = width.saturating_sub(CONTINUATION_MARK.width());
    vec![
        Token::synthetic(TokenKind::Continuation, " ".repeat(padding)),
        Token::synthetic(TokenKind::Continuation, CONTINUATION_MARK),
    ]
}

/// Returns the primary prompt as plain text.
#[must_use]
pub fn prompt_text(count: usize) -> String {
    text_of(&prompt_tokens(count))
}

/// Returns the continuation prefix as plain text.
#[must_use]
pub fn continuation_text(count: usize) -> String {
    text_of(&continuation_tokens(count))
}

fn text_of(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.literal.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_prompt() {
        assert_eq!(prompt_text(1), "In [1]: ");
        assert_eq!(prompt_tokens(7)[0].kind, TokenKind::Prompt);
    }

    #[test]
    fn continuation_is_aligned() {
        assert_eq!(continuation_text(1), "   ...: ");
        assert_eq!(continuation_text(12), "    ...: ");
        for count in [1, 9, 10, 100, 12345] {
            assert_eq!(
                continuation_text(count).len(),
                prompt_text(count).len(),
                "count {count}"
            );
        }
    }

    #[test]
    fn continuation_kind() {
        assert!(
            continuation_tokens(3)
                .iter()
                .all(|t| t.kind == TokenKind::Continuation)
        );
    }
}
