//! Integration tests for the lexer
//!
//! The lexer is lossless: every byte of the input comes back in some token.

use adder_language::{EOF_IN_TRIPLE_QUOTED, Lexer, TokenKind, is_keyword};
use proptest::prelude::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::tokenize_all(source)
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| !k.is_trivia())
        .collect()
}

fn rebuild(source: &str) -> String {
    Lexer::tokenize_all(source)
        .into_iter()
        .map(|t| t.literal)
        .collect()
}

// =============================================================================
// Line Structure
// =============================================================================

#[test]
fn nested_blocks_dedent_at_end() {
    use TokenKind::{Dedent, Indent};
    let k = kinds("def f():\n    if x:\n        return 1");
    assert_eq!(k.iter().filter(|k| **k == Indent).count(), 2);
    assert_eq!(k.iter().filter(|k| **k == Dedent).count(), 2);
    assert_eq!(k.last(), Some(&TokenKind::Eof));
}

#[test]
fn reserved_words_lex_as_names() {
    let tokens = Lexer::tokenize_all("while True: pass");
    assert_eq!(tokens[0].kind, TokenKind::Name);
    assert!(is_keyword(&tokens[0].literal));
    assert!(!is_keyword("print"));
}

#[test]
fn unterminated_triple_quote_is_reported() {
    let (tokens, diagnostics) = Lexer::tokenize("'''open\nstill open");
    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, EOF_IN_TRIPLE_QUOTED);
}

#[test]
fn spans_point_into_source() {
    let source = "x = 'é' + y";
    for token in Lexer::tokenize_all(source) {
        assert_eq!(&source[token.span.start..token.span.end], token.literal);
    }
}

// =============================================================================
// Round Trip
// =============================================================================

/// Strategy for Python-looking fragments glued together.
fn python_like() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-z_][a-z0-9_]{0,5}",
        "[0-9]{1,4}(\\.[0-9]{1,2})?",
        "'[a-z ]{0,4}'?",
        "\"\"\"[a-z\n]{0,6}",
        Just("if x:".to_string()),
        Just("def f(a, b=1):".to_string()),
        Just("\n".to_string()),
        Just("\n    ".to_string()),
        Just("\n  ".to_string()),
        Just("\t".to_string()),
        Just(" ".to_string()),
        Just("# note".to_string()),
        Just("\\\n".to_string()),
        "[-+*/%=<>!(){}\\[\\],:.]{1,3}",
    ];
    prop::collection::vec(piece, 0..30).prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn round_trip_arbitrary(source in "\\PC{0,200}") {
        prop_assert_eq!(rebuild(&source), source);
    }

    #[test]
    fn round_trip_python_like(source in python_like()) {
        prop_assert_eq!(rebuild(&source), source);
    }

    #[test]
    fn ends_with_single_eof(source in python_like()) {
        let tokens = Lexer::tokenize_all(&source);
        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        prop_assert_eq!(eofs, 1);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }
}
