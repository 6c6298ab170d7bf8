//! Integration tests for token classification

use adder_language::{KEYWORDS, Lexer, TokenKind};
use adder_runtime::{classify, has_indent};
use proptest::prelude::*;

#[test]
fn every_reserved_word_is_a_keyword() {
    for word in KEYWORDS {
        let tokens = classify(word);
        assert_eq!(tokens[0].kind, TokenKind::Keyword, "{word}");
    }
}

#[test]
fn builtins_are_names() {
    for word in ["print", "len", "self", "match"] {
        assert_eq!(classify(word)[0].kind, TokenKind::Name, "{word}");
    }
}

#[test]
fn keywords_inside_strings_and_comments() {
    let tokens = classify("'if' # while");
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Comment));
    assert!(!tokens.iter().any(|t| t.kind == TokenKind::Keyword));
}

#[test]
fn indent_detection() {
    assert!(has_indent(&classify("if x:\n    y")));
    assert!(!has_indent(&classify("if x: y")));
    assert!(!has_indent(&classify("f(1,\n    2)")));
}

proptest! {
    #[test]
    fn classification_only_changes_kinds(source in "[a-z :=()'#\n]{0,60}") {
        let lexed = Lexer::tokenize_all(&source);
        let classified = classify(&source);
        prop_assert_eq!(lexed.len(), classified.len());
        for (before, after) in lexed.iter().zip(&classified) {
            prop_assert_eq!(&before.literal, &after.literal);
            prop_assert_eq!(before.span, after.span);
            if before.kind != after.kind {
                prop_assert_eq!(before.kind, TokenKind::Name);
                prop_assert_eq!(after.kind, TokenKind::Keyword);
            }
        }
    }
}
