//! Integration tests for compilation
//!
//! The REPL tells incomplete input from invalid input by the compiler's
//! message, so the exact messages matter here.

use adder_language::{
    CompileMode, EOF_IN_TRIPLE_QUOTED, SyntaxErrorKind, UNEXPECTED_EOF, compile,
};
use proptest::prelude::*;

fn single(source: &str) -> Result<(), String> {
    compile(source, "<stdin>", CompileMode::Single, true)
        .map(|_| ())
        .map_err(|e| e.message)
}

// =============================================================================
// Incomplete Input
// =============================================================================

#[test]
fn open_constructs_are_unexpected_eof() {
    for source in [
        "print(1\n",
        "x = [1,\n",
        "d = {'a':\n",
        "if True:\n",
        "while x:\n",
        "for i in range(3):\n",
        "def f(a,\n",
        "try:\n    pass\n",
        "x = (1 +\n",
    ] {
        assert_eq!(single(source), Err(UNEXPECTED_EOF.to_string()), "{source:?}");
    }
}

#[test]
fn open_triple_quote() {
    let err = single("s = '''abc\n").unwrap_err();
    assert!(err.contains(EOF_IN_TRIPLE_QUOTED), "{err}");
}

#[test]
fn dangling_comment_is_unexpected_eof() {
    assert_eq!(single("# print(1\n"), Err(UNEXPECTED_EOF.to_string()));
}

// =============================================================================
// Invalid Input
// =============================================================================

#[test]
fn invalid_input_is_not_eof() {
    for source in ["x = = 1\n", "1 2\n", ")\n", "def 1():\n"] {
        let err = single(source).unwrap_err();
        assert!(!err.contains(UNEXPECTED_EOF), "{source:?}: {err}");
    }
}

#[test]
fn syntax_error_display() {
    let err = compile("x = = 1\n", "<stdin>", CompileMode::Single, true).unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::Syntax);
    assert_eq!(err.to_string(), "SyntaxError: invalid syntax (<stdin>, line 1)");
}

#[test]
fn report_has_caret() {
    let err = compile("x = = 1\n", "<stdin>", CompileMode::Single, true).unwrap_err();
    let report = err.report();
    assert!(report.starts_with("  File \"<stdin>\", line 1\n    x = = 1\n"));
    assert!(report.contains('^'));
    assert!(report.ends_with("SyntaxError: invalid syntax"));
}

#[test]
fn bad_dedent_is_an_indentation_error() {
    let err = compile("if x:\n    a\n  b\n", "<stdin>", CompileMode::Exec, false).unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::Indentation);
}

#[test]
fn return_outside_function() {
    let err = compile("return 1\n", "<stdin>", CompileMode::Exec, false).unwrap_err();
    assert!(err.message.contains("'return' outside function"), "{}", err.message);
}

// =============================================================================
// Complete Input
// =============================================================================

#[test]
fn complete_statements_compile() {
    for source in [
        "x = 1\n",
        "print(1)\n",
        "if True:\n    pass\n",
        "def f():\n    return 1\n\n",
        "for i in range(3): print(i)\n",
        "x = 1; y = 2\n",
    ] {
        assert_eq!(single(source), Ok(()), "{source:?}");
    }
}

#[test]
fn single_mode_takes_one_statement() {
    assert!(single("x = 1\ny = 2\n").is_err());
    assert!(compile("x = 1\ny = 2\n", "<m>", CompileMode::Exec, false).is_ok());
}

proptest! {
    #[test]
    fn compile_never_panics(source in "[a-z0-9 ():=+\\-*,'\\[\\]\n]{0,80}") {
        let _ = compile(&source, "<fuzz>", CompileMode::Single, true);
        let _ = compile(&source, "<fuzz>", CompileMode::Exec, false);
    }
}
