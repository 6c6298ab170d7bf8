//! Integration tests for the continuation decision

use adder_runtime::{Decision, Document, decide, should_continue};
use proptest::prelude::*;

const PROGRAM: &str = "<stdin>";

fn at_end(text: &str) -> Decision {
    decide(&Document::at_end(text), PROGRAM)
}

// =============================================================================
// Cursor Position
// =============================================================================

proptest! {
    #[test]
    fn cursor_above_last_line_continues(
        first in "[ -~]{0,20}",
        rest in "[ -~]{0,20}",
        offset in 0usize..20,
    ) {
        let text = format!("{first}\n{rest}");
        let cursor = offset.min(first.len());
        let doc = Document::new(text, cursor);
        prop_assert!(should_continue(&doc, PROGRAM));
    }
}

#[test]
fn cursor_above_last_line_of_complete_code() {
    let doc = Document::new("x = 1\ny = 2", 3);
    assert_eq!(decide(&doc, PROGRAM), Decision::Continue);
}

// =============================================================================
// Submit
// =============================================================================

#[test]
fn empty_buffer_submits() {
    assert_eq!(at_end(""), Decision::Submit);
}

#[test]
fn simple_statements_submit() {
    for text in ["x = 1", "print(1)", "1 +", "x = = 1", "f(1))", "import os"] {
        assert_eq!(at_end(text), Decision::Submit, "{text:?}");
    }
}

#[test]
fn dangling_comment_submits() {
    assert_eq!(at_end("# print(1"), Decision::Submit);
    assert_eq!(at_end("   # note"), Decision::Submit);
}

// =============================================================================
// Continue
// =============================================================================

#[test]
fn unterminated_call_continues() {
    assert_eq!(at_end("print(1"), Decision::Continue);
    assert_eq!(at_end("x = [1,\n 2,"), Decision::Continue);
}

#[test]
fn deeply_nested_input_submits() {
    // The editor decides on the main thread.
    let decisions = std::thread::Builder::new()
        .stack_size(8 << 20)
        .spawn(|| {
            [
                at_end(&"(".repeat(5000)),
                at_end(&format!("x = {}1", "-".repeat(5000))),
            ]
        })
        .expect("spawn")
        .join()
        .expect("decide must not overflow");
    assert_eq!(decisions, [Decision::Submit, Decision::Submit]);
}

#[test]
fn trailing_backslash_continues() {
    assert_eq!(at_end("x = 1 \\"), Decision::Continue);
    // The empty line after the continuation ends the statement.
    assert_eq!(at_end("x = 1 \\\n"), Decision::Submit);
    assert_eq!(at_end("x = 1 \\\n+ 2"), Decision::Submit);
}

#[test]
fn blank_only_buffer_continues() {
    assert_eq!(at_end("   "), Decision::Continue);
    assert_eq!(at_end("    \n"), Decision::Continue);
}

#[test]
fn open_triple_quote_continues() {
    assert_eq!(at_end("s = '''first"), Decision::Continue);
    assert_eq!(at_end("s = \"\"\"first\nsecond"), Decision::Continue);
    assert_eq!(at_end("s = '''first\nsecond'''"), Decision::Submit);
}

#[test]
fn block_needs_a_blank_line() {
    assert_eq!(at_end("if True:"), Decision::Continue);
    assert_eq!(at_end("if True:\n    pass"), Decision::Continue);
    assert_eq!(at_end("if True:\n    pass\n"), Decision::Submit);
    assert_eq!(at_end("if True:\n    pass\n   "), Decision::Submit);
}

#[test]
fn compound_statements() {
    let def = "def f(x):\n    if x:\n        return 1\n    return 2";
    assert_eq!(at_end(def), Decision::Continue);
    assert_eq!(at_end(&format!("{def}\n")), Decision::Submit);

    assert_eq!(at_end("try:\n    x = 1"), Decision::Continue);
    assert_eq!(at_end("try:\n    x = 1\n"), Decision::Continue);
    assert_eq!(at_end("try:\n    x = 1\nexcept:\n    pass\n"), Decision::Submit);
}
