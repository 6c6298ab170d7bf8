//! Integration tests for sessions
//!
//! A session keeps the module namespace across turns and reports each turn's
//! outcome without ever failing itself.

use adder_language::Output;
use adder_runtime::{Document, ReplConfig, Session, Turn};

fn session() -> Session {
    let config = ReplConfig::new().with_recursion_limit(40);
    Session::with_output(&config, Output::buffer())
}

#[test]
fn namespace_persists_across_turns() {
    let mut session = session();
    assert!(session.submit("x = 1").is_completed());
    let Turn::Completed(value) = session.submit("x + 1") else {
        panic!("second turn failed");
    };
    assert_eq!(value.repr(), "2");
}

#[test]
fn errors_are_not_fatal() {
    let mut session = session();
    session.submit("total = 0");
    let Turn::Failed(error) = session.submit("total = total + 5; undefined_name") else {
        panic!("expected a runtime failure");
    };
    assert_eq!(
        error.to_string(),
        "NameError: name 'undefined_name' is not defined"
    );
    assert!(session.submit("total").is_completed());
    assert_eq!(session.output().take(), "5\n");
}

#[test]
fn echo_writes_to_output() {
    let mut session = session();
    session.submit("1 + 1");
    assert_eq!(session.output().take(), "2\n");
    session.submit("None");
    assert_eq!(session.output().take(), "");
}

#[test]
fn compile_errors_do_not_run_anything() {
    let mut session = session();
    let Turn::CompileFailed(error) = session.submit("print('x') print('y')") else {
        panic!("expected a compile failure");
    };
    assert_eq!(error.message, "invalid syntax");
    assert_eq!(session.output().take(), "");
    assert_eq!(session.input_count(), 2);
}

#[test]
fn multi_line_submission() {
    let mut session = session();
    let block = "def greet(name):\n    return 'hi ' + name\n";
    assert!(session.submit(block).is_completed());
    session.submit("greet('bob')");
    assert_eq!(session.output().take(), "'hi bob'\n");
}

#[test]
fn completion_sees_new_definitions() {
    let mut session = session();
    let before = session.complete("gree", 4);
    assert!(before.candidates.is_empty());

    session.submit("greeting = 'hello'");
    assert_eq!(session.complete("gree", 4).complete_now(), Some("ting"));
}

#[test]
fn detector_through_session() {
    let session = session();
    assert!(session.should_continue(&Document::at_end("for i in range(3):")));
    assert!(!session.should_continue(&Document::at_end("for i in range(3): pass")));
}

#[test]
fn globals_and_builtins_are_separate() {
    let mut session = session();
    session.submit("len_of_list = 3");
    assert!(session.globals().contains("len_of_list"));
    assert!(!session.builtins().contains("len_of_list"));
    assert!(session.builtins().contains("len"));
    assert!(session.globals().contains("__name__"));
}
