//! Integration tests for name completion

use adder_foundation::Namespace;
use adder_runtime::complete;
use proptest::prelude::*;

fn namespace(names: &[&str]) -> Namespace<u8> {
    names.iter().map(|n| (*n, 0)).collect()
}

fn displays(line: &str, globals: &Namespace<u8>, builtins: &Namespace<u8>) -> Vec<String> {
    complete(line, line.len(), globals, builtins)
        .candidates
        .into_iter()
        .map(|c| c.display)
        .collect()
}

// =============================================================================
// Candidates
// =============================================================================

#[test]
fn two_candidates() {
    let globals = namespace(&["foobar", "foo", "bar"]);
    let result = complete("fo", 2, &globals, &Namespace::new());

    assert_eq!(result.head, "");
    assert_eq!(result.partial("fo"), "fo");
    assert_eq!(result.tail, "");
    let pairs: Vec<_> = result
        .candidates
        .iter()
        .map(|c| (c.display.as_str(), c.suffix.as_str()))
        .collect();
    assert_eq!(pairs, [("foo", "o"), ("foobar", "obar")]);
    assert_eq!(result.complete_now(), None);
}

#[test]
fn single_candidate_completes_now() {
    let globals = namespace(&["foobar", "bar"]);
    let result = complete("foob", 4, &globals, &Namespace::new());
    assert_eq!(result.complete_now(), Some("ar"));
}

#[test]
fn shared_names_appear_once() {
    let globals = namespace(&["print", "printer"]);
    let builtins = namespace(&["print", "pow", "len"]);
    assert_eq!(displays("p", &globals, &builtins), ["pow", "print", "printer"]);
}

#[test]
fn builtins_alone() {
    let builtins = namespace(&["len", "list"]);
    assert_eq!(displays("l", &Namespace::new(), &builtins), ["len", "list"]);
}

#[test]
fn no_match() {
    let globals = namespace(&["foo"]);
    let result = complete("zz", 2, &globals, &Namespace::new());
    assert!(result.candidates.is_empty());
    assert_eq!(result.complete_now(), None);
}

// =============================================================================
// Word Boundaries
// =============================================================================

#[test]
fn word_starts_after_last_space() {
    let globals = namespace(&["value", "values"]);
    let result = complete("x = valu", 8, &globals, &Namespace::new());
    assert_eq!(result.head, "x = ");
    assert_eq!(result.partial("x = valu"), "valu");
    assert_eq!(result.candidates.len(), 2);
}

#[test]
fn text_after_cursor_is_the_tail() {
    let globals = namespace(&["alpha"]);
    let line = "print al)";
    let result = complete(line, 8, &globals, &Namespace::new());
    assert_eq!(result.head, "print ");
    assert_eq!(result.tail, ")");
    assert_eq!(result.complete_now(), Some("pha"));
}

#[test]
fn punctuation_is_part_of_the_word() {
    // Only spaces separate words, so `(pri` matches nothing.
    let builtins = namespace(&["print"]);
    assert!(displays("x=(pri", &Namespace::new(), &builtins).is_empty());
    assert_eq!(displays("x= pri", &Namespace::new(), &builtins), ["print"]);
}

#[test]
fn empty_word_lists_everything() {
    let globals = namespace(&["b", "a"]);
    let builtins = namespace(&["c"]);
    assert_eq!(displays("x ", &globals, &builtins), ["a", "b", "c"]);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn partial_plus_suffix_is_display(
        names in prop::collection::vec("[a-c_][a-c0-9_]{0,4}", 0..20),
        head in "[a-z =(]{0,6}",
        partial in "[a-c_]{0,3}",
        tail in "[ )]{0,2}",
    ) {
        let globals: Namespace<u8> = names.iter().map(|n| (n.as_str(), 0)).collect();
        let line = format!("{head} {partial}{tail}");
        let cursor = line.len() - tail.len();
        let result = complete(&line, cursor, &globals, &Namespace::new());

        let word = result.partial(&line);
        prop_assert_eq!(word, partial.as_str());
        for candidate in &result.candidates {
            prop_assert_eq!(format!("{word}{}", candidate.suffix), candidate.display.clone());
        }
        let sorted = result.candidates.windows(2).all(|w| w[0].display < w[1].display);
        prop_assert!(sorted);
    }
}
