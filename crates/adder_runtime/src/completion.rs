//! Name completion over the live namespaces.

use std::collections::HashSet;

use adder_foundation::Namespace;

use crate::document::floor_char_boundary;

/// One completion candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    /// The full name, as shown in a menu.
    pub display: String,
    /// The text to insert at the cursor.
    pub suffix: String,
}

/// The result of a completion request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Completions {
    /// Text before the word being completed, up to and including the last space.
    pub head: String,
    /// Candidates in byte order.
    pub candidates: Vec<Completion>,
    /// Text after the cursor.
    pub tail: String,
}

impl Completions {
    /// Returns the suffix to insert right away when there is exactly one
    /// candidate.
    #[must_use]
    pub fn complete_now(&self) -> Option<&str> {
        match self.candidates.as_slice() {
            [only] => Some(&only.suffix),
            _ => None,
        }
    }

    /// Returns the word being completed.
    #[must_use]
    pub fn partial<'a>(&self, line: &'a str) -> &'a str {
        let end = line.len() - self.tail.len();
        &line[self.head.len()..end]
    }
}

/// Completes the word before `cursor` against `globals`, then `builtins`.
///
/// The word is whatever follows the last space before the cursor. Names are
/// matched by plain prefix comparison, so keys that are not identifiers still
/// match.
#[must_use]
pub fn complete<V: Clone>(
    line: &str,
    cursor: usize,
    globals: &Namespace<V>,
    builtins: &Namespace<V>,
) -> Completions {
    let cursor = floor_char_boundary(line, cursor);
    let (before, tail) = line.split_at(cursor);
    let (head, partial) = match before.rfind(' ') {
        Some(space) => before.split_at(space + 1),
        None => ("", before),
    };

    let mut seen = HashSet::new();
    let mut names: Vec<&str> = globals
        .names()
        .chain(builtins.names())
        .filter(|name| name.starts_with(partial))
        .filter(|name| seen.insert(*name))
        .collect();
    names.sort_unstable();

    let remain = line.len() - head.len() - tail.len();
    let candidates = names
        .into_iter()
        .map(|name| Completion {
            display: name.to_string(),
            suffix: name[remain..].to_string(),
        })
        .collect::<Vec<_>>();

    tracing::trace!(partial, count = candidates.len(), "completions");
    Completions {
        head: head.to_string(),
        candidates,
        tail: tail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespace(names: &[&str]) -> Namespace<i32> {
        names.iter().map(|n| (*n, 0)).collect()
    }

    #[test]
    fn prefix_matches_in_order() {
        let globals = namespace(&["foobar", "foo", "bar"]);
        let result = complete("fo", 2, &globals, &Namespace::new());
        assert_eq!(result.head, "");
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
        let globals = namespace(&["foobar", "baz"]);
        let result = complete("foob", 4, &globals, &Namespace::new());
        assert_eq!(result.complete_now(), Some("ar"));
    }

    #[test]
    fn word_after_last_space() {
        let globals = namespace(&["value"]);
        let result = complete("x = va", 6, &globals, &Namespace::new());
        assert_eq!(result.head, "x = ");
        assert_eq!(result.partial("x = va"), "va");
        assert_eq!(result.complete_now(), Some("lue"));
    }

    #[test]
    fn tail_is_preserved() {
        let globals = namespace(&["length"]);
        let result = complete("len)", 3, &globals, &Namespace::new());
        assert_eq!(result.tail, ")");
        assert_eq!(result.complete_now(), Some("gth"));
    }

    #[test]
    fn duplicates_across_namespaces_appear_once() {
        let globals = namespace(&["print"]);
        let builtins = namespace(&["print", "pow"]);
        let result = complete("p", 1, &globals, &builtins);
        let names: Vec<_> = result.candidates.iter().map(|c| c.display.as_str()).collect();
        assert_eq!(names, ["pow", "print"]);
    }

    #[test]
    fn empty_partial_matches_everything() {
        let globals = namespace(&["b", "a"]);
        let builtins = namespace(&["c"]);
        let result = complete("x ", 2, &globals, &builtins);
        assert_eq!(result.candidates.len(), 3);
        assert!(result.candidates.iter().all(|c| c.suffix == c.display));
    }

    #[test]
    fn non_identifier_keys_match() {
        let globals = namespace(&["a-b", "a.c"]);
        let result = complete("a-", 2, &globals, &Namespace::new());
        assert_eq!(result.complete_now(), Some("b"));
    }

    #[test]
    fn cursor_inside_multibyte_char_is_clamped() {
        let globals = namespace(&["é1"]);
        let result = complete("é", 1, &globals, &Namespace::new());
        assert_eq!(result.tail, "é");
        assert_eq!(result.candidates.len(), 1);
    }
}
