//! Reserved words.
//!
//! The lexer reports reserved words as ordinary names; the parser and the
//! REPL's highlighter consult this table to tell them apart.

/// Every reserved word of the language.
pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Reserved words the compiler recognises but does not support.
pub(crate) const UNSUPPORTED: &[&str] = &["async", "await", "class", "nonlocal", "with", "yield"];

/// Returns true if `name` is a reserved word.
#[must_use]
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.binary_search(&name).is_ok()
}
