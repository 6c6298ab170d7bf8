//! Source location tracking.
//!
//! Every token and AST node records where it came from so that syntax errors
//! and tracebacks can point at the offending line.

/// A span of source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
    /// 1-based line number where this span starts.
    pub line: u32,
    /// 1-based column (in characters) where this span starts.
    pub column: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Creates an empty span at the given position.
    #[must_use]
    pub const fn empty_at(offset: usize, line: u32, column: u32) -> Self {
        Self::new(offset, offset, line, column)
    }

    /// Creates a span covering this span through the end of `other`.
    #[must_use]
    pub const fn join(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }

    /// Returns the length of this span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span covers no text.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the text this span covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_keeps_start_position() {
        let a = Span::new(0, 2, 1, 1);
        let b = Span::new(6, 9, 2, 3);
        let joined = a.join(b);
        assert_eq!((joined.start, joined.end), (0, 9));
        assert_eq!((joined.line, joined.column), (1, 1));
    }

    #[test]
    fn empty_span() {
        let span = Span::empty_at(4, 1, 5);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn span_text() {
        let source = "x = 42";
        assert_eq!(Span::new(4, 6, 1, 5).text(source), "42");
    }
}
