//! Buffer snapshots handed from the line editor to the REPL core.

/// Immutable snapshot of the edit buffer and its cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    text: String,
    cursor: usize,
}

impl Document {
    /// Creates a snapshot with the cursor at byte offset `cursor`.
    ///
    /// The cursor is clamped to the text and moved back to a char boundary.
    #[must_use]
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        let text = text.into();
        let cursor = floor_char_boundary(&text, cursor);
        Self { text, cursor }
    }

    /// Creates a snapshot with the cursor after the last character.
    #[must_use]
    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    /// Returns the full buffer text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the cursor byte offset.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns true when no line break follows the cursor.
    #[must_use]
    pub fn on_last_line(&self) -> bool {
        !self.text[self.cursor..].contains('\n')
    }

    /// Returns the text between the start of the cursor's line and the cursor.
    #[must_use]
    pub fn current_line_before_cursor(&self) -> &str {
        let before = &self.text[..self.cursor];
        before.rfind('\n').map_or(before, |i| &before[i + 1..])
    }
}

/// Largest char boundary of `text` that is not past `offset`.
pub(crate) fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
