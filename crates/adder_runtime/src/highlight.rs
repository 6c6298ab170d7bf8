//! Syntax highlighting for the REPL.
//!
//! Highlighting paints classified tokens back to back with 24-bit ANSI
//! colours taken from a [`Schema`]. Because the lexer keeps every byte of the
//! buffer, the painted text always has the same visible characters as the
//! input.

use std::borrow::Cow;
use std::collections::HashMap;

use adder_language::{Token, TokenKind};

use crate::classify::classify;

const RESET: &str = "\x1b[0m";

/// A 24-bit colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Foreground and background colour of a token kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Style {
    /// Text colour.
    pub fg: Option<Rgb>,
    /// Background colour.
    pub bg: Option<Rgb>,
}

impl Style {
    /// A style with only a text colour.
    #[must_use]
    pub const fn fg(color: Rgb) -> Self {
        Self {
            fg: Some(color),
            bg: None,
        }
    }

    /// Adds a background colour.
    #[must_use]
    pub const fn on(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    /// Returns the escape sequence that switches to this style.
    #[must_use]
    pub fn escape(&self) -> String {
        let mut params = Vec::new();
        if let Some(Rgb(r, g, b)) = self.fg {
            params.push(format!("38;2;{r};{g};{b}"));
        }
        if let Some(Rgb(r, g, b)) = self.bg {
            params.push(format!("48;2;{r};{g};{b}"));
        }
        format!("\x1b[{}m", params.join(";"))
    }

    /// Wraps `text` in this style.
    #[must_use]
    pub fn paint(&self, text: &str) -> String {
        if self.fg.is_none() && self.bg.is_none() {
            return text.to_string();
        }
        format!("{}{text}{RESET}", self.escape())
    }
}

/// Styles per token kind. Kinds without a style are printed as they are.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    styles: HashMap<TokenKind, Style>,
}

impl Default for Schema {
    fn default() -> Self {
        let prompt = Style::fg(Rgb(0x00, 0x44, 0x00));
        Self::empty()
            .with(TokenKind::Keyword, Style::fg(Rgb(0xee, 0x00, 0xee)))
            .with(TokenKind::Operator, Style::fg(Rgb(0xaa, 0x66, 0x66)))
            .with(TokenKind::Number, Style::fg(Rgb(0x2a, 0xac, 0xb8)))
            .with(TokenKind::String, Style::fg(Rgb(0x6a, 0xab, 0x73)))
            .with(
                TokenKind::Error,
                Style::fg(Rgb(0x00, 0x00, 0x00)).on(Rgb(0xff, 0x88, 0x88)),
            )
            .with(TokenKind::Comment, Style::fg(Rgb(0x00, 0x00, 0xdd)))
            .with(TokenKind::Prompt, prompt)
            .with(TokenKind::Continuation, prompt)
    }
}

impl Schema {
    /// A schema that styles nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            styles: HashMap::new(),
        }
    }

    /// Sets the style of a token kind.
    #[must_use]
    pub fn with(mut self, kind: TokenKind, style: Style) -> Self {
        self.styles.insert(kind, style);
        self
    }

    /// Returns the style of a token kind.
    #[must_use]
    pub fn style(&self, kind: TokenKind) -> Option<&Style> {
        self.styles.get(&kind)
    }

    /// Paints tokens back to back.
    #[must_use]
    pub fn render(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for token in tokens {
            match self.style(token.kind) {
                Some(style) if !token.literal.is_empty() => out.push_str(&style.paint(&token.literal)),
                _ => out.push_str(&token.literal),
            }
        }
        out
    }
}

/// Highlighter for buffers and prompts; a no-op when colour is off.
#[derive(Clone, Debug)]
pub struct AdderHighlighter {
    schema: Option<Schema>,
}

impl AdderHighlighter {
    /// Creates a highlighter with the default schema, or a disabled one.
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self {
            schema: color.then(Schema::default),
        }
    }

    /// Creates a highlighter with a custom schema.
    #[must_use]
    pub const fn with_schema(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    /// Returns true if highlighting produces escapes.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.schema.is_some()
    }

    /// Highlights a buffer.
    #[must_use]
    pub fn highlight<'l>(&self, text: &'l str) -> Cow<'l, str> {
        match &self.schema {
            Some(schema) if !text.is_empty() => Cow::Owned(schema.render(&classify(text))),
            _ => Cow::Borrowed(text),
        }
    }

    /// Highlights prompt text as a single token of `kind`.
    #[must_use]
    pub fn prompt<'p>(&self, text: &'p str, kind: TokenKind) -> Cow<'p, str> {
        match self.schema.as_ref().and_then(|s| s.style(kind)) {
            Some(style) => Cow::Owned(style.paint(text)),
            None => Cow::Borrowed(text),
        }
    }
}
