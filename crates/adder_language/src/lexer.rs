//! Lexer for the Adder language.
//!
//! The lexer converts source text into a lossless stream of tokens: the
//! literals of all tokens, concatenated, reproduce the source exactly. On top
//! of the raw lexemes it tracks bracket depth and indentation so that it can
//! emit the `Newline`, `Indent` and `Dedent` tokens the parser relies on.
//!
//! Lexical problems never abort tokenization. They produce an `Error` token
//! plus a [`Diagnostic`] describing what went wrong.

use std::collections::VecDeque;

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Operators and delimiters, longest first so the first match wins.
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "**", "//", "==", "!=", "<=", ">=", "<<", ">>", "+=", "-=",
    "*=", "/=", "%=", "&=", "|=", "^=", "@=", "->", ":=", "+", "-", "*", "/", "%", "<", ">", "=",
    "&", "|", "^", "~", "(", ")", "[", "]", "{", "}", ",", ":", ".", ";", "@",
];

/// Message for a triple-quoted string that runs off the end of the input.
pub const EOF_IN_TRIPLE_QUOTED: &str = "EOF while scanning triple-quoted string literal";

/// Message for a single-quoted string that runs off the end of its line.
pub const EOL_IN_STRING: &str = "EOL while scanning string literal";

/// Message for a dedent that lands between two indentation levels.
pub const INCONSISTENT_DEDENT: &str = "unindent does not match any outer indentation level";

/// Tab stops are every eight columns.
const TAB_SIZE: usize = 8;

/// A lexical problem attached to an `Error` token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Location of the offending token.
    pub span: Span,
    /// Human-readable description.
    pub message: String,
}

/// Lexer for Adder source code.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
    /// Stack of indentation widths; the bottom is always 0.
    indents: Vec<usize>,
    /// Open bracket nesting depth.
    depth: usize,
    /// True when the next token starts a physical line outside brackets.
    at_line_start: bool,
    /// True once the current logical line has produced a significant token.
    line_has_content: bool,
    /// Tokens produced ahead of time (dedents, end-of-input bookkeeping).
    pending: VecDeque<Token>,
    /// True when a backslash continuation runs into the end of input.
    dangling_continuation: bool,
    /// True once the end-of-input sequence has been queued.
    finished: bool,
    /// True once `Eof` has been handed out.
    exhausted: bool,
    /// Problems found so far.
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
            indents: vec![0],
            depth: 0,
            at_line_start: true,
            line_has_content: false,
            pending: VecDeque::new(),
            dangling_continuation: false,
            finished: false,
            exhausted: false,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenizes all source and returns the tokens, ending with `Eof`.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        Self::tokenize(source).0
    }

    /// Tokenizes all source, returning the tokens and any diagnostics.
    #[must_use]
    pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        (tokens, lexer.diagnostics)
    }

    /// Returns the diagnostics collected so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns the next token from the source.
    ///
    /// After the end of input this keeps returning `Eof`.
    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.pending.pop_front() {
            return token;
        }
        if self.finished {
            self.exhausted = true;
            return self.empty_token(TokenKind::Eof);
        }
        if self.at_line_start && self.depth == 0 {
            if let Some(token) = self.scan_line_start() {
                return token;
            }
        }

        let Some(c) = self.peek_char() else {
            self.finish();
            return self.next_token();
        };

        let start = self.mark();
        let reported = self.diagnostics.len();
        let kind = match c {
            '\n' => self.scan_newline(),
            '\r' if self.peek_char_n(1) == Some('\n') => self.scan_newline(),
            ' ' | '\t' | '\x0c' | '\r' => {
                self.advance_while(|c| matches!(c, ' ' | '\t' | '\x0c' | '\r'));
                TokenKind::Whitespace
            }
            '\\' => self.scan_continuation(),
            '#' => {
                self.advance_while(|c| c != '\n' && c != '\r');
                TokenKind::Comment
            }
            c if c.is_ascii_digit() => self.scan_number(),
            '.' if self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            c if is_name_start(c) => self.scan_name_or_string(),
            '"' | '\'' => self.scan_string(),
            _ => self.scan_operator(),
        };

        if !matches!(
            kind,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::Newline
        ) {
            self.line_has_content = true;
        }
        let token = self.token_from(kind, start);
        for diagnostic in &mut self.diagnostics[reported..] {
            diagnostic.span = token.span;
        }
        token
    }

    // =========================================================================
    // Line structure
    // =========================================================================

    /// Handles indentation at the start of a physical line.
    ///
    /// Returns `None` when the line starts with no indentation at the current
    /// level, letting the caller scan the first token normally.
    fn scan_line_start(&mut self) -> Option<Token> {
        self.at_line_start = false;
        let start = self.mark();
        let width = self.measure_indentation();
        let blank = matches!(self.peek_char(), None | Some('\n' | '\r' | '#'));

        if blank {
            // Blank and comment-only lines never change the indentation.
            return (self.position > start.0).then(|| self.token_from(TokenKind::Whitespace, start));
        }

        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            return Some(self.token_from(TokenKind::Indent, start));
        }

        if width < current {
            while self.indents.last().is_some_and(|&top| top > width) {
                self.indents.pop();
                let span = Span::empty_at(start.0, start.1, start.2);
                self.pending.push_back(Token::new(TokenKind::Dedent, "", span));
            }
            if self.indents.last().copied().unwrap_or(0) != width {
                let token = self.token_from(TokenKind::Error, start);
                self.report(token.span, INCONSISTENT_DEDENT);
                self.pending.push_back(token);
            } else if self.position > start.0 {
                let token = self.token_from(TokenKind::Whitespace, start);
                self.pending.push_back(token);
            }
            return self.pending.pop_front();
        }

        (self.position > start.0).then(|| self.token_from(TokenKind::Whitespace, start))
    }

    /// Consumes leading whitespace and returns its width in columns.
    fn measure_indentation(&mut self) -> usize {
        let mut width = 0;
        while let Some(c) = self.peek_char() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / TAB_SIZE + 1) * TAB_SIZE,
                '\x0c' => width = 0,
                _ => break,
            }
            self.advance();
        }
        width
    }

    /// Scans a line break, deciding whether it ends a logical line.
    fn scan_newline(&mut self) -> TokenKind {
        if self.peek_char() == Some('\r') {
            self.advance();
        }
        self.advance();
        if self.depth > 0 {
            return TokenKind::Whitespace;
        }
        self.at_line_start = true;
        if std::mem::take(&mut self.line_has_content) {
            TokenKind::Newline
        } else {
            TokenKind::Whitespace
        }
    }

    /// Scans a backslash line continuation.
    ///
    /// A continuation with nothing but blanks after it leaves the logical line
    /// open, so the end-of-input sequence omits its closing `Newline`.
    fn scan_continuation(&mut self) -> TokenKind {
        self.advance();
        match self.peek_char() {
            Some('\n') => {
                self.advance();
                self.note_dangling_continuation();
                TokenKind::Whitespace
            }
            Some('\r') if self.peek_char_n(1) == Some('\n') => {
                self.advance();
                self.advance();
                self.note_dangling_continuation();
                TokenKind::Whitespace
            }
            None => {
                self.dangling_continuation = true;
                TokenKind::Whitespace
            }
            _ => {
                self.pending_error("unexpected character after line continuation character");
                TokenKind::Error
            }
        }
    }

    fn note_dangling_continuation(&mut self) {
        let rest = &self.source[self.position..];
        if rest.trim_start_matches([' ', '\t', '\x0c']).is_empty() {
            self.dangling_continuation = true;
        }
    }

    /// Queues the end-of-input sequence: a closing `Newline` if the last
    /// logical line was not terminated, one `Dedent` per open block, `Eof`.
    ///
    /// Inside open brackets, or after a trailing backslash continuation, only
    /// `Eof` is produced, so the parser reports an unexpected end of input.
    fn finish(&mut self) {
        self.finished = true;
        if self.depth > 0 || self.dangling_continuation {
            return;
        }
        if self.line_has_content {
            self.line_has_content = false;
            let newline = self.empty_token(TokenKind::Newline);
            self.pending.push_back(newline);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            let dedent = self.empty_token(TokenKind::Dedent);
            self.pending.push_back(dedent);
        }
    }

    // =========================================================================
    // Lexemes
    // =========================================================================

    /// Scans an identifier, or a string literal with a prefix like `r"..."`.
    fn scan_name_or_string(&mut self) -> TokenKind {
        let rest = &self.source[self.position..];
        let prefix_len = rest
            .chars()
            .take_while(|c| matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U'))
            .take(2)
            .count();
        if prefix_len > 0 && matches!(rest[prefix_len..].chars().next(), Some('"' | '\'')) {
            for _ in 0..prefix_len {
                self.advance();
            }
            return self.scan_string();
        }
        self.advance_while(is_name_continue);
        TokenKind::Name
    }

    /// Scans a string literal starting at the opening quote.
    fn scan_string(&mut self) -> TokenKind {
        let Some(quote) = self.peek_char() else {
            return TokenKind::Error;
        };
        let triple = self.peek_char_n(1) == Some(quote) && self.peek_char_n(2) == Some(quote);
        let quote_len = if triple { 3 } else { 1 };
        for _ in 0..quote_len {
            self.advance();
        }

        loop {
            match self.peek_char() {
                None => {
                    self.pending_error(if triple {
                        EOF_IN_TRIPLE_QUOTED
                    } else {
                        EOL_IN_STRING
                    });
                    return TokenKind::Error;
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('\n') if !triple => {
                    self.pending_error(EOL_IN_STRING);
                    return TokenKind::Error;
                }
                Some(c) if c == quote => {
                    if !triple {
                        self.advance();
                        return TokenKind::String;
                    }
                    if self.peek_char_n(1) == Some(quote) && self.peek_char_n(2) == Some(quote) {
                        self.advance();
                        self.advance();
                        self.advance();
                        return TokenKind::String;
                    }
                    self.advance();
                }
                Some(_) => self.advance(),
            }
        }
    }

    /// Scans an integer or float literal.
    fn scan_number(&mut self) -> TokenKind {
        if self.peek_char() == Some('0')
            && matches!(
                self.peek_char_n(1),
                Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')
            )
        {
            self.advance();
            self.advance();
            self.advance_while(|c| c.is_ascii_hexdigit() || c == '_');
            return TokenKind::Number;
        }

        self.advance_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek_char() == Some('.') {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_char_n(1), Some('+' | '-')));
            if self.peek_char_n(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..=sign {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_digit() || c == '_');
            }
        }
        TokenKind::Number
    }

    /// Scans an operator or delimiter, or reports an invalid character.
    fn scan_operator(&mut self) -> TokenKind {
        let rest = &self.source[self.position..];
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            match *op {
                "(" | "[" | "{" => self.depth += 1,
                ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
            for _ in 0..op.len() {
                self.advance();
            }
            return TokenKind::Operator;
        }

        let c = self.peek_char().unwrap_or('\0');
        self.advance();
        self.pending_error(&format!(
            "invalid character '{c}' (U+{:04X})",
            u32::from(c)
        ));
        TokenKind::Error
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    /// Peeks `n` characters ahead.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.source[self.position..].chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Advances while `pred` holds for the next character.
    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&pred) {
            self.advance();
        }
    }

    /// Captures the current position as `(offset, line, column)`.
    const fn mark(&self) -> (usize, u32, u32) {
        (self.position, self.line, self.column)
    }

    /// Builds a token spanning from `start` to the current position.
    fn token_from(&self, kind: TokenKind, start: (usize, u32, u32)) -> Token {
        let (offset, line, column) = start;
        Token::new(
            kind,
            &self.source[offset..self.position],
            Span::new(offset, self.position, line, column),
        )
    }

    /// Builds an empty token at the current position.
    fn empty_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            "",
            Span::empty_at(self.position, self.line, self.column),
        )
    }

    /// Records a diagnostic for the token currently being scanned.
    ///
    /// [`Lexer::next_token`] fills in the span once the token ends.
    fn pending_error(&mut self, message: &str) {
        self.diagnostics.push(Diagnostic {
            span: Span::default(),
            message: message.to_string(),
        });
    }

    /// Records a diagnostic with a known span.
    fn report(&mut self, span: Span, message: &str) {
        self.diagnostics.push(Diagnostic {
            span,
            message: message.to_string(),
        });
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields tokens up to and including the first `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }
        Some(self.next_token())
    }
}

/// Returns true if `c` can start an identifier.
fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Returns true if `c` can continue an identifier.
fn is_name_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
