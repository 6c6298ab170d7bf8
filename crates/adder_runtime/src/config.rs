//! REPL configuration.

use adder_language::interp::DEFAULT_RECURSION_LIMIT;

/// Program identifier used in tracebacks and compile errors.
pub const DEFAULT_PROGRAM: &str = "<stdin>";

/// Columns added after a line ending in `:`.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Settings for a [`Repl`](crate::Repl) and its [`Session`](crate::Session).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplConfig {
    program: String,
    color: bool,
    auto_indent: bool,
    indent_width: usize,
    banner: bool,
    recursion_limit: usize,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            color: true,
            auto_indent: true,
            indent_width: DEFAULT_INDENT_WIDTH,
            banner: true,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl ReplConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the default configuration, honouring `NO_COLOR`.
    #[must_use]
    pub fn from_env() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::default().with_color(!no_color)
    }

    /// Sets the program identifier.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Turns colour output on or off.
    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Turns auto-indent on continuation lines on or off.
    #[must_use]
    pub const fn with_auto_indent(mut self, auto_indent: bool) -> Self {
        self.auto_indent = auto_indent;
        self
    }

    /// Sets the indent unit added after a block header.
    #[must_use]
    pub const fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Disables the start-up hint.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.banner = false;
        self
    }

    /// Sets the maximum call depth of executed code.
    #[must_use]
    pub const fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Returns the program identifier.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns true if output is coloured.
    #[must_use]
    pub const fn color(&self) -> bool {
        self.color
    }

    /// Returns the indent unit, or `None` if auto-indent is off.
    #[must_use]
    pub const fn auto_indent(&self) -> Option<usize> {
        if self.auto_indent {
            Some(self.indent_width)
        } else {
            None
        }
    }

    /// Returns true if the start-up hint is printed.
    #[must_use]
    pub const fn banner(&self) -> bool {
        self.banner
    }

    /// Returns the maximum call depth.
    #[must_use]
    pub const fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReplConfig::new();
        assert_eq!(config.program(), "<stdin>");
        assert!(config.color());
        assert_eq!(config.auto_indent(), Some(4));
        assert!(config.banner());
        assert_eq!(config.recursion_limit(), DEFAULT_RECURSION_LIMIT);
    }

    #[test]
    fn builder() {
        let config = ReplConfig::new()
            .with_program("<test>")
            .with_color(false)
            .with_indent_width(2)
            .without_banner()
            .with_recursion_limit(50);
        assert_eq!(config.program(), "<test>");
        assert!(!config.color());
        assert_eq!(config.auto_indent(), Some(2));
        assert!(!config.banner());
        assert_eq!(config.recursion_limit(), 50);
        assert_eq!(config.with_auto_indent(false).auto_indent(), None);
    }
}
