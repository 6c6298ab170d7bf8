//! The main REPL implementation.

use std::io::{self, Read};

use adder_foundation::{Error, Result};

use crate::config::ReplConfig;
use crate::document::Document;
use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::prompt::{continuation_text, prompt_text};
use crate::session::{Session, Turn};

const BANNER: &str = "Type \"Ctrl-D\" to exit.\n";
const CONFIRM_EXIT: &str = "Do you really want to exit ([y]/n)? ";

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Session state (namespace, counter, output).
    session: Session,

    /// Whether to show the start-up hint.
    show_banner: bool,

    /// Where the exit confirmation byte is read from.
    confirm: Box<dyn Read>,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(config: &ReplConfig) -> Result<Self> {
        let editor = RustylineEditor::new(config)?;
        Ok(Self::with_editor(editor, config))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E, config: &ReplConfig) -> Self {
        Self {
            editor,
            session: Session::new(config),
            show_banner: config.banner(),
            confirm: Box::new(io::stdin()),
        }
    }

    /// Sets the session for this REPL.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Reads the exit confirmation from `input` instead of stdin.
    #[must_use]
    pub fn with_confirmation_input(mut self, input: impl Read + 'static) -> Self {
        self.confirm = Box::new(input);
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub const fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Runs the REPL loop until the user confirms exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails, or if the exit confirmation
    /// cannot be read.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.emit(BANNER)?;
        }

        loop {
            match self.read_input()? {
                Some(input) => self.run_turn(&input)?,
                None => {
                    if self.confirm_exit()? {
                        break;
                    }
                }
            }
        }

        tracing::debug!(inputs = self.session.input_count() - 1, "session ended");
        Ok(())
    }

    /// Submits one input and prints its outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the outcome cannot be written.
    pub fn run_turn(&mut self, input: &str) -> Result<()> {
        match self.session.submit(input) {
            Turn::Skipped => return Ok(()),
            Turn::Completed(_) => {}
            Turn::CompileFailed(error) => self.emit(&format!("compile error: {error}\n"))?,
            Turn::Failed(error) => self.emit(&format!("{}\n", error.traceback()))?,
        }
        self.emit("\n")
    }

    /// Reads one (possibly multi-line) input.
    ///
    /// Returns `None` when the user asked to leave.
    fn read_input(&mut self) -> Result<Option<String>> {
        self.editor.set_namespaces(
            self.session.globals().snapshot(),
            self.session.builtins().snapshot(),
        );

        let count = self.session.input_count();
        let mut input = String::new();
        let mut first_line = true;

        loop {
            let result = if first_line {
                self.editor.read_line(&prompt_text(count))?
            } else {
                self.editor.read_continuation(&continuation_text(count))?
            };

            match result {
                ReadResult::Line(line) => {
                    if !first_line {
                        input.push('\n');
                    }
                    input.push_str(&line);

                    // Editors that hand back one physical line at a time.
                    if !self.session.should_continue(&Document::at_end(&input)) {
                        return Ok(Some(input));
                    }
                    first_line = false;
                }
                ReadResult::Interrupted => {
                    tracing::debug!("input discarded");
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => return Ok(None),
            }
        }
    }

    /// Asks whether to leave; true means yes.
    fn confirm_exit(&mut self) -> Result<bool> {
        self.emit(CONFIRM_EXIT)?;

        let mut answer = [0u8; 1];
        match self.confirm.read_exact(&mut answer) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(Error::io("EOF")),
            Err(e) => return Err(e.into()),
        }
        Ok(answer[0] != b'n')
    }

    fn emit(&self, text: &str) -> Result<()> {
        self.session
            .output()
            .write(text)
            .map_err(|e| Error::io(e.to_string()))
    }
}
