//! Session state for the REPL.
//!
//! A [`Session`] owns everything a prompt needs across turns: the interpreter
//! context (builtins and output), the `__main__` module whose globals persist
//! between turns, and the input counter shown in the prompt. Detection and
//! completion take the session explicitly instead of reaching for shared
//! state.

use adder_foundation::Namespace;
use adder_language::{
    CompileMode, Context, ContextOptions, Module, Output, RuntimeError, SyntaxError, Value,
    compile,
};

use crate::completion::{Completions, complete};
use crate::config::ReplConfig;
use crate::continuation::should_continue;
use crate::document::Document;

/// Outcome of submitting one line.
#[derive(Debug)]
pub enum Turn {
    /// The line was empty; nothing ran.
    Skipped,
    /// The line did not compile; the namespace is untouched.
    CompileFailed(SyntaxError),
    /// Execution raised an exception.
    Failed(RuntimeError),
    /// Execution finished; the value of the last echoed expression, or `None`.
    Completed(Value),
}

impl Turn {
    /// Returns true if code ran to completion.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Session state for an interactive REPL session.
pub struct Session {
    context: Context,
    module: Module,
    program: String,
    input_count: usize,
}

impl Session {
    /// Creates a session that writes program output to stdout.
    #[must_use]
    pub fn new(config: &ReplConfig) -> Self {
        Self::with_output(config, Output::Stdout)
    }

    /// Creates a session writing program output to `output`.
    #[must_use]
    pub fn with_output(config: &ReplConfig, output: Output) -> Self {
        let context = Context::new(ContextOptions {
            recursion_limit: config.recursion_limit(),
            output,
        });
        let module = context.module_init("__main__");
        Self {
            context,
            module,
            program: config.program().to_string(),
            input_count: 1,
        }
    }

    /// Compiles and runs one submitted line against the module globals.
    pub fn submit(&mut self, line: &str) -> Turn {
        if line.is_empty() {
            return Turn::Skipped;
        }
        self.input_count += 1;

        let source = format!("{line}\n");
        let code = match compile(&source, &self.program, CompileMode::Single, true) {
            Ok(code) => code,
            Err(error) => {
                tracing::debug!(input = self.input_count - 1, %error, "compile failed");
                return Turn::CompileFailed(error);
            }
        };
        match self.context.run_code(&code, &mut self.module.globals) {
            Ok(value) => {
                tracing::debug!(input = self.input_count - 1, "turn completed");
                Turn::Completed(value)
            }
            Err(error) => {
                tracing::debug!(input = self.input_count - 1, %error, "turn raised");
                Turn::Failed(error)
            }
        }
    }

    /// Returns true if Enter should continue `document` rather than submit it.
    #[must_use]
    pub fn should_continue(&self, document: &Document) -> bool {
        should_continue(document, &self.program)
    }

    /// Completes the word before `cursor` against the current namespaces.
    #[must_use]
    pub fn complete(&self, line: &str, cursor: usize) -> Completions {
        complete(line, cursor, &self.module.globals, self.context.builtins())
    }

    /// Returns the number shown in the next prompt.
    #[must_use]
    pub const fn input_count(&self) -> usize {
        self.input_count
    }

    /// Returns the program identifier.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the module globals.
    #[must_use]
    pub const fn globals(&self) -> &Namespace<Value> {
        &self.module.globals
    }

    /// Returns the builtin namespace.
    #[must_use]
    pub const fn builtins(&self) -> &Namespace<Value> {
        self.context.builtins()
    }

    /// Returns the output sink shared with executed code.
    #[must_use]
    pub const fn output(&self) -> &Output {
        self.context.output()
    }
}
