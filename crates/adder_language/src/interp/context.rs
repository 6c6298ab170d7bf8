//! Interpreter context and modules.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use adder_foundation::Namespace;

use super::{Interpreter, builtins};
use crate::compiler::Code;
use crate::exception::{ExceptionType, RuntimeError};
use crate::value::{Exec, Value};

/// Default maximum call depth.
pub const DEFAULT_RECURSION_LIMIT: usize = 200;

/// Where program output (`print`, interactive echo) goes.
#[derive(Clone, Debug, Default)]
pub enum Output {
    /// The process's standard output.
    #[default]
    Stdout,
    /// An in-memory buffer shared with the caller.
    Buffer(Rc<RefCell<String>>),
}

impl Output {
    /// Creates an empty in-memory buffer.
    #[must_use]
    pub fn buffer() -> Self {
        Self::Buffer(Rc::new(RefCell::new(String::new())))
    }

    /// Takes everything written to a buffer so far; empty for stdout.
    #[must_use]
    pub fn take(&self) -> String {
        match self {
            Self::Stdout => String::new(),
            Self::Buffer(buffer) => std::mem::take(&mut *buffer.borrow_mut()),
        }
    }

    /// Writes text, flushing stdout so prompts and output interleave.
    ///
    /// # Errors
    ///
    /// Returns a `RuntimeError` exception if stdout cannot be written.
    pub fn write(&self, text: &str) -> Exec<()> {
        match self {
            Self::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|e| {
                        RuntimeError::new(ExceptionType::RuntimeError, format!("write failed: {e}"))
                    })
            }
            Self::Buffer(buffer) => {
                buffer.borrow_mut().push_str(text);
                Ok(())
            }
        }
    }
}

/// Options for creating a [`Context`].
#[derive(Clone, Debug)]
pub struct ContextOptions {
    /// Maximum nesting of user function calls before `RecursionError`.
    pub recursion_limit: usize,
    /// Output sink.
    pub output: Output,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            output: Output::Stdout,
        }
    }
}

/// A module: a name and its global namespace.
#[derive(Clone, Debug)]
pub struct Module {
    /// Module name.
    pub name: String,
    /// Global variables.
    pub globals: Namespace<Value>,
}

/// Shared interpreter state: builtins and output.
pub struct Context {
    builtins: Namespace<Value>,
    options: ContextOptions,
}

impl Context {
    /// Creates a context with the builtin namespace populated.
    #[must_use]
    pub fn new(options: ContextOptions) -> Self {
        Self {
            builtins: builtins::namespace(),
            options,
        }
    }

    /// Returns the builtin namespace.
    #[must_use]
    pub const fn builtins(&self) -> &Namespace<Value> {
        &self.builtins
    }

    /// Returns the output sink.
    #[must_use]
    pub const fn output(&self) -> &Output {
        &self.options.output
    }

    /// Returns the maximum call depth.
    #[must_use]
    pub const fn recursion_limit(&self) -> usize {
        self.options.recursion_limit
    }

    /// Creates a module with fresh globals.
    #[must_use]
    pub fn module_init(&self, name: &str) -> Module {
        let mut globals = Namespace::new();
        globals.insert("__name__", Value::str(name));
        Module {
            name: name.to_string(),
            globals,
        }
    }

    /// Runs compiled code against `globals`.
    ///
    /// Returns the value of the last echoed expression statement for
    /// interactive code, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns the uncaught exception with its traceback.
    pub fn run_code(&self, code: &Code, globals: &mut Namespace<Value>) -> Exec<Value> {
        let mut interp = Interpreter::new(self, globals, &code.filename, code.interactive);
        let result = interp.run_module(&code.body);
        match &result {
            Ok(_) => tracing::trace!(filename = %code.filename, "code completed"),
            Err(err) => tracing::debug!(filename = %code.filename, error = %err, "code raised"),
        }
        result
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextOptions::default())
    }
}
