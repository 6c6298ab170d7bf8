//! Runtime exceptions.
//!
//! An [`ExceptionObject`] is an exception value as the program sees it; a
//! [`RuntimeError`] wraps one on its way out of the interpreter together with
//! the traceback collected while unwinding.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::value::Value;

/// The built-in exception classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExceptionType {
    /// Root of the hierarchy.
    BaseException,
    /// Base of all ordinary errors.
    Exception,
    /// Base of arithmetic errors.
    ArithmeticError,
    /// Division or modulo by zero.
    ZeroDivisionError,
    /// A result too large to represent.
    OverflowError,
    /// Base of lookup errors.
    LookupError,
    /// Sequence index out of range.
    IndexError,
    /// Mapping key not found.
    KeyError,
    /// Name not defined.
    NameError,
    /// Local read before assignment.
    UnboundLocalError,
    /// Operation applied to the wrong type.
    TypeError,
    /// Right type, wrong value.
    ValueError,
    /// Attribute not found.
    AttributeError,
    /// Failed `assert`.
    AssertionError,
    /// Generic runtime failure.
    RuntimeError,
    /// Call depth exceeded.
    RecursionError,
    /// Module not found.
    ImportError,
    /// Compile failure inside `exec`.
    SyntaxError,
    /// Iterator exhausted.
    StopIteration,
    /// Missing implementation.
    NotImplementedError,
}

impl ExceptionType {
    /// Every exception class, in declaration order.
    pub const ALL: [Self; 20] = [
        Self::BaseException,
        Self::Exception,
        Self::ArithmeticError,
        Self::ZeroDivisionError,
        Self::OverflowError,
        Self::LookupError,
        Self::IndexError,
        Self::KeyError,
        Self::NameError,
        Self::UnboundLocalError,
        Self::TypeError,
        Self::ValueError,
        Self::AttributeError,
        Self::AssertionError,
        Self::RuntimeError,
        Self::RecursionError,
        Self::ImportError,
        Self::SyntaxError,
        Self::StopIteration,
        Self::NotImplementedError,
    ];

    /// Returns the class name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BaseException => "BaseException",
            Self::Exception => "Exception",
            Self::ArithmeticError => "ArithmeticError",
            Self::ZeroDivisionError => "ZeroDivisionError",
            Self::OverflowError => "OverflowError",
            Self::LookupError => "LookupError",
            Self::IndexError => "IndexError",
            Self::KeyError => "KeyError",
            Self::NameError => "NameError",
            Self::UnboundLocalError => "UnboundLocalError",
            Self::TypeError => "TypeError",
            Self::ValueError => "ValueError",
            Self::AttributeError => "AttributeError",
            Self::AssertionError => "AssertionError",
            Self::RuntimeError => "RuntimeError",
            Self::RecursionError => "RecursionError",
            Self::ImportError => "ImportError",
            Self::SyntaxError => "SyntaxError",
            Self::StopIteration => "StopIteration",
            Self::NotImplementedError => "NotImplementedError",
        }
    }

    /// Returns the direct base class, or `None` for the root.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        Some(match self {
            Self::BaseException => return None,
            Self::Exception => Self::BaseException,
            Self::ZeroDivisionError | Self::OverflowError => Self::ArithmeticError,
            Self::IndexError | Self::KeyError => Self::LookupError,
            Self::UnboundLocalError => Self::NameError,
            Self::RecursionError | Self::NotImplementedError => Self::RuntimeError,
            Self::ArithmeticError
            | Self::LookupError
            | Self::NameError
            | Self::TypeError
            | Self::ValueError
            | Self::AttributeError
            | Self::AssertionError
            | Self::RuntimeError
            | Self::ImportError
            | Self::SyntaxError
            | Self::StopIteration => Self::Exception,
        })
    }

    /// Returns true if `self` is `other` or derives from it.
    #[must_use]
    pub fn is_subclass_of(self, other: Self) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == other {
                return true;
            }
            current = class.parent();
        }
        false
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An exception instance.
#[derive(Debug)]
pub struct ExceptionObject {
    /// The exception class.
    pub kind: ExceptionType,
    /// Constructor arguments.
    pub args: Vec<Value>,
}

impl ExceptionObject {
    /// Creates an exception with a single message argument.
    #[must_use]
    pub fn new(kind: ExceptionType, message: impl Into<String>) -> Self {
        let message = message.into();
        let args = if message.is_empty() {
            Vec::new()
        } else {
            vec![Value::str(message)]
        };
        Self { kind, args }
    }

    /// Returns `str(exception)`: the message without the class name.
    #[must_use]
    pub fn message(&self) -> String {
        match self.args.as_slice() {
            [] => String::new(),
            [arg] if self.kind == ExceptionType::KeyError => arg.repr(),
            [arg] => arg.to_str(),
            args => Value::tuple(args.to_vec()).repr(),
        }
    }

    /// Returns `repr(exception)`, e.g. `ValueError('bad')`.
    #[must_use]
    pub fn repr(&self) -> String {
        let args: Vec<String> = self.args.iter().map(Value::repr).collect();
        format!("{}({})", self.kind.name(), args.join(", "))
    }
}

impl fmt::Display for ExceptionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message();
        if message.is_empty() {
            f.write_str(self.kind.name())
        } else {
            write!(f, "{}: {message}", self.kind.name())
        }
    }
}

/// One frame of a traceback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    /// Program identifier.
    pub filename: String,
    /// Line being executed when the exception passed through.
    pub line: u32,
    /// Function name, or `<module>` at top level.
    pub name: String,
}

/// An exception propagating out of running code.
#[derive(Clone, Debug, Error)]
#[error("{exception}")]
pub struct RuntimeError {
    /// The raised exception.
    pub exception: Rc<ExceptionObject>,
    /// Frames unwound so far, outermost first.
    pub traceback: Vec<TraceFrame>,
}

impl RuntimeError {
    /// Raises a new exception of the given class.
    #[must_use]
    pub fn new(kind: ExceptionType, message: impl Into<String>) -> Self {
        Self::raise(Rc::new(ExceptionObject::new(kind, message)))
    }

    /// Raises an existing exception object.
    #[must_use]
    pub const fn raise(exception: Rc<ExceptionObject>) -> Self {
        Self {
            exception,
            traceback: Vec::new(),
        }
    }

    /// Returns the exception class.
    #[must_use]
    pub fn kind(&self) -> ExceptionType {
        self.exception.kind
    }

    /// Creates a `TypeError`.
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionType::TypeError, message)
    }

    /// Creates a `ValueError`.
    #[must_use]
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionType::ValueError, message)
    }

    /// Creates an `IndexError`.
    #[must_use]
    pub fn index_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionType::IndexError, message)
    }

    /// Creates a `KeyError` carrying the missing key.
    #[must_use]
    pub fn key_error(key: Value) -> Self {
        Self::raise(Rc::new(ExceptionObject {
            kind: ExceptionType::KeyError,
            args: vec![key],
        }))
    }

    /// Creates the `NameError` for an undefined name.
    #[must_use]
    pub fn name_error(name: &str) -> Self {
        Self::new(
            ExceptionType::NameError,
            format!("name '{name}' is not defined"),
        )
    }

    /// Creates a `ZeroDivisionError`.
    #[must_use]
    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(ExceptionType::ZeroDivisionError, message)
    }

    /// Creates an `OverflowError` for integer results out of range.
    #[must_use]
    pub fn overflow() -> Self {
        Self::new(
            ExceptionType::OverflowError,
            "integer result too large to represent",
        )
    }

    /// Creates the `AttributeError` for a missing attribute.
    #[must_use]
    pub fn attribute_error(value: &Value, attr: &str) -> Self {
        Self::new(
            ExceptionType::AttributeError,
            format!("'{}' object has no attribute '{attr}'", value.type_name()),
        )
    }

    /// Renders the traceback the way the prompt prints it.
    ///
    /// ```text
    /// Traceback (most recent call last):
    ///   File "<stdin>", line 1, in <module>
    /// ZeroDivisionError: division by zero
    /// ```
    ///
    /// Runs of more than three identical frames are collapsed.
    #[must_use]
    pub fn traceback(&self) -> String {
        let mut out = String::from("Traceback (most recent call last):\n");
        let mut previous: Option<&TraceFrame> = None;
        let mut repeats = 0usize;
        for frame in &self.traceback {
            if previous == Some(frame) {
                repeats += 1;
                if repeats >= REPEAT_CUTOFF {
                    continue;
                }
            } else {
                push_repeats(&mut out, repeats);
                previous = Some(frame);
                repeats = 0;
            }
            out.push_str(&format!(
                "  File \"{}\", line {}, in {}\n",
                frame.filename, frame.line, frame.name
            ));
        }
        push_repeats(&mut out, repeats);
        out.push_str(&self.exception.to_string());
        out
    }
}

/// Identical frames printed before the rest are summarized.
const REPEAT_CUTOFF: usize = 3;

fn push_repeats(out: &mut String, repeats: usize) {
    if repeats >= REPEAT_CUTOFF {
        let more = repeats - REPEAT_CUTOFF + 1;
        let plural = if more == 1 { "" } else { "s" };
        out.push_str(&format!("  [Previous line repeated {more} more time{plural}]\n"));
    }
}
