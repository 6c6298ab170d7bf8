//! Runtime type names.
//!
//! Every value the interpreter manipulates belongs to exactly one of these
//! types. The names are the ones user code sees in `type(x)` and in
//! `TypeError` messages.

use std::fmt;

/// Runtime type of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    /// The type of `None`.
    NoneType,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// Unicode string.
    Str,
    /// Mutable sequence.
    List,
    /// Immutable sequence.
    Tuple,
    /// Insertion-ordered mapping.
    Dict,
    /// Arithmetic progression of integers.
    Range,
    /// User-defined function (`def` or `lambda`).
    Function,
    /// Function implemented in Rust, or a method bound to a receiver.
    BuiltinFunction,
    /// The type of types.
    Type,
}

impl Type {
    /// Returns the name of this type as user code sees it.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoneType => "NoneType",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            Self::Range => "range",
            Self::Function => "function",
            Self::BuiltinFunction => "builtin_function_or_method",
            Self::Type => "type",
        }
    }

    /// Returns true if values of this type can be called like a constructor.
    #[must_use]
    pub const fn is_constructible(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Int
                | Self::Float
                | Self::Str
                | Self::List
                | Self::Tuple
                | Self::Dict
                | Self::Range
                | Self::Type
        )
    }

    /// Returns true if `self` is `other` or a subtype of it.
    ///
    /// The only subtyping relation is `bool` <: `int`.
    #[must_use]
    pub fn is_subtype_of(self, other: Self) -> bool {
        self == other || (self == Self::Bool && other == Self::Int)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
