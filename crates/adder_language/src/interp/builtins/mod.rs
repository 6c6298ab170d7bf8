//! Builtin functions, types and methods.
//!
//! The functions are organised by category:
//!
//! - `basic`: output, introspection and `exec`
//! - `numeric`: arithmetic helpers and number formatting
//! - `sequence`: iteration helpers and sorting
//! - `convert`: the type constructors (`int`, `str`, `list`, ...)
//! - `methods`: methods of `str`, `list` and `dict`

mod basic;
mod convert;
mod methods;
mod numeric;
mod sequence;

use adder_foundation::{Namespace, Type};

use crate::exception::{ExceptionType, RuntimeError};
use crate::value::{Args, Builtin, Exec, NativeFn, Value};

pub(super) use convert::construct;
pub(super) use methods::lookup as lookup_method;

/// Builtin types exposed by name.
const TYPES: [Type; 9] = [
    Type::Bool,
    Type::Int,
    Type::Float,
    Type::Str,
    Type::List,
    Type::Tuple,
    Type::Dict,
    Type::Range,
    Type::Type,
];

/// Builds the builtin namespace.
pub(super) fn namespace() -> Namespace<Value> {
    let mut ns = Namespace::new();
    let functions: [&[(&'static str, NativeFn)]; 3] =
        [basic::FUNCTIONS, numeric::FUNCTIONS, sequence::FUNCTIONS];
    for &(name, func) in functions.into_iter().flatten() {
        ns.insert(name, Value::Builtin(Builtin { name, func }));
    }
    for ty in TYPES {
        ns.insert(ty.name(), Value::Type(ty));
    }
    for kind in ExceptionType::ALL {
        ns.insert(kind.name(), Value::ExceptionType(kind));
    }
    ns
}

// =============================================================================
// Argument helpers
// =============================================================================

/// Extracts an integer argument.
fn int_arg(value: &Value, function: &str) -> Exec<i64> {
    value.as_int().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{function}() argument must be int, not {}",
            value.type_name()
        ))
    })
}

/// Extracts a string argument.
fn str_arg<'v>(value: &'v Value, function: &str) -> Exec<&'v str> {
    match value {
        Value::Str(s) => Ok(s),
        _ => Err(RuntimeError::type_error(format!(
            "{function}() argument must be str, not {}",
            value.type_name()
        ))),
    }
}

/// Calls `func` with one positional argument.
fn call1(
    interp: &mut crate::interp::Interpreter<'_>,
    func: &Value,
    arg: Value,
) -> Exec<Value> {
    interp.call(func, Args::positional(vec![arg]))
}
