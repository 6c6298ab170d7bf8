//! Runtime values.
//!
//! Scalars are stored inline. Mutable containers (`list`, `dict`) are shared
//! through `Rc<RefCell<_>>` so that aliases observe each other's mutations,
//! matching the reference semantics user code expects.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use adder_foundation::Type;

use crate::ast::FunctionDef;
use crate::exception::{ExceptionObject, ExceptionType, RuntimeError};
use crate::interp::{Frame, Interpreter};

/// Result of evaluating anything at runtime.
pub type Exec<T> = Result<T, RuntimeError>;

/// A builtin function implemented in Rust.
pub type NativeFn = fn(&mut Interpreter<'_>, Args) -> Exec<Value>;

/// A builtin method implemented in Rust; receives the bound object.
pub type MethodFn = fn(&mut Interpreter<'_>, &Value, Args) -> Exec<Value>;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    /// `None`
    None,
    /// `True` / `False`
    Bool(bool),
    /// 64-bit integer; arithmetic is checked.
    Int(i64),
    /// Double-precision float.
    Float(f64),
    /// Immutable string.
    Str(Rc<str>),
    /// Mutable list.
    List(Rc<RefCell<Vec<Value>>>),
    /// Immutable tuple.
    Tuple(Rc<[Value]>),
    /// Insertion-ordered dictionary.
    Dict(Rc<RefCell<Dict>>),
    /// Integer range.
    Range(Range),
    /// User-defined function.
    Function(Rc<Function>),
    /// Builtin function.
    Builtin(Builtin),
    /// Builtin method bound to a receiver.
    Method(Rc<BoundMethod>),
    /// A builtin type such as `int`.
    Type(Type),
    /// An exception class such as `ValueError`.
    ExceptionType(ExceptionType),
    /// An exception instance.
    Exception(Rc<ExceptionObject>),
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn str(s: impl Into<Rc<str>>) -> Self {
        Self::Str(s.into())
    }

    /// Creates a list value.
    #[must_use]
    pub fn list(items: Vec<Self>) -> Self {
        Self::List(Rc::new(RefCell::new(items)))
    }

    /// Creates a tuple value.
    #[must_use]
    pub fn tuple(items: Vec<Self>) -> Self {
        Self::Tuple(items.into())
    }

    /// Creates a dict value.
    #[must_use]
    pub fn dict(dict: Dict) -> Self {
        Self::Dict(Rc::new(RefCell::new(dict)))
    }

    /// Returns the builtin type of this value, or `None` for exceptions.
    #[must_use]
    pub const fn ty(&self) -> Option<Type> {
        Some(match self {
            Self::None => Type::NoneType,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::Str(_) => Type::Str,
            Self::List(_) => Type::List,
            Self::Tuple(_) => Type::Tuple,
            Self::Dict(_) => Type::Dict,
            Self::Range(_) => Type::Range,
            Self::Function(_) => Type::Function,
            Self::Builtin(_) | Self::Method(_) => Type::BuiltinFunction,
            Self::Type(_) | Self::ExceptionType(_) => Type::Type,
            Self::Exception(_) => return None,
        })
    }

    /// Returns the type name used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Exception(e) => e.kind.name(),
            other => other.ty().map_or("object", Type::name),
        }
    }

    /// Returns the value `type(self)` evaluates to.
    #[must_use]
    pub fn class(&self) -> Self {
        match self {
            Self::Exception(e) => Self::ExceptionType(e.kind),
            other => other.ty().map_or(Self::None, Self::Type),
        }
    }

    /// Returns the truth value used by `if`, `while`, `and`, `or`, `not`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.borrow().is_empty(),
            Self::Tuple(items) => !items.is_empty(),
            Self::Dict(dict) => !dict.borrow().is_empty(),
            Self::Range(range) => range.len() > 0,
            _ => true,
        }
    }

    /// Returns the integer value of an `int` or `bool`.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Returns the numeric value of an `int`, `bool` or `float`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::Bool(b) => Some(*b as i64 as f64),
            _ => None,
        }
    }

    /// Returns `repr(self)`.
    #[must_use]
    pub fn repr(&self) -> String {
        self.repr_with(&mut Vec::new())
    }

    /// Returns `str(self)`.
    #[must_use]
    pub fn to_str(&self) -> String {
        match self {
            Self::Str(s) => s.to_string(),
            Self::Exception(e) => e.message(),
            other => other.repr(),
        }
    }

    /// Renders the repr, printing `[...]` for containers already being printed.
    fn repr_with(&self, seen: &mut Vec<usize>) -> String {
        match self {
            Self::None => "None".to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => format_float(*f),
            Self::Str(s) => quote(s),
            Self::List(items) => {
                let id = Rc::as_ptr(items).cast::<()>() as usize;
                if seen.contains(&id) {
                    return "[...]".to_string();
                }
                seen.push(id);
                let parts: Vec<String> = items.borrow().iter().map(|v| v.repr_with(seen)).collect();
                seen.pop();
                format!("[{}]", parts.join(", "))
            }
            Self::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.repr_with(seen)).collect();
                if parts.len() == 1 {
                    format!("({},)", parts[0])
                } else {
                    format!("({})", parts.join(", "))
                }
            }
            Self::Dict(dict) => {
                let id = Rc::as_ptr(dict).cast::<()>() as usize;
                if seen.contains(&id) {
                    return "{...}".to_string();
                }
                seen.push(id);
                let parts: Vec<String> = dict
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr_with(seen), v.repr_with(seen)))
                    .collect();
                seen.pop();
                format!("{{{}}}", parts.join(", "))
            }
            Self::Range(range) => {
                if range.step == 1 {
                    format!("range({}, {})", range.start, range.stop)
                } else {
                    format!("range({}, {}, {})", range.start, range.stop, range.step)
                }
            }
            Self::Function(func) => {
                format!("<function {} at {:p}>", func.def.name, Rc::as_ptr(func))
            }
            Self::Builtin(builtin) => format!("<built-in function {}>", builtin.name),
            Self::Method(method) => format!(
                "<built-in method {} of {} object>",
                method.name,
                method.receiver.type_name()
            ),
            Self::Type(ty) => format!("<class '{}'>", ty.name()),
            Self::ExceptionType(kind) => format!("<class '{}'>", kind.name()),
            Self::Exception(e) => e.repr(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}

/// Formats a float the way `repr(float)` does: shortest round-trip digits,
/// always with a decimal point or exponent.
#[must_use]
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{f:e}");
        let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }
    let formatted = format!("{f}");
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}

/// Quotes a string the way `repr(str)` does.
fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

// =============================================================================
// Functions
// =============================================================================

/// A user-defined function: its definition plus what it closed over.
pub struct Function {
    /// The parsed definition.
    pub def: Rc<FunctionDef>,
    /// Default values, aligned with the trailing parameters.
    pub defaults: Vec<Value>,
    /// The frame the function was defined in, if it was defined in one.
    pub enclosing: Option<Rc<Frame>>,
}

/// A builtin function.
#[derive(Clone, Copy)]
pub struct Builtin {
    /// The name it is registered under.
    pub name: &'static str,
    /// The implementation.
    pub func: NativeFn,
}

/// A builtin method bound to its receiver, e.g. `[].append`.
pub struct BoundMethod {
    /// The object the method was looked up on.
    pub receiver: Value,
    /// The method name.
    pub name: &'static str,
    /// The implementation.
    pub func: MethodFn,
}

/// Arguments of a call.
#[derive(Debug, Default)]
pub struct Args {
    /// Positional arguments.
    pub positional: Vec<Value>,
    /// Keyword arguments in call order.
    pub keywords: Vec<(String, Value)>,
}

impl Args {
    /// Creates positional-only arguments.
    #[must_use]
    pub const fn positional(values: Vec<Value>) -> Self {
        Self {
            positional: values,
            keywords: Vec::new(),
        }
    }

    /// Checks the positional count is within `min..=max`.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` naming `function` otherwise.
    pub fn check_count(&self, function: &str, min: usize, max: usize) -> Exec<()> {
        let count = self.positional.len();
        if count >= min && count <= max {
            return Ok(());
        }
        let message = if min == max {
            match min {
                0 => format!("{function}() takes no arguments ({count} given)"),
                1 => format!("{function}() takes exactly one argument ({count} given)"),
                _ => format!("{function}() takes exactly {min} arguments ({count} given)"),
            }
        } else if count < min {
            format!("{function}() takes at least {min} arguments ({count} given)")
        } else {
            format!("{function}() takes at most {max} arguments ({count} given)")
        };
        Err(RuntimeError::type_error(message))
    }

    /// Rejects every keyword argument not in `allowed`.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` for the first unexpected keyword.
    pub fn check_keywords(&self, function: &str, allowed: &[&str]) -> Exec<()> {
        match self
            .keywords
            .iter()
            .find(|(name, _)| !allowed.contains(&name.as_str()))
        {
            Some((name, _)) => Err(RuntimeError::type_error(format!(
                "{function}() got an unexpected keyword argument '{name}'"
            ))),
            None => Ok(()),
        }
    }

    /// Returns the keyword argument `name`, if given.
    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

// =============================================================================
// Dictionaries
// =============================================================================

/// A hashable projection of a value, used to index dictionaries.
///
/// Numerically equal keys (`1`, `1.0`, `True`) share a projection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    /// `None`
    None,
    /// Integers, bools, and integral floats.
    Int(i64),
    /// Non-integral floats, by bit pattern.
    Float(u64),
    /// Strings.
    Str(Rc<str>),
    /// Tuples of hashable values.
    Tuple(Vec<HashKey>),
    /// Builtin types.
    Type(Type),
    /// Exception classes.
    ExceptionType(ExceptionType),
    /// Functions and other objects hashed by identity.
    Identity(usize),
}

impl HashKey {
    /// Projects a value.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` for mutable containers.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn from_value(value: &Value) -> Exec<Self> {
        Ok(match value {
            Value::None => Self::None,
            Value::Bool(b) => Self::Int(i64::from(*b)),
            Value::Int(i) => Self::Int(*i),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 9.2e18 {
                    Self::Int(*f as i64)
                } else {
                    Self::Float(f.to_bits())
                }
            }
            Value::Str(s) => Self::Str(s.clone()),
            Value::Tuple(items) => {
                Self::Tuple(items.iter().map(Self::from_value).collect::<Exec<_>>()?)
            }
            Value::Range(r) => Self::Tuple(vec![Self::Int(r.start), Self::Int(r.stop), Self::Int(r.step)]),
            Value::Type(t) => Self::Type(*t),
            Value::ExceptionType(k) => Self::ExceptionType(*k),
            Value::Function(f) => Self::Identity(Rc::as_ptr(f).cast::<()>() as usize),
            Value::Method(m) => Self::Identity(Rc::as_ptr(m).cast::<()>() as usize),
            Value::Exception(e) => Self::Identity(Rc::as_ptr(e).cast::<()>() as usize),
            Value::Builtin(b) => Self::Identity(b.func as usize),
            Value::List(_) | Value::Dict(_) => {
                return Err(RuntimeError::type_error(format!(
                    "unhashable type: '{}'",
                    value.type_name()
                )));
            }
        })
    }
}

/// An insertion-ordered dictionary.
#[derive(Clone, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
    index: HashMap<HashKey, usize>,
}

impl Dict {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a key.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` if the key is unhashable.
    pub fn get(&self, key: &Value) -> Exec<Option<Value>> {
        let hash = HashKey::from_value(key)?;
        Ok(self.index.get(&hash).map(|&i| self.entries[i].1.clone()))
    }

    /// Inserts or replaces an entry, keeping the original key and position.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` if the key is unhashable.
    pub fn insert(&mut self, key: Value, value: Value) -> Exec<()> {
        let hash = HashKey::from_value(&key)?;
        if let Some(&i) = self.index.get(&hash) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(hash, self.entries.len());
            self.entries.push((key, value));
        }
        Ok(())
    }

    /// Removes an entry, returning its value.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` if the key is unhashable.
    pub fn remove(&mut self, key: &Value) -> Exec<Option<Value>> {
        let hash = HashKey::from_value(key)?;
        let Some(i) = self.index.remove(&hash) else {
            return Ok(None);
        };
        let (_, value) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Ok(Some(value))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Returns the keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<Value> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Returns the values in insertion order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }
}

// =============================================================================
// Ranges
// =============================================================================

/// An arithmetic progression `start, start + step, ...` stopping before `stop`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    /// First value.
    pub start: i64,
    /// Exclusive bound.
    pub stop: i64,
    /// Non-zero increment.
    pub step: i64,
}

impl Range {
    /// Returns the number of values.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn len(&self) -> usize {
        let (start, stop, step) = (
            i128::from(self.start),
            i128::from(self.stop),
            i128::from(self.step),
        );
        let count = if step > 0 && start < stop {
            (stop - start - 1) / step + 1
        } else if step < 0 && start > stop {
            (start - stop - 1) / (-step) + 1
        } else {
            0
        };
        count as usize
    }

    /// Returns true if the range yields no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value at position `index` (assumed in bounds).
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn get(&self, index: usize) -> i64 {
        self.start + (index as i64) * self.step
    }

    /// Returns true if `value` is one of the range's values.
    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        let in_bounds = if self.step > 0 {
            self.start <= value && value < self.stop
        } else {
            self.stop < value && value <= self.start
        };
        in_bounds && (value - self.start) % self.step == 0
    }
}
