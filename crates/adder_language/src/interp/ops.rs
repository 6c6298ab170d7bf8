//! Operators on values: arithmetic, comparison, containment, indexing and
//! iteration.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::ast::{BinOp, CmpOp, UnaryOp};
use crate::exception::{ExceptionType, RuntimeError};
use crate::value::{Exec, Range, Value};

// =============================================================================
// Arithmetic
// =============================================================================

/// Applies a binary arithmetic or bitwise operator.
pub(crate) fn binary(op: BinOp, left: &Value, right: &Value) -> Exec<Value> {
    if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
        return int_binary(op, a, b);
    }
    if is_number(left) && is_number(right) {
        if let (Some(a), Some(b)) = (left.as_float(), right.as_float()) {
            return float_binary(op, a, b, left, right);
        }
    }

    match (op, left, right) {
        (BinOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{a}{b}"))),
        (BinOp::Add, Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (BinOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (BinOp::Add, Value::Str(_) | Value::List(_) | Value::Tuple(_), _) => {
            Err(RuntimeError::type_error(format!(
                "can only concatenate {} (not \"{}\") to {}",
                left.type_name(),
                right.type_name(),
                left.type_name()
            )))
        }
        (BinOp::Mul, _, _) => match repeat_operands(left, right) {
            Some((sequence, count)) => repeat(sequence, count),
            None => Err(unsupported(op, left, right)),
        },
        _ => Err(unsupported(op, left, right)),
    }
}

/// Applies a unary operator.
pub(crate) fn unary(op: UnaryOp, operand: &Value) -> Exec<Value> {
    match (op, operand) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Value::Float(f)) => Ok(Value::Float(*f)),
        (_, v) => {
            let Some(i) = v.as_int() else {
                let symbol = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Pos => "+",
                    UnaryOp::Invert | UnaryOp::Not => "~",
                };
                return Err(RuntimeError::type_error(format!(
                    "bad operand type for unary {symbol}: '{}'",
                    v.type_name()
                )));
            };
            Ok(Value::Int(match op {
                UnaryOp::Neg => i.checked_neg().ok_or_else(RuntimeError::overflow)?,
                UnaryOp::Invert => !i,
                UnaryOp::Pos | UnaryOp::Not => i,
            }))
        }
    }
}

fn is_number(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Float(_) | Value::Bool(_))
}

fn unsupported(op: BinOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "unsupported operand type(s) for {op}: '{}' and '{}'",
        left.type_name(),
        right.type_name()
    ))
}

#[allow(clippy::cast_precision_loss)]
fn int_binary(op: BinOp, a: i64, b: i64) -> Exec<Value> {
    let overflow = RuntimeError::overflow;
    let result = match op {
        BinOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        BinOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        BinOp::Div => {
            if b == 0 {
                return Err(RuntimeError::zero_division("division by zero"));
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(RuntimeError::zero_division(
                    "integer division or modulo by zero",
                ));
            }
            let quotient = a.checked_div(b).ok_or_else(overflow)?;
            if a % b != 0 && ((a < 0) != (b < 0)) {
                quotient - 1
            } else {
                quotient
            }
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(RuntimeError::zero_division(
                    "integer division or modulo by zero",
                ));
            }
            let remainder = a.wrapping_rem(b);
            if remainder != 0 && ((remainder < 0) != (b < 0)) {
                remainder + b
            } else {
                remainder
            }
        }
        BinOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(RuntimeError::zero_division(
                        "0.0 cannot be raised to a negative power",
                    ));
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            let exponent = u32::try_from(b).map_err(|_| overflow())?;
            a.checked_pow(exponent).ok_or_else(overflow)?
        }
        BinOp::LShift => {
            if b < 0 {
                return Err(RuntimeError::value_error("negative shift count"));
            }
            if a == 0 {
                0
            } else {
                let shift = u32::try_from(b)
                    .ok()
                    .filter(|&s| s < 64)
                    .ok_or_else(overflow)?;
                let shifted = a << shift;
                if shifted >> shift != a {
                    return Err(overflow());
                }
                shifted
            }
        }
        BinOp::RShift => {
            if b < 0 {
                return Err(RuntimeError::value_error("negative shift count"));
            }
            if b >= 64 {
                if a < 0 { -1 } else { 0 }
            } else {
                a >> b
            }
        }
        BinOp::BitAnd => a & b,
        BinOp::BitOr => a | b,
        BinOp::BitXor => a ^ b,
    };
    Ok(Value::Int(result))
}

#[allow(clippy::float_cmp)]
fn float_binary(op: BinOp, a: f64, b: f64, left: &Value, right: &Value) -> Exec<Value> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float division by zero"));
            }
            a / b
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float floor division by zero"));
            }
            (a / b).floor()
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float modulo"));
            }
            let remainder = a % b;
            if remainder != 0.0 && ((remainder < 0.0) != (b < 0.0)) {
                remainder + b
            } else {
                remainder
            }
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(RuntimeError::zero_division(
                    "0.0 cannot be raised to a negative power",
                ));
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err(RuntimeError::value_error(
                    "negative number cannot be raised to a fractional power",
                ));
            }
            a.powf(b)
        }
        BinOp::LShift | BinOp::RShift | BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => {
            return Err(unsupported(op, left, right));
        }
    };
    Ok(Value::Float(result))
}

/// Returns `(sequence, count)` if the operands are a sequence and an int in
/// either order.
fn repeat_operands<'v>(left: &'v Value, right: &'v Value) -> Option<(&'v Value, i64)> {
    let is_sequence = |v: &Value| matches!(v, Value::Str(_) | Value::List(_) | Value::Tuple(_));
    if is_sequence(left) {
        right.as_int().map(|n| (left, n))
    } else if is_sequence(right) {
        left.as_int().map(|n| (right, n))
    } else {
        None
    }
}

fn repeat(sequence: &Value, count: i64) -> Exec<Value> {
    let count = usize::try_from(count).unwrap_or(0);
    let too_big = || {
        RuntimeError::new(
            ExceptionType::OverflowError,
            "repeated sequence is too long",
        )
    };
    match sequence {
        Value::Str(s) => {
            s.len().checked_mul(count).ok_or_else(too_big)?;
            Ok(Value::str(s.repeat(count)))
        }
        Value::List(items) => {
            let items = items.borrow();
            items.len().checked_mul(count).ok_or_else(too_big)?;
            Ok(Value::list(repeat_items(&items, count)))
        }
        Value::Tuple(items) => {
            items.len().checked_mul(count).ok_or_else(too_big)?;
            Ok(Value::tuple(repeat_items(items, count)))
        }
        _ => Ok(sequence.clone()),
    }
}

fn repeat_items(items: &[Value], count: usize) -> Vec<Value> {
    (0..count).flat_map(|_| items.iter().cloned()).collect()
}

// =============================================================================
// Comparison
// =============================================================================

/// Evaluates one comparison operator.
pub(crate) fn compare(op: CmpOp, left: &Value, right: &Value) -> Exec<bool> {
    Ok(match op {
        CmpOp::Eq => equal(left, right),
        CmpOp::NotEq => !equal(left, right),
        CmpOp::In => contains(right, left)?,
        CmpOp::NotIn => !contains(right, left)?,
        CmpOp::Is => identical(left, right),
        CmpOp::IsNot => !identical(left, right),
        CmpOp::Lt | CmpOp::LtE | CmpOp::Gt | CmpOp::GtE => {
            let Some(ordering) = order(op.symbol(), left, right)? else {
                return Ok(false);
            };
            match op {
                CmpOp::Lt => ordering == Ordering::Less,
                CmpOp::LtE => ordering != Ordering::Greater,
                CmpOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }
        }
    })
}

/// Value equality (`==`).
#[allow(clippy::float_cmp)]
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
        return a == b;
    }
    if is_number(left) && is_number(right) {
        return left.as_float() == right.as_float();
    }
    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            Rc::ptr_eq(a, b) || elements_equal(&a.borrow(), &b.borrow())
        }
        (Value::Tuple(a), Value::Tuple(b)) => elements_equal(a, b),
        (Value::Dict(a), Value::Dict(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let (a, b) = (a.borrow(), b.borrow());
            a.len() == b.len()
                && a.iter().all(|(key, value)| {
                    matches!(b.get(key), Ok(Some(other)) if identical(value, &other) || equal(value, &other))
                })
        }
        (Value::Range(a), Value::Range(b)) => {
            let len = a.len();
            len == b.len() && (len == 0 || (a.start == b.start && (len == 1 || a.step == b.step)))
        }
        _ => identical(left, right),
    }
}

fn elements_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| identical(x, y) || equal(x, y))
}

/// Object identity (`is`).
pub(crate) fn identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
        (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b) || (a.is_empty() && b.is_empty()),
        (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
        (Value::Range(a), Value::Range(b)) => a == b,
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Method(a), Value::Method(b)) => Rc::ptr_eq(a, b),
        (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
        (Value::Type(a), Value::Type(b)) => a == b,
        (Value::ExceptionType(a), Value::ExceptionType(b)) => a == b,
        (Value::Exception(a), Value::Exception(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// Orders two values; `None` means unordered (a NaN was involved).
///
/// # Errors
///
/// Returns a `TypeError` naming `symbol` if the types cannot be ordered.
pub(crate) fn order(symbol: &str, left: &Value, right: &Value) -> Exec<Option<Ordering>> {
    if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
        return Ok(Some(a.cmp(&b)));
    }
    if is_number(left) && is_number(right) {
        return Ok(left
            .as_float()
            .zip(right.as_float())
            .and_then(|(a, b)| a.partial_cmp(&b)));
    }
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) => {
            let (a, b) = (a.borrow().clone(), b.borrow().clone());
            order_elements(symbol, &a, &b)
        }
        (Value::Tuple(a), Value::Tuple(b)) => order_elements(symbol, a, b),
        _ => Err(RuntimeError::type_error(format!(
            "'{symbol}' not supported between instances of '{}' and '{}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn order_elements(symbol: &str, a: &[Value], b: &[Value]) -> Exec<Option<Ordering>> {
    for (x, y) in a.iter().zip(b) {
        if !(identical(x, y) || equal(x, y)) {
            return order(symbol, x, y);
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

/// Membership test (`item in container`).
pub(crate) fn contains(container: &Value, item: &Value) -> Exec<bool> {
    match container {
        Value::Str(s) => match item {
            Value::Str(needle) => Ok(s.contains(needle.as_ref())),
            _ => Err(RuntimeError::type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                item.type_name()
            ))),
        },
        Value::List(items) => Ok(items
            .borrow()
            .iter()
            .any(|x| identical(x, item) || equal(x, item))),
        Value::Tuple(items) => Ok(items.iter().any(|x| identical(x, item) || equal(x, item))),
        Value::Dict(dict) => Ok(dict.borrow().get(item)?.is_some()),
        Value::Range(range) => Ok(item.as_int().is_some_and(|i| range.contains(i))),
        _ => Err(RuntimeError::type_error(format!(
            "argument of type '{}' is not iterable",
            container.type_name()
        ))),
    }
}

// =============================================================================
// Indexing
// =============================================================================

/// Resolves a possibly negative index against a length.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

fn integer_index(key: &Value, container: &Value) -> Exec<i64> {
    key.as_int().ok_or_else(|| {
        let message = if matches!(container, Value::Str(_)) {
            "string indices must be integers".to_string()
        } else {
            format!(
                "{} indices must be integers or slices, not {}",
                container.type_name(),
                key.type_name()
            )
        };
        RuntimeError::type_error(message)
    })
}

/// `container[key]`
pub(crate) fn get_item(container: &Value, key: &Value) -> Exec<Value> {
    match container {
        Value::List(items) => {
            let index = integer_index(key, container)?;
            let items = items.borrow();
            normalize_index(index, items.len())
                .map(|i| items[i].clone())
                .ok_or_else(|| RuntimeError::index_error("list index out of range"))
        }
        Value::Tuple(items) => {
            let index = integer_index(key, container)?;
            normalize_index(index, items.len())
                .map(|i| items[i].clone())
                .ok_or_else(|| RuntimeError::index_error("tuple index out of range"))
        }
        Value::Str(s) => {
            let index = integer_index(key, container)?;
            normalize_index(index, s.chars().count())
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::str(c.to_string()))
                .ok_or_else(|| RuntimeError::index_error("string index out of range"))
        }
        Value::Range(range) => {
            let index = integer_index(key, container)?;
            normalize_index(index, range.len())
                .map(|i| Value::Int(range.get(i)))
                .ok_or_else(|| RuntimeError::index_error("range object index out of range"))
        }
        Value::Dict(dict) => dict
            .borrow()
            .get(key)?
            .ok_or_else(|| RuntimeError::key_error(key.clone())),
        _ => Err(RuntimeError::type_error(format!(
            "'{}' object is not subscriptable",
            container.type_name()
        ))),
    }
}

/// `container[key] = value`
pub(crate) fn set_item(container: &Value, key: Value, value: Value) -> Exec<()> {
    match container {
        Value::List(items) => {
            let index = integer_index(&key, container)?;
            let mut items = items.borrow_mut();
            let i = normalize_index(index, items.len())
                .ok_or_else(|| RuntimeError::index_error("list assignment index out of range"))?;
            items[i] = value;
            Ok(())
        }
        Value::Dict(dict) => dict.borrow_mut().insert(key, value),
        _ => Err(RuntimeError::type_error(format!(
            "'{}' object does not support item assignment",
            container.type_name()
        ))),
    }
}

/// `del container[key]`
pub(crate) fn del_item(container: &Value, key: &Value) -> Exec<()> {
    match container {
        Value::List(items) => {
            let index = integer_index(key, container)?;
            let mut items = items.borrow_mut();
            let i = normalize_index(index, items.len())
                .ok_or_else(|| RuntimeError::index_error("list assignment index out of range"))?;
            items.remove(i);
            Ok(())
        }
        Value::Dict(dict) => match dict.borrow_mut().remove(key)? {
            Some(_) => Ok(()),
            None => Err(RuntimeError::key_error(key.clone())),
        },
        _ => Err(RuntimeError::type_error(format!(
            "'{}' object doesn't support item deletion",
            container.type_name()
        ))),
    }
}

/// Computes the positions selected by a slice over a sequence of `len`.
pub(crate) fn slice_indices(
    len: usize,
    lower: Option<i64>,
    upper: Option<i64>,
    step: Option<i64>,
) -> Exec<Vec<usize>> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(RuntimeError::value_error("slice step cannot be zero"));
    }
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let resolve = |v: i64| if v < 0 { v.saturating_add(len) } else { v };
    let (start, stop) = if step > 0 {
        let clamp = |v: i64| resolve(v).clamp(0, len);
        (lower.map_or(0, clamp), upper.map_or(len, clamp))
    } else {
        let clamp = |v: i64| resolve(v).clamp(-1, len - 1);
        (lower.map_or(len - 1, clamp), upper.map_or(-1, clamp))
    };

    let mut indices = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        if let Ok(index) = usize::try_from(i) {
            indices.push(index);
        }
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(indices)
}

/// `container[lower:upper:step]`
pub(crate) fn get_slice(
    container: &Value,
    lower: Option<i64>,
    upper: Option<i64>,
    step: Option<i64>,
) -> Exec<Value> {
    match container {
        Value::List(items) => {
            let items = items.borrow();
            let picked = slice_indices(items.len(), lower, upper, step)?;
            Ok(Value::list(picked.into_iter().map(|i| items[i].clone()).collect()))
        }
        Value::Tuple(items) => {
            let picked = slice_indices(items.len(), lower, upper, step)?;
            Ok(Value::tuple(picked.into_iter().map(|i| items[i].clone()).collect()))
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let picked = slice_indices(chars.len(), lower, upper, step)?;
            Ok(Value::str(picked.into_iter().map(|i| chars[i]).collect::<String>()))
        }
        Value::Range(range) => {
            let picked = slice_indices(range.len(), lower, upper, step)?;
            let step = range.step.saturating_mul(step.unwrap_or(1));
            let start = picked.first().map_or(range.start, |&i| range.get(i));
            let stop = picked
                .last()
                .map_or(start, |&i| range.get(i).saturating_add(step));
            Ok(Value::Range(Range { start, stop, step }))
        }
        _ => Err(RuntimeError::type_error(format!(
            "'{}' object is not subscriptable",
            container.type_name()
        ))),
    }
}

// =============================================================================
// Iteration
// =============================================================================

/// An iterator over the items of an iterable value.
///
/// Lists are snapshotted when iteration starts; ranges are produced lazily.
pub(crate) enum ValueIter {
    Items(std::vec::IntoIter<Value>),
    Range { next: i64, remaining: usize, step: i64 },
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            Self::Items(items) => items.next(),
            Self::Range {
                next,
                remaining,
                step,
            } => {
                if *remaining == 0 {
                    return None;
                }
                let value = *next;
                *remaining -= 1;
                *next = next.wrapping_add(*step);
                Some(Value::Int(value))
            }
        }
    }
}

/// Starts iterating over `value`.
pub(crate) fn iterate(value: &Value) -> Exec<ValueIter> {
    Ok(match value {
        Value::List(items) => ValueIter::Items(items.borrow().clone().into_iter()),
        Value::Tuple(items) => ValueIter::Items(items.to_vec().into_iter()),
        Value::Str(s) => ValueIter::Items(
            s.chars()
                .map(|c| Value::str(c.to_string()))
                .collect::<Vec<_>>()
                .into_iter(),
        ),
        Value::Dict(dict) => ValueIter::Items(dict.borrow().keys().into_iter()),
        Value::Range(range) => ValueIter::Range {
            next: range.start,
            remaining: range.len(),
            step: range.step,
        },
        _ => {
            return Err(RuntimeError::type_error(format!(
                "'{}' object is not iterable",
                value.type_name()
            )));
        }
    })
}

/// Collects every item of an iterable.
pub(crate) fn collect(value: &Value) -> Exec<Vec<Value>> {
    Ok(iterate(value)?.collect())
}

/// `len(value)`
pub(crate) fn length(value: &Value) -> Exec<usize> {
    match value {
        Value::Str(s) => Ok(s.chars().count()),
        Value::List(items) => Ok(items.borrow().len()),
        Value::Tuple(items) => Ok(items.len()),
        Value::Dict(dict) => Ok(dict.borrow().len()),
        Value::Range(range) => Ok(range.len()),
        _ => Err(RuntimeError::type_error(format!(
            "object of type '{}' has no len()",
            value.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Value {
        Value::Int(i)
    }

    #[test]
    fn floor_division_and_modulo_follow_the_divisor_sign() {
        assert_eq!(binary(BinOp::FloorDiv, &int(-7), &int(2)).expect("ok").repr(), "-4");
        assert_eq!(binary(BinOp::Mod, &int(-7), &int(2)).expect("ok").repr(), "1");
        assert_eq!(binary(BinOp::Mod, &int(7), &int(-2)).expect("ok").repr(), "-1");
        assert_eq!(
            binary(BinOp::Mod, &Value::Float(-7.5), &int(2)).expect("ok").repr(),
            "0.5"
        );
    }

    #[test]
    fn true_division_is_float() {
        assert_eq!(binary(BinOp::Div, &int(7), &int(2)).expect("ok").repr(), "3.5");
        assert_eq!(binary(BinOp::Div, &int(4), &int(2)).expect("ok").repr(), "2.0");
    }

    #[test]
    fn division_by_zero() {
        let err = binary(BinOp::Div, &int(1), &int(0)).expect_err("zero");
        assert_eq!(err.to_string(), "ZeroDivisionError: division by zero");
        let err = binary(BinOp::FloorDiv, &int(1), &int(0)).expect_err("zero");
        assert_eq!(err.kind(), ExceptionType::ZeroDivisionError);
    }

    #[test]
    fn overflow_is_reported() {
        let err = binary(BinOp::Mul, &int(i64::MAX), &int(2)).expect_err("overflow");
        assert_eq!(err.kind(), ExceptionType::OverflowError);
        assert_eq!(binary(BinOp::Pow, &int(2), &int(62)).expect("fits").repr(), "4611686018427387904");
        assert!(binary(BinOp::LShift, &int(1), &int(64)).is_err());
    }

    #[test]
    fn mixed_types() {
        assert_eq!(binary(BinOp::Add, &int(1), &Value::Float(0.5)).expect("ok").repr(), "1.5");
        assert_eq!(binary(BinOp::Add, &Value::Bool(true), &int(1)).expect("ok").repr(), "2");
        let err = binary(BinOp::Add, &int(1), &Value::str("a")).expect_err("type");
        assert_eq!(
            err.to_string(),
            "TypeError: unsupported operand type(s) for +: 'int' and 'str'"
        );
        let err = binary(BinOp::Add, &Value::str("a"), &int(1)).expect_err("type");
        assert_eq!(
            err.to_string(),
            "TypeError: can only concatenate str (not \"int\") to str"
        );
    }

    #[test]
    fn sequence_repetition() {
        assert_eq!(binary(BinOp::Mul, &Value::str("ab"), &int(3)).expect("ok").repr(), "'ababab'");
        assert_eq!(binary(BinOp::Mul, &int(2), &Value::list(vec![int(0)])).expect("ok").repr(), "[0, 0]");
        assert_eq!(binary(BinOp::Mul, &Value::str("x"), &int(-1)).expect("ok").repr(), "''");
    }

    #[test]
    fn comparisons() {
        assert!(compare(CmpOp::Eq, &int(1), &Value::Float(1.0)).expect("ok"));
        assert!(compare(CmpOp::Lt, &Value::str("a"), &Value::str("b")).expect("ok"));
        assert!(compare(
            CmpOp::Lt,
            &Value::tuple(vec![int(1), int(2)]),
            &Value::tuple(vec![int(1), int(3)])
        )
        .expect("ok"));
        assert!(!compare(CmpOp::Lt, &Value::Float(f64::NAN), &int(1)).expect("ok"));
        let err = compare(CmpOp::Lt, &int(1), &Value::str("a")).expect_err("type");
        assert_eq!(
            err.to_string(),
            "TypeError: '<' not supported between instances of 'int' and 'str'"
        );
    }

    #[test]
    fn membership() {
        assert!(contains(&Value::str("hello"), &Value::str("ell")).expect("ok"));
        assert!(contains(&Value::list(vec![int(1), int(2)]), &Value::Float(2.0)).expect("ok"));
        assert!(contains(&Value::Range(Range { start: 0, stop: 10, step: 2 }), &int(4)).expect("ok"));
        assert!(contains(&int(1), &int(1)).is_err());
    }

    #[test]
    fn indexing() {
        let list = Value::list(vec![int(10), int(20), int(30)]);
        assert_eq!(get_item(&list, &int(-1)).expect("ok").repr(), "30");
        let err = get_item(&list, &int(3)).expect_err("range");
        assert_eq!(err.to_string(), "IndexError: list index out of range");
        set_item(&list, int(0), int(5)).expect("ok");
        del_item(&list, &int(1)).expect("ok");
        assert_eq!(list.repr(), "[5, 30]");
        assert_eq!(get_item(&Value::str("héllo"), &int(1)).expect("ok").repr(), "'é'");
    }

    #[test]
    fn slicing() {
        assert_eq!(slice_indices(5, Some(1), None, None).expect("ok"), vec![1, 2, 3, 4]);
        assert_eq!(slice_indices(5, None, None, Some(-1)).expect("ok"), vec![4, 3, 2, 1, 0]);
        assert_eq!(slice_indices(5, Some(-2), Some(100), None).expect("ok"), vec![3, 4]);
        assert_eq!(slice_indices(5, Some(4), Some(1), Some(-2)).expect("ok"), vec![4, 2]);
        assert!(slice_indices(5, None, None, Some(0)).is_err());
        assert_eq!(
            get_slice(&Value::str("abcdef"), None, None, Some(2)).expect("ok").repr(),
            "'ace'"
        );
        let r = Value::Range(Range { start: 0, stop: 10, step: 1 });
        assert_eq!(get_slice(&r, Some(2), Some(5), None).expect("ok").repr(), "range(2, 5)");
    }

    #[test]
    fn iteration_and_length() {
        let r = Value::Range(Range { start: 3, stop: 0, step: -1 });
        let items: Vec<String> = iterate(&r).expect("ok").map(|v| v.repr()).collect();
        assert_eq!(items, ["3", "2", "1"]);
        assert_eq!(length(&Value::str("héllo")).expect("ok"), 5);
        assert!(iterate(&int(1)).is_err());
        assert!(length(&Value::None).is_err());
    }
}
