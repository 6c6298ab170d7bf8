//! Numeric builtins.

use std::cmp::Ordering;

use super::{call1, int_arg, str_arg};
use crate::ast::BinOp;
use crate::exception::RuntimeError;
use crate::interp::{Interpreter, ops};
use crate::value::{Args, Exec, NativeFn, Value};

pub(super) const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("abs", abs),
    ("bin", bin),
    ("chr", chr),
    ("divmod", divmod),
    ("hex", hex),
    ("max", max),
    ("min", min),
    ("ord", ord),
    ("pow", pow),
    ("round", round),
    ("sum", sum),
];

fn abs(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("abs", 1, 1)?;
    match &args.positional[0] {
        Value::Float(f) => Ok(Value::Float(f.abs())),
        value => {
            let i = value.as_int().ok_or_else(|| {
                RuntimeError::type_error(format!(
                    "bad operand type for abs(): '{}'",
                    value.type_name()
                ))
            })?;
            i.checked_abs()
                .map(Value::Int)
                .ok_or_else(RuntimeError::overflow)
        }
    }
}

/// `round(number[, ndigits])`, rounding halves to even.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn round(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("round", 1, 2)?;
    let digits = match args.positional.get(1) {
        None | Some(Value::None) => None,
        Some(value) => Some(int_arg(value, "round")?),
    };
    match (&args.positional[0], digits) {
        (Value::Float(f), None) => {
            let rounded = f.round_ties_even();
            if !rounded.is_finite() || rounded.abs() >= 9.2e18 {
                return Err(RuntimeError::overflow());
            }
            Ok(Value::Int(rounded as i64))
        }
        (Value::Float(f), Some(n)) => {
            let scale = 10f64.powi(i32::try_from(n).unwrap_or(i32::MAX).min(300));
            Ok(Value::Float((f * scale).round_ties_even() / scale))
        }
        (value, n) => {
            let i = value.as_int().ok_or_else(|| {
                RuntimeError::type_error(format!(
                    "type {} doesn't define __round__ method",
                    value.type_name()
                ))
            })?;
            match n {
                Some(n) if n < 0 => {
                    let scale = 10i64
                        .checked_pow(u32::try_from(-n).unwrap_or(u32::MAX))
                        .unwrap_or(i64::MAX);
                    let rounded = ((i as f64) / (scale as f64)).round_ties_even() * scale as f64;
                    Ok(Value::Int(rounded as i64))
                }
                _ => Ok(Value::Int(i)),
            }
        }
    }
}

fn divmod(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("divmod", 2, 2)?;
    let (a, b) = (&args.positional[0], &args.positional[1]);
    let quotient = ops::binary(BinOp::FloorDiv, a, b)?;
    let remainder = ops::binary(BinOp::Mod, a, b)?;
    Ok(Value::tuple(vec![quotient, remainder]))
}

fn pow(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("pow", 2, 3)?;
    let result = ops::binary(BinOp::Pow, &args.positional[0], &args.positional[1])?;
    match args.positional.get(2) {
        None | Some(Value::None) => Ok(result),
        Some(modulus) => ops::binary(BinOp::Mod, &result, modulus),
    }
}

fn min(interp: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    extreme(interp, args, "min", Ordering::Less)
}

fn max(interp: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    extreme(interp, args, "max", Ordering::Greater)
}

/// Shared body of `min` and `max`: keeps the first item that beats every
/// other in direction `wanted`.
fn extreme(
    interp: &mut Interpreter<'_>,
    args: Args,
    name: &str,
    wanted: Ordering,
) -> Exec<Value> {
    args.check_keywords(name, &["key", "default"])?;
    let key = args.keyword("key").filter(|k| !matches!(k, Value::None)).cloned();
    let default = args.keyword("default").cloned();
    let items = match args.positional.as_slice() {
        [] => {
            return Err(RuntimeError::type_error(format!(
                "{name} expected at least 1 argument, got 0"
            )));
        }
        [iterable] => ops::collect(iterable)?,
        many => many.to_vec(),
    };

    let mut best: Option<(Value, Value)> = None;
    for item in items {
        let score = match &key {
            Some(key) => call1(interp, key, item.clone())?,
            None => item.clone(),
        };
        let better = match &best {
            None => true,
            Some((_, best_score)) => ops::order("<", &score, best_score)? == Some(wanted),
        };
        if better {
            best = Some((item, score));
        }
    }
    match (best, default) {
        (Some((item, _)), _) => Ok(item),
        (None, Some(default)) => Ok(default),
        (None, None) => Err(RuntimeError::value_error(format!(
            "{name}() arg is an empty sequence"
        ))),
    }
}

fn sum(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("sum", 1, 2)?;
    args.check_keywords("sum", &["start"])?;
    let mut total = args
        .positional
        .get(1)
        .or_else(|| args.keyword("start"))
        .cloned()
        .unwrap_or(Value::Int(0));
    if matches!(total, Value::Str(_)) {
        return Err(RuntimeError::type_error(
            "sum() can't sum strings [use ''.join(seq) instead]",
        ));
    }
    for item in ops::iterate(&args.positional[0])? {
        total = ops::binary(BinOp::Add, &total, &item)?;
    }
    Ok(total)
}

fn hex(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("hex", 1, 1)?;
    let i = int_arg(&args.positional[0], "hex")?;
    Ok(Value::str(radix_string(i, "0x", |n| format!("{n:x}"))))
}

fn bin(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("bin", 1, 1)?;
    let i = int_arg(&args.positional[0], "bin")?;
    Ok(Value::str(radix_string(i, "0b", |n| format!("{n:b}"))))
}

/// Formats `i` with a sign, a radix prefix, and its magnitude.
fn radix_string(i: i64, prefix: &str, digits: impl Fn(u64) -> String) -> String {
    let sign = if i < 0 { "-" } else { "" };
    format!("{sign}{prefix}{}", digits(i.unsigned_abs()))
}

fn chr(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("chr", 1, 1)?;
    let i = int_arg(&args.positional[0], "chr")?;
    u32::try_from(i)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::str(c.to_string()))
        .ok_or_else(|| RuntimeError::value_error("chr() arg not in range(0x110000)"))
}

fn ord(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("ord", 1, 1)?;
    let s = str_arg(&args.positional[0], "ord")?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
        _ => Err(RuntimeError::type_error(format!(
            "ord() expected a character, but string of length {} found",
            s.chars().count()
        ))),
    }
}
