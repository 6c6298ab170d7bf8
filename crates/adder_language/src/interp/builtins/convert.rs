//! Type constructors: calling `int`, `str`, `list`, ... as functions.

use adder_foundation::Type;

use super::{int_arg, str_arg};
use crate::exception::{ExceptionType, RuntimeError};
use crate::interp::{Interpreter, ops};
use crate::value::{Args, Dict, Exec, Range, Value};

/// Calls a builtin type.
pub(in crate::interp) fn construct(
    _interp: &mut Interpreter<'_>,
    ty: Type,
    args: Args,
) -> Exec<Value> {
    let name = ty.name();
    if ty != Type::Dict && ty != Type::Int {
        args.check_keywords(name, &[])?;
    }
    match ty {
        Type::Bool => {
            args.check_count(name, 0, 1)?;
            Ok(Value::Bool(args.positional.first().is_some_and(Value::is_truthy)))
        }
        Type::Int => to_int(&args),
        Type::Float => {
            args.check_count(name, 0, 1)?;
            args.positional.first().map_or(Ok(Value::Float(0.0)), to_float)
        }
        Type::Str => {
            args.check_count(name, 0, 1)?;
            Ok(Value::str(
                args.positional.first().map(Value::to_str).unwrap_or_default(),
            ))
        }
        Type::List => {
            args.check_count(name, 0, 1)?;
            let items = match args.positional.first() {
                Some(iterable) => ops::collect(iterable)?,
                None => Vec::new(),
            };
            Ok(Value::list(items))
        }
        Type::Tuple => {
            args.check_count(name, 0, 1)?;
            match args.positional.first() {
                Some(Value::Tuple(items)) => Ok(Value::Tuple(items.clone())),
                Some(iterable) => Ok(Value::tuple(ops::collect(iterable)?)),
                None => Ok(Value::tuple(Vec::new())),
            }
        }
        Type::Dict => to_dict(args),
        Type::Range => to_range(&args),
        Type::Type => {
            args.check_count(name, 1, 1)?;
            Ok(args.positional[0].class())
        }
        Type::NoneType | Type::Function | Type::BuiltinFunction => Err(
            RuntimeError::type_error(format!("cannot create '{name}' instances")),
        ),
    }
}

/// `int(x=0)` or `int(string, base=10)`
#[allow(clippy::cast_possible_truncation)]
fn to_int(args: &Args) -> Exec<Value> {
    args.check_count("int", 0, 2)?;
    args.check_keywords("int", &["base"])?;
    let base = match args.positional.get(1).or_else(|| args.keyword("base")) {
        Some(base) => Some(int_arg(base, "int")?),
        None => None,
    };
    let Some(value) = args.positional.first() else {
        return Ok(Value::Int(0));
    };

    if let Some(base) = base {
        let text = str_arg(value, "int").map_err(|_| {
            RuntimeError::type_error("int() can't convert non-string with explicit base")
        })?;
        return parse_int(text, base);
    }

    match value {
        Value::Int(_) | Value::Bool(_) => Ok(Value::Int(value.as_int().unwrap_or_default())),
        Value::Float(f) => {
            if f.is_nan() {
                return Err(RuntimeError::value_error(
                    "cannot convert float NaN to integer",
                ));
            }
            if f.is_infinite() || f.abs() >= 9.2e18 {
                return Err(RuntimeError::new(
                    ExceptionType::OverflowError,
                    "cannot convert float infinity to integer",
                ));
            }
            Ok(Value::Int(f.trunc() as i64))
        }
        Value::Str(s) => parse_int(s, 10),
        _ => Err(RuntimeError::type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            value.type_name()
        ))),
    }
}

/// Parses an integer literal the way `int(text, base)` does.
fn parse_int(text: &str, base: i64) -> Exec<Value> {
    let invalid = || {
        RuntimeError::value_error(format!(
            "invalid literal for int() with base {base}: {}",
            Value::str(text).repr()
        ))
    };
    if base != 0 && !(2..=36).contains(&base) {
        return Err(RuntimeError::value_error("int() base must be >= 2 and <= 36, or 0"));
    }

    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let lower = digits.to_ascii_lowercase();
    let prefixed = |prefix: &str, radix: i64| {
        lower
            .strip_prefix(prefix)
            .filter(|_| base == radix || base == 0)
            .map(|rest| (rest.to_string(), radix))
    };
    let (digits, radix) = prefixed("0x", 16)
        .or_else(|| prefixed("0o", 8))
        .or_else(|| prefixed("0b", 2))
        .unwrap_or_else(|| (lower.clone(), if base == 0 { 10 } else { base }));

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err(invalid());
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    let radix = u32::try_from(radix).map_err(|_| invalid())?;
    let magnitude = u64::from_str_radix(&cleaned, radix).map_err(|e| {
        use std::num::IntErrorKind;
        match e.kind() {
            IntErrorKind::PosOverflow => RuntimeError::overflow(),
            _ => invalid(),
        }
    })?;
    let value = if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    };
    value.map(Value::Int).ok_or_else(RuntimeError::overflow)
}

/// `float(x)`
fn to_float(value: &Value) -> Exec<Value> {
    if let Some(f) = value.as_float() {
        return Ok(Value::Float(f));
    }
    let Value::Str(s) = value else {
        return Err(RuntimeError::type_error(format!(
            "float() argument must be a string or a number, not '{}'",
            value.type_name()
        )));
    };
    let text = s.trim().to_ascii_lowercase();
    let parsed = match text.trim_start_matches(['+', '-']) {
        "inf" | "infinity" | "nan" => text.replace("infinity", "inf").parse::<f64>().ok(),
        _ => text.replace('_', "").parse::<f64>().ok(),
    };
    parsed.map(Value::Float).ok_or_else(|| {
        RuntimeError::value_error(format!(
            "could not convert string to float: {}",
            value.repr()
        ))
    })
}

/// `dict(mapping_or_pairs, **kwargs)`
fn to_dict(args: Args) -> Exec<Value> {
    args.check_count("dict", 0, 1)?;
    let mut dict = Dict::new();
    match args.positional.first() {
        None => {}
        Some(Value::Dict(source)) => {
            for (key, value) in source.borrow().iter() {
                dict.insert(key.clone(), value.clone())?;
            }
        }
        Some(pairs) => {
            for (index, pair) in ops::iterate(pairs)?.enumerate() {
                let items = ops::collect(&pair)?;
                let [key, value] = <[Value; 2]>::try_from(items).map_err(|items| {
                    RuntimeError::value_error(format!(
                        "dictionary update sequence element #{index} has length {}; 2 is required",
                        items.len()
                    ))
                })?;
                dict.insert(key, value)?;
            }
        }
    }
    for (key, value) in args.keywords {
        dict.insert(Value::str(key), value)?;
    }
    Ok(Value::dict(dict))
}

/// `range(stop)` or `range(start, stop[, step])`
fn to_range(args: &Args) -> Exec<Value> {
    args.check_count("range", 1, 3)?;
    let ints = args
        .positional
        .iter()
        .map(|v| {
            v.as_int().ok_or_else(|| {
                RuntimeError::type_error(format!(
                    "'{}' object cannot be interpreted as an integer",
                    v.type_name()
                ))
            })
        })
        .collect::<Exec<Vec<i64>>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => (0, 0, 1),
    };
    if step == 0 {
        return Err(RuntimeError::value_error("range() arg 3 must not be zero"));
    }
    Ok(Value::Range(Range { start, stop, step }))
}
