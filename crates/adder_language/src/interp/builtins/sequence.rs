//! Iteration builtins and sorting.
//!
//! `map`, `filter`, `zip`, `enumerate` and `reversed` return lists rather
//! than lazy iterators.

use std::cmp::Ordering;

use super::call1;
use crate::exception::RuntimeError;
use crate::interp::{Interpreter, ops};
use crate::value::{Args, Exec, NativeFn, Value};

pub(super) const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("all", all),
    ("any", any),
    ("enumerate", enumerate),
    ("filter", filter),
    ("map", map),
    ("reversed", reversed),
    ("sorted", sorted),
    ("zip", zip),
];

fn sorted(interp: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("sorted", 1, 1)?;
    args.check_keywords("sorted", &["key", "reverse"])?;
    let items = ops::collect(&args.positional[0])?;
    let key = args.keyword("key").cloned();
    let reverse = args.keyword("reverse").is_some_and(Value::is_truthy);
    Ok(Value::list(sort_values(interp, items, key.as_ref(), reverse)?))
}

/// Stable sort with an optional key function.
///
/// A comparison that raises aborts the sort with that exception.
pub(super) fn sort_values(
    interp: &mut Interpreter<'_>,
    items: Vec<Value>,
    key: Option<&Value>,
    reverse: bool,
) -> Exec<Vec<Value>> {
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let score = match key {
            Some(key) if !matches!(key, Value::None) => call1(interp, key, item.clone())?,
            _ => item.clone(),
        };
        keyed.push((score, item));
    }
    let sorted = merge_sort(keyed, &mut |(a, _), (b, _)| {
        let ordering = ops::order("<", a, b)?.unwrap_or(Ordering::Equal);
        Ok(if reverse { ordering.reverse() } else { ordering })
    })?;
    Ok(sorted.into_iter().map(|(_, item)| item).collect())
}

/// Merge sort with a fallible comparator; stable.
fn merge_sort<T>(
    mut items: Vec<T>,
    compare: &mut impl FnMut(&T, &T) -> Exec<Ordering>,
) -> Exec<Vec<T>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare)?;
    let right = merge_sort(right, compare)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => compare(b, a)? == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    Ok(merged)
}

fn reversed(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("reversed", 1, 1)?;
    let mut items = ops::collect(&args.positional[0])?;
    items.reverse();
    Ok(Value::list(items))
}

fn enumerate(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("enumerate", 1, 2)?;
    let start = match args.positional.get(1).or_else(|| args.keyword("start")) {
        Some(value) => super::int_arg(value, "enumerate")?,
        None => 0,
    };
    let mut pairs = Vec::new();
    for (index, item) in (start..).zip(ops::iterate(&args.positional[0])?) {
        pairs.push(Value::tuple(vec![Value::Int(index), item]));
    }
    Ok(Value::list(pairs))
}

fn zip(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    let columns = args
        .positional
        .iter()
        .map(ops::collect)
        .collect::<Exec<Vec<_>>>()?;
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    let zipped = (0..rows)
        .map(|row| Value::tuple(columns.iter().map(|c| c[row].clone()).collect()))
        .collect();
    Ok(Value::list(zipped))
}

fn map(interp: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    let Some((func, iterables)) = args.positional.split_first() else {
        return Err(RuntimeError::type_error("map() must have at least two arguments."));
    };
    if iterables.is_empty() {
        return Err(RuntimeError::type_error("map() must have at least two arguments."));
    }
    let columns = iterables
        .iter()
        .map(ops::collect)
        .collect::<Exec<Vec<_>>>()?;
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    let mut results = Vec::with_capacity(rows);
    for row in 0..rows {
        let call_args = columns.iter().map(|c| c[row].clone()).collect();
        results.push(interp.call(func, Args::positional(call_args))?);
    }
    Ok(Value::list(results))
}

fn filter(interp: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("filter", 2, 2)?;
    let predicate = &args.positional[0];
    let mut kept = Vec::new();
    for item in ops::iterate(&args.positional[1])? {
        let keep = match predicate {
            Value::None => item.is_truthy(),
            predicate => call1(interp, predicate, item.clone())?.is_truthy(),
        };
        if keep {
            kept.push(item);
        }
    }
    Ok(Value::list(kept))
}

fn any(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("any", 1, 1)?;
    Ok(Value::Bool(ops::iterate(&args.positional[0])?.any(|v| v.is_truthy())))
}

fn all(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("all", 1, 1)?;
    Ok(Value::Bool(ops::iterate(&args.positional[0])?.all(|v| v.is_truthy())))
}
