//! Methods of the builtin container types.

use adder_foundation::Type;

use super::{int_arg, sequence::sort_values, str_arg};
use crate::exception::RuntimeError;
use crate::interp::{Interpreter, ops};
use crate::value::{Args, Dict, Exec, MethodFn, Value, format_float};

const STR_METHODS: &[(&str, MethodFn)] = &[
    ("count", str_count),
    ("endswith", str_endswith),
    ("find", str_find),
    ("format", str_format),
    ("isalpha", str_isalpha),
    ("isdigit", str_isdigit),
    ("isspace", str_isspace),
    ("join", str_join),
    ("lower", str_lower),
    ("lstrip", str_lstrip),
    ("replace", str_replace),
    ("rstrip", str_rstrip),
    ("split", str_split),
    ("startswith", str_startswith),
    ("strip", str_strip),
    ("upper", str_upper),
];

const LIST_METHODS: &[(&str, MethodFn)] = &[
    ("append", list_append),
    ("clear", list_clear),
    ("copy", list_copy),
    ("count", list_count),
    ("extend", list_extend),
    ("index", list_index),
    ("insert", list_insert),
    ("pop", list_pop),
    ("remove", list_remove),
    ("reverse", list_reverse),
    ("sort", list_sort),
];

const DICT_METHODS: &[(&str, MethodFn)] = &[
    ("clear", dict_clear),
    ("copy", dict_copy),
    ("get", dict_get),
    ("items", dict_items),
    ("keys", dict_keys),
    ("pop", dict_pop),
    ("setdefault", dict_setdefault),
    ("update", dict_update),
    ("values", dict_values),
];

const fn table(ty: Type) -> &'static [(&'static str, MethodFn)] {
    match ty {
        Type::Str => STR_METHODS,
        Type::List => LIST_METHODS,
        Type::Dict => DICT_METHODS,
        _ => &[],
    }
}

/// Finds the method `name` on `value`'s type.
pub(in crate::interp) fn lookup(value: &Value, name: &str) -> Option<(&'static str, MethodFn)> {
    table(value.ty()?)
        .iter()
        .find(|(method, _)| *method == name)
        .copied()
}

/// Returns the method names of a type, sorted.
pub(super) fn names_for(ty: Type) -> Vec<&'static str> {
    table(ty).iter().map(|(name, _)| *name).collect()
}

// =============================================================================
// str
// =============================================================================

fn receiver_str(value: &Value) -> Exec<&str> {
    match value {
        Value::Str(s) => Ok(s),
        _ => Err(RuntimeError::type_error("descriptor requires a 'str' object")),
    }
}

/// Returns the optional `chars` argument of the strip family.
fn strip_chars(args: &Args, name: &str) -> Exec<Option<Vec<char>>> {
    args.check_count(name, 0, 1)?;
    match args.positional.first() {
        None | Some(Value::None) => Ok(None),
        Some(chars) => Ok(Some(str_arg(chars, name)?.chars().collect())),
    }
}

fn str_strip(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    let s = receiver_str(this)?;
    Ok(Value::str(match strip_chars(&args, "strip")? {
        Some(chars) => s.trim_matches(chars.as_slice()),
        None => s.trim(),
    }))
}

fn str_lstrip(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    let s = receiver_str(this)?;
    Ok(Value::str(match strip_chars(&args, "lstrip")? {
        Some(chars) => s.trim_start_matches(chars.as_slice()),
        None => s.trim_start(),
    }))
}

fn str_rstrip(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    let s = receiver_str(this)?;
    Ok(Value::str(match strip_chars(&args, "rstrip")? {
        Some(chars) => s.trim_end_matches(chars.as_slice()),
        None => s.trim_end(),
    }))
}

fn str_upper(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("upper", 0, 0)?;
    Ok(Value::str(receiver_str(this)?.to_uppercase()))
}

fn str_lower(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("lower", 0, 0)?;
    Ok(Value::str(receiver_str(this)?.to_lowercase()))
}

fn str_isdigit(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("isdigit", 0, 0)?;
    let s = receiver_str(this)?;
    Ok(Value::Bool(!s.is_empty() && s.chars().all(|c| c.is_ascii_digit())))
}

fn str_isalpha(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("isalpha", 0, 0)?;
    let s = receiver_str(this)?;
    Ok(Value::Bool(!s.is_empty() && s.chars().all(char::is_alphabetic)))
}

fn str_isspace(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("isspace", 0, 0)?;
    let s = receiver_str(this)?;
    Ok(Value::Bool(!s.is_empty() && s.chars().all(char::is_whitespace)))
}

/// `str.split(sep=None, maxsplit=-1)`
fn str_split(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("split", 0, 2)?;
    args.check_keywords("split", &["sep", "maxsplit"])?;
    let s = receiver_str(this)?;
    let sep = args.positional.first().or_else(|| args.keyword("sep"));
    let maxsplit = match args.positional.get(1).or_else(|| args.keyword("maxsplit")) {
        Some(value) => int_arg(value, "split")?,
        None => -1,
    };
    let limit = usize::try_from(maxsplit).ok();

    let parts: Vec<String> = match sep {
        None | Some(Value::None) => split_whitespace(s, limit),
        Some(sep) => {
            let sep = str_arg(sep, "split")?;
            if sep.is_empty() {
                return Err(RuntimeError::value_error("empty separator"));
            }
            match limit {
                Some(n) => s.splitn(n + 1, sep).map(str::to_string).collect(),
                None => s.split(sep).map(str::to_string).collect(),
            }
        }
    };
    Ok(Value::list(parts.into_iter().map(Value::str).collect()))
}

/// Splits on runs of whitespace, at most `limit` times.
fn split_whitespace(s: &str, limit: Option<usize>) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if limit.is_some_and(|n| parts.len() == n) {
            parts.push(rest.to_string());
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        parts.push(rest[..end].to_string());
        rest = rest[end..].trim_start();
    }
    parts
}

fn str_join(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("join", 1, 1)?;
    let sep = receiver_str(this)?;
    let mut parts = Vec::new();
    for (index, item) in ops::iterate(&args.positional[0])?.enumerate() {
        match item {
            Value::Str(s) => parts.push(s.to_string()),
            other => {
                return Err(RuntimeError::type_error(format!(
                    "sequence item {index}: expected str instance, {} found",
                    other.type_name()
                )));
            }
        }
    }
    Ok(Value::str(parts.join(sep)))
}

/// Checks a prefix or suffix argument, which may be a tuple of strings.
fn affix_matches(
    affix: &Value,
    name: &str,
    test: &dyn Fn(&str) -> bool,
) -> Exec<bool> {
    match affix {
        Value::Tuple(options) => {
            for option in options.iter() {
                if test(str_arg(option, name)?) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        single => Ok(test(str_arg(single, name)?)),
    }
}

fn str_startswith(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("startswith", 1, 1)?;
    let s = receiver_str(this)?;
    let found = affix_matches(&args.positional[0], "startswith", &|p| s.starts_with(p))?;
    Ok(Value::Bool(found))
}

fn str_endswith(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("endswith", 1, 1)?;
    let s = receiver_str(this)?;
    let found = affix_matches(&args.positional[0], "endswith", &|p| s.ends_with(p))?;
    Ok(Value::Bool(found))
}

fn str_replace(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("replace", 2, 3)?;
    let s = receiver_str(this)?;
    let old = str_arg(&args.positional[0], "replace")?;
    let new = str_arg(&args.positional[1], "replace")?;
    let count = match args.positional.get(2) {
        Some(count) => usize::try_from(int_arg(count, "replace")?).ok(),
        None => None,
    };
    Ok(Value::str(match count {
        Some(n) => s.replacen(old, new, n),
        None => s.replace(old, new),
    }))
}

fn str_find(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("find", 1, 1)?;
    let s = receiver_str(this)?;
    let needle = str_arg(&args.positional[0], "find")?;
    let index = s
        .find(needle)
        .map_or(-1, |byte| i64::try_from(s[..byte].chars().count()).unwrap_or(-1));
    Ok(Value::Int(index))
}

fn str_count(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("count", 1, 1)?;
    let s = receiver_str(this)?;
    let needle = str_arg(&args.positional[0], "count")?;
    let count = if needle.is_empty() {
        s.chars().count() + 1
    } else {
        s.matches(needle).count()
    };
    Ok(Value::Int(i64::try_from(count).unwrap_or(i64::MAX)))
}

/// `str.format(*args, **kwargs)` with `{}`, `{0}`, `{name}` fields and the
/// `d`, `.Nf` and `s` format specs.
fn str_format(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    let template = receiver_str(this)?;
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut auto_index = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => field.push(c),
                        None => {
                            return Err(RuntimeError::value_error(
                                "expected '}' before end of string",
                            ));
                        }
                    }
                }
                let (name, spec) = field.split_once(':').unwrap_or((&field, ""));
                let index = if name.is_empty() {
                    auto_index += 1;
                    Some(auto_index - 1)
                } else {
                    name.parse::<usize>().ok()
                };
                let value = match index {
                    Some(index) => args.positional.get(index).ok_or_else(|| {
                        RuntimeError::index_error(
                            "Replacement index out of range for positional args tuple",
                        )
                    })?,
                    None => args
                        .keyword(name)
                        .ok_or_else(|| RuntimeError::key_error(Value::str(name)))?,
                };
                out.push_str(&format_spec(value, spec)?);
            }
            '}' => {
                return Err(RuntimeError::value_error(
                    "Single '}' encountered in format string",
                ));
            }
            c => out.push(c),
        }
    }
    Ok(Value::str(out))
}

fn format_spec(value: &Value, spec: &str) -> Exec<String> {
    if spec.is_empty() || spec == "s" {
        return Ok(value.to_str());
    }
    if spec == "d" {
        return value
            .as_int()
            .map(|i| i.to_string())
            .ok_or_else(|| unknown_format(spec, value));
    }
    if let Some(precision) = spec
        .strip_prefix('.')
        .and_then(|p| p.strip_suffix('f'))
        .and_then(|p| p.parse::<usize>().ok())
    {
        return value
            .as_float()
            .map(|f| format!("{f:.precision$}"))
            .ok_or_else(|| unknown_format(spec, value));
    }
    if spec == "r" {
        return Ok(value.repr());
    }
    if spec == "g" {
        return value
            .as_float()
            .map(format_float)
            .ok_or_else(|| unknown_format(spec, value));
    }
    Err(unknown_format(spec, value))
}

fn unknown_format(spec: &str, value: &Value) -> RuntimeError {
    RuntimeError::value_error(format!(
        "Unknown format code '{spec}' for object of type '{}'",
        value.type_name()
    ))
}

// =============================================================================
// list
// =============================================================================

fn receiver_list(value: &Value) -> Exec<&std::cell::RefCell<Vec<Value>>> {
    match value {
        Value::List(items) => Ok(items),
        _ => Err(RuntimeError::type_error("descriptor requires a 'list' object")),
    }
}

fn list_append(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("append", 1, 1)?;
    let mut positional = args.positional;
    receiver_list(this)?.borrow_mut().extend(positional.pop());
    Ok(Value::None)
}

fn list_extend(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("extend", 1, 1)?;
    let items = ops::collect(&args.positional[0])?;
    receiver_list(this)?.borrow_mut().extend(items);
    Ok(Value::None)
}

fn list_insert(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("insert", 2, 2)?;
    let index = int_arg(&args.positional[0], "insert")?;
    let mut items = receiver_list(this)?.borrow_mut();
    let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
    let position = if index < 0 { (index + len).max(0) } else { index.min(len) };
    items.insert(usize::try_from(position).unwrap_or(0), args.positional[1].clone());
    Ok(Value::None)
}

fn list_pop(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("pop", 0, 1)?;
    let mut items = receiver_list(this)?.borrow_mut();
    if items.is_empty() {
        return Err(RuntimeError::index_error("pop from empty list"));
    }
    let index = match args.positional.first() {
        Some(index) => int_arg(index, "pop")?,
        None => -1,
    };
    let i = ops::normalize_index(index, items.len())
        .ok_or_else(|| RuntimeError::index_error("pop index out of range"))?;
    Ok(items.remove(i))
}

fn list_remove(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("remove", 1, 1)?;
    let target = &args.positional[0];
    let mut items = receiver_list(this)?.borrow_mut();
    let position = items
        .iter()
        .position(|x| ops::identical(x, target) || ops::equal(x, target))
        .ok_or_else(|| RuntimeError::value_error("list.remove(x): x not in list"))?;
    items.remove(position);
    Ok(Value::None)
}

fn list_index(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("index", 1, 1)?;
    let target = &args.positional[0];
    let items = receiver_list(this)?.borrow();
    items
        .iter()
        .position(|x| ops::identical(x, target) || ops::equal(x, target))
        .map(|i| Value::Int(i64::try_from(i).unwrap_or(i64::MAX)))
        .ok_or_else(|| RuntimeError::value_error(format!("{} is not in list", target.repr())))
}

fn list_count(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("count", 1, 1)?;
    let target = &args.positional[0];
    let count = receiver_list(this)?
        .borrow()
        .iter()
        .filter(|x| ops::identical(x, target) || ops::equal(x, target))
        .count();
    Ok(Value::Int(i64::try_from(count).unwrap_or(i64::MAX)))
}

fn list_reverse(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("reverse", 0, 0)?;
    receiver_list(this)?.borrow_mut().reverse();
    Ok(Value::None)
}

fn list_clear(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("clear", 0, 0)?;
    receiver_list(this)?.borrow_mut().clear();
    Ok(Value::None)
}

fn list_copy(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("copy", 0, 0)?;
    Ok(Value::list(receiver_list(this)?.borrow().clone()))
}

/// `list.sort(key=None, reverse=False)`; sorts a snapshot so the key function
/// may read the list.
fn list_sort(interp: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("sort", 0, 0)?;
    args.check_keywords("sort", &["key", "reverse"])?;
    let list = receiver_list(this)?;
    let items = list.borrow().clone();
    let reverse = args.keyword("reverse").is_some_and(Value::is_truthy);
    let sorted = sort_values(interp, items, args.keyword("key"), reverse)?;
    *list.borrow_mut() = sorted;
    Ok(Value::None)
}

// =============================================================================
// dict
// =============================================================================

fn receiver_dict(value: &Value) -> Exec<&std::cell::RefCell<Dict>> {
    match value {
        Value::Dict(dict) => Ok(dict),
        _ => Err(RuntimeError::type_error("descriptor requires a 'dict' object")),
    }
}

fn dict_keys(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("keys", 0, 0)?;
    Ok(Value::list(receiver_dict(this)?.borrow().keys()))
}

fn dict_values(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("values", 0, 0)?;
    Ok(Value::list(receiver_dict(this)?.borrow().values()))
}

fn dict_items(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("items", 0, 0)?;
    let items = receiver_dict(this)?
        .borrow()
        .iter()
        .map(|(k, v)| Value::tuple(vec![k.clone(), v.clone()]))
        .collect();
    Ok(Value::list(items))
}

fn dict_get(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("get", 1, 2)?;
    let found = receiver_dict(this)?.borrow().get(&args.positional[0])?;
    Ok(found
        .or_else(|| args.positional.get(1).cloned())
        .unwrap_or(Value::None))
}

fn dict_pop(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("pop", 1, 2)?;
    let key = &args.positional[0];
    let removed = receiver_dict(this)?.borrow_mut().remove(key)?;
    removed
        .or_else(|| args.positional.get(1).cloned())
        .ok_or_else(|| RuntimeError::key_error(key.clone()))
}

fn dict_setdefault(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("setdefault", 1, 2)?;
    let dict = receiver_dict(this)?;
    let key = &args.positional[0];
    if let Some(existing) = dict.borrow().get(key)? {
        return Ok(existing);
    }
    let default = args.positional.get(1).cloned().unwrap_or(Value::None);
    dict.borrow_mut().insert(key.clone(), default.clone())?;
    Ok(default)
}

fn dict_update(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("update", 0, 1)?;
    let dict = receiver_dict(this)?;
    let mut entries = Vec::new();
    match args.positional.first() {
        Some(Value::Dict(other)) => {
            entries.extend(other.borrow().iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Some(pairs) => {
            for pair in ops::iterate(pairs)? {
                let items = ops::collect(&pair)?;
                let [key, value] = <[Value; 2]>::try_from(items).map_err(|_| {
                    RuntimeError::value_error("dictionary update sequence element has wrong length")
                })?;
                entries.push((key, value));
            }
        }
        None => {}
    }
    for (key, value) in args.keywords {
        entries.push((Value::str(key), value));
    }
    let mut dict = dict.borrow_mut();
    for (key, value) in entries {
        dict.insert(key, value)?;
    }
    Ok(Value::None)
}

fn dict_clear(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("clear", 0, 0)?;
    receiver_dict(this)?.borrow_mut().clear();
    Ok(Value::None)
}

fn dict_copy(_: &mut Interpreter<'_>, this: &Value, args: Args) -> Exec<Value> {
    args.check_count("copy", 0, 0)?;
    Ok(Value::dict(receiver_dict(this)?.borrow().clone()))
}
