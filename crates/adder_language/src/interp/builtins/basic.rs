//! Output, introspection and dynamic execution.

use super::{methods, str_arg};
use crate::exception::RuntimeError;
use crate::interp::{Interpreter, ops};
use crate::value::{Args, Exec, NativeFn, Value};

pub(super) const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("callable", callable),
    ("dir", dir),
    ("exec", exec),
    ("isinstance", isinstance),
    ("len", len),
    ("print", print),
    ("repr", repr),
];

/// `print(*values, sep=' ', end='\n')`
fn print(interp: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_keywords("print", &["sep", "end"])?;
    let text_of = |value: Option<&Value>, default: &str| -> Exec<String> {
        match value {
            None | Some(Value::None) => Ok(default.to_string()),
            Some(Value::Str(s)) => Ok(s.to_string()),
            Some(other) => Err(RuntimeError::type_error(format!(
                "sep and end must be None or a string, not {}",
                other.type_name()
            ))),
        }
    };
    let sep = text_of(args.keyword("sep"), " ")?;
    let end = text_of(args.keyword("end"), "\n")?;
    let parts: Vec<String> = args.positional.iter().map(Value::to_str).collect();
    interp.write(&format!("{}{end}", parts.join(sep.as_str())))?;
    Ok(Value::None)
}

/// `repr(object)`
fn repr(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("repr", 1, 1)?;
    Ok(Value::str(args.positional[0].repr()))
}

/// `len(object)`
fn len(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("len", 1, 1)?;
    let n = ops::length(&args.positional[0])?;
    Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
}

/// `isinstance(object, class_or_tuple)`
fn isinstance(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("isinstance", 2, 2)?;
    Ok(Value::Bool(is_instance(&args.positional[0], &args.positional[1])?))
}

fn is_instance(object: &Value, class: &Value) -> Exec<bool> {
    match class {
        Value::Type(ty) => Ok(object.ty().is_some_and(|t| t.is_subtype_of(*ty))),
        Value::ExceptionType(kind) => Ok(matches!(object, Value::Exception(e) if e.kind.is_subclass_of(*kind))),
        Value::Tuple(classes) => {
            for class in classes.iter() {
                if is_instance(object, class)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(RuntimeError::type_error(
            "isinstance() arg 2 must be a type or tuple of types",
        )),
    }
}

/// `callable(object)`
fn callable(_: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("callable", 1, 1)?;
    Ok(Value::Bool(matches!(
        args.positional[0],
        Value::Function(_)
            | Value::Builtin(_)
            | Value::Method(_)
            | Value::Type(_)
            | Value::ExceptionType(_)
    )))
}

/// `dir([object])`: visible names, or the attributes of `object`.
fn dir(interp: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("dir", 0, 1)?;
    let names: Vec<String> = match args.positional.first() {
        None => interp.visible_names(),
        Some(Value::Type(ty)) => methods::names_for(*ty)
            .iter()
            .map(|n| (*n).to_string())
            .collect(),
        Some(Value::Exception(_)) => vec!["args".to_string()],
        Some(object) => object
            .ty()
            .map(methods::names_for)
            .unwrap_or_default()
            .iter()
            .map(|n| (*n).to_string())
            .collect(),
    };
    Ok(Value::list(names.into_iter().map(Value::str).collect()))
}

/// `exec(source)`
fn exec(interp: &mut Interpreter<'_>, args: Args) -> Exec<Value> {
    args.check_count("exec", 1, 1)?;
    let source = str_arg(&args.positional[0], "exec")?.to_string();
    interp.exec_source(&source)
}
