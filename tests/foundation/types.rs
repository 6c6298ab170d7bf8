//! Integration tests for runtime type names

use adder_foundation::Type;

#[test]
fn user_visible_names() {
    assert_eq!(Type::NoneType.name(), "NoneType");
    assert_eq!(Type::Int.name(), "int");
    assert_eq!(Type::Str.name(), "str");
    assert_eq!(Type::BuiltinFunction.name(), "builtin_function_or_method");
}

#[test]
fn bool_is_an_int() {
    assert!(Type::Bool.is_subtype_of(Type::Int));
    assert!(!Type::Int.is_subtype_of(Type::Bool));
    assert!(Type::List.is_subtype_of(Type::List));
}

#[test]
fn constructible_types() {
    assert!(Type::List.is_constructible());
    assert!(!Type::Function.is_constructible());
    assert!(!Type::NoneType.is_constructible());
}
