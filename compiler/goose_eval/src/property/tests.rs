#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;

fn numbers() -> Value {
    Value::array(vec![Value::from(10), Value::from(20)])
}

#[test]
fn test_array_read_past_end_is_null() {
    let arr = numbers();
    assert!(get_property(&arr, &Value::from(1)).unwrap().is_identical(&Value::from(20)));
    assert!(matches!(get_property(&arr, &Value::from(2)).unwrap(), Value::Null));
    assert!(matches!(get_property(&arr, &Value::from(-1)).unwrap(), Value::Null));
}

#[test]
fn test_array_write_past_end_fails() {
    let arr = numbers();
    let err = set_property(&arr, &Value::from(2), Value::Null).unwrap_err();
    assert_eq!(err.message, "index 2 out of range");
    let err = set_property(&arr, &Value::from(-1), Value::Null).unwrap_err();
    assert_eq!(err.message, "index -1 out of range");
}

#[test]
fn test_array_write_requires_integer_key() {
    let err = set_property(&numbers(), &Value::from("a"), Value::Null).unwrap_err();
    assert_eq!(err.message, "cannot use String as an index");
}

#[test]
fn test_composite_key_spaces_are_distinct() {
    let obj = Value::object([]);
    set_property(&obj, &Value::from("1"), Value::from("text")).unwrap();
    set_property(&obj, &Value::from(1), Value::from("int")).unwrap();
    assert_eq!(
        get_property(&obj, &Value::from("1")).unwrap().as_str(),
        Some("text")
    );
    assert_eq!(get_property(&obj, &Value::from(1)).unwrap().as_str(), Some("int"));
}

#[test]
fn test_missing_property_walks_prototypes() {
    let obj = Value::object([]);
    assert!(matches!(
        get_named(&obj, "toString").unwrap(),
        Value::Func(_)
    ));
    assert!(matches!(get_named(&obj, "nope").unwrap(), Value::Null));
}

#[test]
fn test_property_of_null() {
    let err = get_named(&Value::Null, "x").unwrap_err();
    assert_eq!(err.message, "cannot access property x of null");
}

#[test]
fn test_frozen_composite_rejects_write() {
    let obj = Value::object([]);
    obj.freeze();
    let err = set_property(&obj, &Value::from("a"), Value::Null).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::FrozenValue);
}

#[test]
fn test_invalid_key_kind() {
    let err = get_property(&Value::object([]), &Value::Bool(true)).unwrap_err();
    assert_eq!(err.message, "cannot use Bool as a property key");
}

#[test]
fn test_string_index_is_char() {
    let s = Value::from("héllo");
    assert_eq!(get_property(&s, &Value::from(1)).unwrap().as_str(), Some("é"));
    assert!(matches!(get_property(&s, &Value::from(9)).unwrap(), Value::Null));
}
