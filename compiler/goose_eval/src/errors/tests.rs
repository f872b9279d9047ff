use super::*;
use pretty_assertions::assert_eq;

#[test]
fn division_by_zero_has_correct_kind() {
    let err = division_by_zero();
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    assert_eq!(err.message, "division by zero");
}

#[test]
fn operator_not_defined_names_both_types() {
    let err = operator_not_defined("+", "Bool", "Array");
    assert_eq!(err.message, "operator + not defined for types Bool and Array");
}

#[test]
fn module_errors_name_symbol_and_module() {
    assert_eq!(
        undefined_export("missing", "./lib").message,
        "undefined export missing in module ./lib"
    );
    assert_eq!(
        not_exported("helper", "./lib").message,
        "value helper is defined locally in module ./lib but is not exported"
    );
    assert_eq!(
        native_missing("F/sqrt", "std:math").message,
        "native symbol F/sqrt not found in module std:math"
    );
}

#[test]
fn control_flow_is_not_catchable() {
    let err = EvalError::control(ControlFlow::Exit(3));
    assert!(err.is_control_flow());
    assert!(!err.is_catchable());
    assert!(!internal("stale scope").is_catchable());
    assert!(division_by_zero().is_catchable());
}

#[test]
fn stray_control_flow_message() {
    let err = stray_control_flow(&ControlFlow::Return(Value::Null), "top-level");
    assert_eq!(err.message, "cannot return from top-level");
    assert!(matches!(err.kind, EvalErrorKind::Internal { .. }));
}

#[test]
fn or_span_keeps_innermost() {
    let err = division_by_zero()
        .or_span(Span::new(4, 9))
        .or_span(Span::new(0, 20));
    assert_eq!(err.span, Some(Span::new(4, 9)));
}

#[test]
fn location_uses_attached_source() {
    let source = Arc::new(SourceFile::new("main.goose", "let a = 1\nlet b = a / 0\n"));
    let err = division_by_zero()
        .or_span(Span::new(18, 23))
        .or_source(Some(&source));
    assert_eq!(err.location().as_deref(), Some("main.goose:2:9"));
    assert_eq!(err.to_string(), "main.goose:2:9: division by zero");
}

#[test]
fn thrown_keeps_value() {
    let err = EvalError::thrown(Value::from("oops"), "oops");
    assert!(matches!(err.thrown, Some(Value::String(ref s)) if &**s == "oops"));
    assert!(err.is_catchable());
}
