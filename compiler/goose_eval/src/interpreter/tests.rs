#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::print_handler::{buffer_handler, silent_handler};
use pretty_assertions::assert_eq;

fn build(source: &str) -> (Interpreter, SharedPrintHandler) {
    let module = goose_parse::parse_module(source).unwrap();
    let out = buffer_handler();
    let interp = InterpreterBuilder::new()
        .print_handler(out.clone())
        .error_handler(silent_handler())
        .parser(Arc::new(goose_parse::GooseParser))
        .build(module, SourceFile::new("test.goose", source))
        .unwrap();
    (interp, out)
}

fn run(source: &str) -> (RunOutcome, String) {
    let (mut interp, out) = build(source);
    let outcome = interp.run();
    (outcome, out.get_output())
}

fn output_of(source: &str) -> String {
    let (outcome, output) = run(source);
    assert!(
        outcome.error.is_none(),
        "unexpected error: {:?}",
        outcome.error.map(|e| e.message)
    );
    output
}

fn eval(interp: &mut Interpreter, expr: &str) -> Value {
    let expr = goose_parse::parse_expression(expr).unwrap();
    let scope = interp.main_scope();
    interp.evaluate_expression(&expr, scope).unwrap()
}

#[test]
fn test_compound_assignment() {
    assert_eq!(output_of("let x = 1; x += 2; print(x)"), "3");
}

#[test]
fn test_println_joins_arguments() {
    assert_eq!(output_of("println(1, \"a\", null)"), "1 a null\n");
}

#[test]
fn test_exit_code_from_exit() {
    let (outcome, output) = run("print(\"a\"); exit(3); print(\"b\")");
    assert_eq!(outcome.exit_code, 3);
    assert!(outcome.error.is_none());
    assert_eq!(output, "a");
}

#[test]
fn test_uncaught_error_panics_with_message() {
    let (outcome, _) = run("let x = 1 / 0");
    assert_eq!(outcome.exit_code, PANIC_EXIT_CODE);
    let error = outcome.error.unwrap();
    assert_eq!(error.message, "division by zero");
    assert!(error.span.is_some());
}

#[test]
fn test_undefined_variable() {
    let (outcome, _) = run("print(missing)");
    assert_eq!(outcome.error.unwrap().message, "missing is not defined");
}

#[test]
fn test_constant_cannot_be_reassigned() {
    let (outcome, _) = run("const k = 1\nk = 2");
    assert_eq!(outcome.error.unwrap().message, "cannot assign to constant k");
}

#[test]
fn test_builtins_cannot_be_redefined() {
    let (outcome, _) = run("let int = 1");
    assert_eq!(outcome.error.unwrap().message, "cannot redefine builtin int");
}

#[test]
fn test_try_catch_binds_thrown_value() {
    let source = "try\n  throw 42\ncatch as e\n  print(e + 1)\nend";
    assert_eq!(output_of(source), "43");
}

#[test]
fn test_catch_receives_runtime_error_message() {
    let source = "try\n  let x = 1 / 0\ncatch as e\n  print(e)\nend";
    assert_eq!(output_of(source), "division by zero");
}

#[test]
fn test_finally_runs_after_catch() {
    let source = "try\n  throw \"x\"\ncatch\n  print(\"c\")\nfinally\n  print(\"f\")\nend";
    assert_eq!(output_of(source), "cf");
}

#[test]
fn test_exit_is_not_caught() {
    let (outcome, output) = run("try\n  exit(5)\ncatch\n  print(\"caught\")\nend");
    assert_eq!(outcome.exit_code, 5);
    assert_eq!(output, "");
}

#[test]
fn test_struct_to_string_override() {
    let source = "struct Point(x, y) end\n\
                  fn Point.toString() -> \"(#x, #y)\"\n\
                  print(Point(1, 2))";
    assert_eq!(output_of(source), "(1, 2)");
}

#[test]
fn test_evaluate_expression_in_main_scope() {
    let (mut interp, _) = build("let base = 40\nfn add(a, b) -> a + b");
    assert!(interp.run().error.is_none());
    let value = eval(&mut interp, "add(base, 2)");
    assert_eq!(value.as_f64(), Some(42.0));
}

#[test]
fn test_calls_release_their_frames() {
    let (mut interp, _) = build("fn square(n) -> n * n");
    assert!(interp.run().error.is_none());
    let before = interp.scopes.read().live_count();
    for _ in 0..10 {
        eval(&mut interp, "square(3)");
    }
    assert_eq!(interp.scopes.read().live_count(), before);
}

#[test]
fn test_dropped_closures_release_their_frames() {
    let source = "fn work(a) -> len(a.map(fn(v) -> v * 2))\n\
                  fn nested(n)\n  fn helper() -> n + 1\n  return helper()\nend";
    let (mut interp, _) = build(source);
    assert!(interp.run().error.is_none());
    eval(&mut interp, "work([1, 2, 3])");
    let before = interp.scopes.read().live_count();
    for _ in 0..200 {
        assert_eq!(eval(&mut interp, "work([1, 2, 3])").as_f64(), Some(3.0));
        assert_eq!(eval(&mut interp, "nested(4)").as_f64(), Some(5.0));
    }
    assert_eq!(interp.scopes.read().live_count(), before);
}

#[test]
fn test_closure_keeps_captured_frame() {
    let source = "fn counter()\n  let n = 0\n  return fn() \n    n += 1\n    return n\n  end\nend\n\
                  let c = counter()\nc()\nc()\nprint(c())";
    assert_eq!(output_of(source), "3");
}

#[test]
fn test_to_string_of_primitives() {
    let (mut interp, _) = build("");
    let scope = interp.main_scope();
    assert_eq!(interp.to_string(&Value::Null, scope).unwrap(), "null");
    assert_eq!(interp.to_string(&Value::Bool(true), scope).unwrap(), "true");
    assert_eq!(interp.to_string(&Value::from(7), scope).unwrap(), "7");
    assert_eq!(interp.to_string(&Value::from("s"), scope).unwrap(), "s");
}

#[test]
fn test_values_equal_uses_operator_table() {
    let (mut interp, _) = build("");
    let scope = interp.main_scope();
    assert!(interp
        .values_equal(&Value::from(1), &Value::from(1), scope, Span::DUMMY)
        .unwrap());
    assert!(!interp
        .values_equal(&Value::from("a"), &Value::from("b"), scope, Span::DUMMY)
        .unwrap());
}

#[test]
fn test_operator_not_defined() {
    let (outcome, _) = run("let x = null + 1");
    assert_eq!(
        outcome.error.unwrap().message,
        "operator + not defined for types Null and Integer"
    );
}

#[test]
fn test_import_outside_top_level_is_rejected() {
    let (outcome, _) = run("fn f()\n  import \"std:math\"\nend\nf()");
    assert_eq!(
        outcome.error.unwrap().message,
        "import declarations must be at the top level"
    );
}

#[test]
fn test_worker_shares_program_state() {
    let (interp, _) = build("");
    let worker = interp.fork_for_worker();
    assert!(worker.scopes.ptr_eq(&interp.scopes));
    assert!(worker.modules.ptr_eq(&interp.modules));
    assert!(worker.natives.ptr_eq(&interp.natives));
    assert!(worker.yielder.is_none());
    assert_eq!(worker.main_scope(), interp.main_scope());
}

#[test]
fn test_debug_postfix_writes_to_error_handler() {
    let source = "let x = 2\nx?";
    let module = goose_parse::parse_module(source).unwrap();
    let errors = buffer_handler();
    let mut interp = InterpreterBuilder::new()
        .print_handler(silent_handler())
        .error_handler(errors.clone())
        .build(module, SourceFile::new("test.goose", source))
        .unwrap();
    assert!(interp.run().error.is_none());
    assert_eq!(errors.get_output(), "x = 2\n");
}
