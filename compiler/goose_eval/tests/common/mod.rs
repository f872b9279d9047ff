//! Shared helpers for the runtime integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::path::Path;
use std::sync::Arc;

use goose_eval::{buffer_handler, silent_handler, InterpreterBuilder, RunOutcome, Value};
use goose_ir::SourceFile;

/// Run `source` as a file called `name` and collect what it printed.
pub fn run_named(name: &str, source: &str) -> (RunOutcome, String) {
    let module = match goose_parse::parse_module(source) {
        Ok(module) => module,
        Err(errors) => panic!("parse errors in {name}: {errors:?}"),
    };
    let out = buffer_handler();
    let mut interp = InterpreterBuilder::new()
        .print_handler(out.clone())
        .error_handler(silent_handler())
        .parser(Arc::new(goose_parse::GooseParser))
        .build(module, SourceFile::new(name, source))
        .unwrap();
    let outcome = interp.run();
    (outcome, out.get_output())
}

pub fn run(source: &str) -> (RunOutcome, String) {
    run_named("test.goose", source)
}

pub fn run_file(path: &Path) -> (RunOutcome, String) {
    let source = std::fs::read_to_string(path).unwrap();
    run_named(&path.to_string_lossy(), &source)
}

/// Output of a program that must finish cleanly.
pub fn output_of(source: &str) -> String {
    let (outcome, output) = run(source);
    if let Some(error) = outcome.error {
        panic!("unexpected error: {}", error.message);
    }
    assert_eq!(outcome.exit_code, 0);
    output
}

/// Message of the error a program must fail with.
pub fn error_of(source: &str) -> String {
    let (outcome, _) = run(source);
    assert_eq!(outcome.exit_code, goose_eval::PANIC_EXIT_CODE);
    match outcome.error {
        Some(error) => error.message,
        None => panic!("expected an error"),
    }
}

/// Evaluate one expression against a fresh interpreter.
pub fn eval(expr: &str) -> Value {
    let module = goose_parse::parse_module("").unwrap();
    let mut interp = InterpreterBuilder::new()
        .print_handler(silent_handler())
        .error_handler(silent_handler())
        .build(module, SourceFile::new("expr.goose", ""))
        .unwrap();
    let expr = goose_parse::parse_expression(expr).unwrap();
    let scope = interp.main_scope();
    match interp.evaluate_expression(&expr, scope) {
        Ok(value) => value,
        Err(error) => panic!("evaluation failed: {}", error.message),
    }
}
