//! Command handlers. Each returns the process exit code.

use std::path::PathBuf;
use std::sync::Arc;

use goose_eval::{InterpreterBuilder, RunOutcome};
use goose_ir::SourceFile;
use goose_parse::GooseParser;

use crate::diagnostics::{report_eval_error, report_parse_errors};

/// Exit code for failures before the program starts (unreadable file,
/// syntax errors).
const USAGE_EXIT_CODE: i32 = 1;

/// Flags shared by every command.
#[derive(Debug, Default)]
pub struct Options {
    pub trace: bool,
    pub root: Option<PathBuf>,
}

impl Options {
    fn builder(&self) -> InterpreterBuilder {
        let mut builder = InterpreterBuilder::new()
            .trace(self.trace)
            .parser(Arc::new(GooseParser));
        if let Some(root) = &self.root {
            builder = builder.goose_root(root.clone());
        }
        builder
    }
}

fn read_source(path: &str) -> Option<SourceFile> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(SourceFile::new(path, text)),
        Err(err) => {
            eprintln!("error: cannot read {path}: {err}");
            None
        }
    }
}

/// `goose run FILE`
pub fn run_file(path: &str, options: &Options) -> i32 {
    let Some(source) = read_source(path) else {
        return USAGE_EXIT_CODE;
    };
    let module = match goose_parse::parse_module(source.text()) {
        Ok(module) => module,
        Err(errors) => {
            report_parse_errors(&source, &errors);
            return USAGE_EXIT_CODE;
        }
    };
    let mut interp = match options.builder().build(module, source.clone()) {
        Ok(interp) => interp,
        Err(err) => {
            report_eval_error(&err, &source);
            return goose_eval::PANIC_EXIT_CODE;
        }
    };

    let RunOutcome { exit_code, error } = interp.run();
    if let Some(err) = error {
        report_eval_error(&err, &source);
    }
    tracing::debug!(exit_code, "program finished");
    exit_code
}

/// `goose eval EXPR`: print the value's string form.
pub fn eval_expression(expr: &str, options: &Options) -> i32 {
    let source = SourceFile::new("<eval>", expr);
    let parsed = goose_parse::parse_expression(expr)
        .and_then(|expr| goose_parse::parse_module("").map(|module| (expr, module)));
    let (expr, module) = match parsed {
        Ok(parsed) => parsed,
        Err(errors) => {
            report_parse_errors(&source, &errors);
            return USAGE_EXIT_CODE;
        }
    };
    let mut interp = match options.builder().build(module, source.clone()) {
        Ok(interp) => interp,
        Err(err) => {
            report_eval_error(&err, &source);
            return goose_eval::PANIC_EXIT_CODE;
        }
    };

    let scope = interp.main_scope();
    let rendered = interp
        .evaluate_expression(&expr, scope)
        .and_then(|value| interp.to_string(&value, scope));
    match rendered {
        Ok(text) => {
            println!("{text}");
            0
        }
        Err(err) => match err.control_flow {
            Some(goose_eval::ControlFlow::Exit(code)) => code,
            _ => {
                report_eval_error(&err, &source);
                goose_eval::PANIC_EXIT_CODE
            }
        },
    }
}

/// `goose parse FILE`: dump the syntax tree.
pub fn parse_file(path: &str) -> i32 {
    let Some(source) = read_source(path) else {
        return USAGE_EXIT_CODE;
    };
    match goose_parse::parse_module(source.text()) {
        Ok(module) => {
            println!("{module:#?}");
            0
        }
        Err(errors) => {
            report_parse_errors(&source, &errors);
            USAGE_EXIT_CODE
        }
    }
}
