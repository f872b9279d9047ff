//! `std:fs`

use std::fs;
use std::io::Write;

use super::NativeModule;
use crate::errors::{EvalError, EvalResult};
use crate::value::{FuncContext, Value};

pub(super) fn module() -> NativeModule {
    NativeModule::new("std:fs")
        .func("readFile", read_file)
        .func("writeFile", write_file)
        .func("appendFile", append_file)
        .func("deleteFile", delete_file)
        .func("exists", exists)
}

fn io_error(operation: &str, path: &str, err: &std::io::Error) -> EvalError {
    EvalError::new(format!("{operation}: {path}: {err}"))
}

fn read_file(ctx: &mut FuncContext<'_>) -> EvalResult {
    let path = ctx.str_arg(0, "readFile(path)")?;
    fs::read_to_string(&*path)
        .map(Value::from)
        .map_err(|err| io_error("readFile", &path, &err))
}

fn write_file(ctx: &mut FuncContext<'_>) -> EvalResult {
    let path = ctx.str_arg(0, "writeFile(path, text)")?;
    let text = ctx.arg(1);
    let text = ctx.stringify(&text)?;
    fs::write(&*path, text).map_err(|err| io_error("writeFile", &path, &err))?;
    Ok(Value::Null)
}

fn append_file(ctx: &mut FuncContext<'_>) -> EvalResult {
    let path = ctx.str_arg(0, "appendFile(path, text)")?;
    let text = ctx.arg(1);
    let text = ctx.stringify(&text)?;
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&*path)
        .and_then(|mut file| file.write_all(text.as_bytes()))
        .map_err(|err| io_error("appendFile", &path, &err))?;
    Ok(Value::Null)
}

fn delete_file(ctx: &mut FuncContext<'_>) -> EvalResult {
    let path = ctx.str_arg(0, "deleteFile(path)")?;
    fs::remove_file(&*path).map_err(|err| io_error("deleteFile", &path, &err))?;
    Ok(Value::Null)
}

fn exists(ctx: &mut FuncContext<'_>) -> EvalResult {
    let path = ctx.str_arg(0, "exists(path)")?;
    Ok(Value::Bool(std::path::Path::new(&*path).exists()))
}
