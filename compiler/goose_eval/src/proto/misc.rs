//! Prototypes for `Bool`, `Null`, `Symbol`, `Func` and ranges.

use goose_ir::Op;

use super::{wrong_receiver, ProtoBuilder};
use crate::errors::EvalResult;
use crate::value::{CompositeRef, FuncContext, Value};

pub(super) fn build_bool(builder: ProtoBuilder) -> CompositeRef {
    builder.method("toString", bool_to_string).finish()
}

pub(super) fn build_null(builder: ProtoBuilder) -> CompositeRef {
    builder
        .method("toString", null_to_string)
        .operator(Op::Eq, null_eq)
        .operator(Op::LogNot, null_not)
        .finish()
}

pub(super) fn build_symbol(builder: ProtoBuilder) -> CompositeRef {
    builder.method("toString", symbol_to_string).finish()
}

pub(super) fn build_func(builder: ProtoBuilder) -> CompositeRef {
    builder
        .method("toString", func_to_string)
        .method("bind", func_bind)
        .method("call", func_call)
        .finish()
}

pub(super) fn build_range(builder: ProtoBuilder) -> CompositeRef {
    builder
        .method("toString", range_to_string)
        .method("contains", range_contains)
        .method("toArray", range_to_array)
        .finish()
}

fn bool_to_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    match ctx.this {
        Value::Bool(b) => Ok(Value::from(if b { "true" } else { "false" })),
        _ => Err(wrong_receiver(ctx, "Bool")),
    }
}

fn null_to_string(_: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::from("null"))
}

fn null_eq(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::Bool(matches!(ctx.args.first(), Some(Value::Null))))
}

fn null_not(_: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::Bool(true))
}

fn symbol_to_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    match &ctx.this {
        Value::Symbol(sym) => Ok(Value::from(sym.name())),
        _ => Err(wrong_receiver(ctx, "Symbol")),
    }
}

fn func_to_string(_: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::from("<object Func>"))
}

/// `f.bind(this)`: a copy of `f` with its receiver fixed.
fn func_bind(ctx: &mut FuncContext<'_>) -> EvalResult {
    match &ctx.this {
        Value::Func(f) => Ok(Value::func(f.bound(ctx.arg(0)))),
        _ => Err(wrong_receiver(ctx, "Func")),
    }
}

/// `f.call(this, ...args)`
fn func_call(ctx: &mut FuncContext<'_>) -> EvalResult {
    let func = ctx.this.clone();
    if !matches!(func, Value::Func(_)) {
        return Err(wrong_receiver(ctx, "Func"));
    }
    let this = ctx.arg(0);
    let args = ctx.args.iter().skip(1).cloned().collect();
    ctx.call(&func, Some(this), args)
}

fn range_to_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    match &ctx.this {
        Value::IntRange(r) => Ok(Value::string(r.to_string())),
        Value::FloatRange(r) => Ok(Value::string(r.to_string())),
        _ => Err(wrong_receiver(ctx, "Range")),
    }
}

fn range_contains(ctx: &mut FuncContext<'_>) -> EvalResult {
    let needle = ctx.arg(0);
    let found = match (&ctx.this, &needle) {
        (Value::IntRange(r), Value::Integer(n)) => r.contains(n),
        (Value::IntRange(r), Value::Float(x)) => r.contains_f64(*x),
        (Value::FloatRange(r), other) => other.as_f64().is_some_and(|x| r.contains(x)),
        (Value::IntRange(_), _) => false,
        _ => return Err(wrong_receiver(ctx, "Range")),
    };
    Ok(Value::Bool(found))
}

fn range_to_array(ctx: &mut FuncContext<'_>) -> EvalResult {
    let values = match &ctx.this {
        Value::IntRange(r) => r.values(),
        Value::FloatRange(r) => r.values(),
        _ => return Err(wrong_receiver(ctx, "Range")),
    };
    Ok(Value::array(values.collect()))
}
