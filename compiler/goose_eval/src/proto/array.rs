//! `Array` prototype.

use std::cmp::Ordering;

use goose_ir::Op;
use num_traits::{Signed, ToPrimitive};

use super::string::bound_arg;
use super::{clamp_bounds, unsupported, wrong_receiver, ProtoBuilder};
use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::value::{ArrayRef, CompositeRef, FuncContext, Value};

pub(super) fn build(builder: ProtoBuilder) -> CompositeRef {
    builder
        .method("toString", to_string)
        .method("toDebugString", to_debug_string)
        .method("push", push)
        .method("pop", pop)
        .method("sort", sort)
        .method("map", map)
        .method("filter", filter)
        .method("reduce", reduce)
        .method("join", join)
        .method("slice", slice)
        .method("contains", contains)
        .method("indexOf", index_of)
        .method("reverse", reverse)
        .operator(Op::Eq, equals)
        .operator(Op::Add, concat)
        .finish()
}

fn this_array(ctx: &FuncContext<'_>) -> Result<ArrayRef, EvalError> {
    match &ctx.this {
        Value::Array(a) => Ok(a.clone()),
        _ => Err(wrong_receiver(ctx, "Array")),
    }
}

fn to_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    let items = this_array(ctx)?.snapshot();
    let mut parts = Vec::with_capacity(items.len());
    for item in &items {
        parts.push(ctx.stringify(item)?);
    }
    Ok(Value::string(format!("[{}]", parts.join(", "))))
}

fn to_debug_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    let items = this_array(ctx)?.snapshot();
    let depth = match ctx.args.first() {
        Some(Value::Integer(n)) => n.to_usize().unwrap_or(0),
        _ => 0,
    };
    let mut parts = Vec::with_capacity(items.len());
    for item in &items {
        parts.push(ctx.interp.to_debug_string(item, depth + 1, ctx.scope)?);
    }
    Ok(Value::string(format!("[{}]", parts.join(", "))))
}

/// Appends every argument; returns the array itself.
fn push(ctx: &mut FuncContext<'_>) -> EvalResult {
    let array = this_array(ctx)?;
    ctx.require_args("push(...values)", 1)?;
    array.push(ctx.args.iter().cloned())?;
    Ok(Value::Array(array))
}

fn pop(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(this_array(ctx)?.pop()?.unwrap_or(Value::Null))
}

/// Stable merge sort driven by a comparator that may fail.
fn merge_sort(
    items: Vec<Value>,
    cmp: &mut dyn FnMut(&Value, &Value) -> Result<Ordering, EvalError>,
) -> Result<Vec<Value>, EvalError> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort(left, cmp)?;
    let right = merge_sort(right, cmp)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(a), Some(b)) = (left.peek(), right.peek()) {
        if cmp(b, a)? == Ordering::Less {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

/// `sort(cmp)`: `cmp(a, b) < 0` orders `a` first. Without a comparator the
/// elements' own `<=>` is used. Returns a new array.
fn sort(ctx: &mut FuncContext<'_>) -> EvalResult {
    let items = this_array(ctx)?.snapshot();
    let comparator = if ctx.has_arg(0) {
        Some(ctx.func_arg(0, "sort(cmp)")?)
    } else {
        None
    };
    let sorted = merge_sort(items, &mut |a, b| {
        let result = match &comparator {
            Some(f) => ctx.call(f, None, vec![a.clone(), b.clone()])?,
            None => ctx
                .interp
                .apply_operator(Op::Compare, a, Some(b.clone()), ctx.scope, ctx.span)?,
        };
        match result {
            Value::Integer(n) if n.is_negative() => Ok(Ordering::Less),
            Value::Integer(n) if n.is_positive() => Ok(Ordering::Greater),
            Value::Integer(_) => Ok(Ordering::Equal),
            other => Err(type_mismatch(format!(
                "sort(cmp): comparator must return an integer, got {}",
                other.type_name()
            ))),
        }
    })?;
    Ok(Value::array(sorted))
}

fn map(ctx: &mut FuncContext<'_>) -> EvalResult {
    let items = this_array(ctx)?.snapshot();
    let f = ctx.func_arg(0, "map(fn)")?;
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        out.push(ctx.call(&f, None, vec![item, Value::from(i as i64)])?);
    }
    Ok(Value::array(out))
}

fn filter(ctx: &mut FuncContext<'_>) -> EvalResult {
    let items = this_array(ctx)?.snapshot();
    let f = ctx.func_arg(0, "filter(fn)")?;
    let mut out = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        if ctx
            .call(&f, None, vec![item.clone(), Value::from(i as i64)])?
            .is_truthy()
        {
            out.push(item);
        }
    }
    Ok(Value::array(out))
}

/// `reduce(fn(acc, value), init)`; without `init` the first element seeds
/// the accumulator.
fn reduce(ctx: &mut FuncContext<'_>) -> EvalResult {
    let items = this_array(ctx)?.snapshot();
    let f = ctx.func_arg(0, "reduce(fn, init)")?;
    let mut items = items.into_iter();
    let mut acc = if ctx.has_arg(1) {
        ctx.arg(1)
    } else {
        match items.next() {
            Some(first) => first,
            None => return Ok(Value::Null),
        }
    };
    for item in items {
        acc = ctx.call(&f, None, vec![acc, item])?;
    }
    Ok(acc)
}

fn join(ctx: &mut FuncContext<'_>) -> EvalResult {
    let items = this_array(ctx)?.snapshot();
    let sep = if ctx.has_arg(0) {
        ctx.str_arg(0, "join(sep)")?.to_string()
    } else {
        ",".to_string()
    };
    let mut parts = Vec::with_capacity(items.len());
    for item in &items {
        parts.push(ctx.stringify(item)?);
    }
    Ok(Value::string(parts.join(&sep)))
}

fn slice(ctx: &mut FuncContext<'_>) -> EvalResult {
    let items = this_array(ctx)?.snapshot();
    let start = bound_arg(ctx, 0, "slice(start, end)")?;
    let end = bound_arg(ctx, 1, "slice(start, end)")?;
    let (start, end) = clamp_bounds(items.len(), start, end);
    Ok(Value::array(items[start..end].to_vec()))
}

fn position(ctx: &mut FuncContext<'_>, signature: &str) -> Result<Option<usize>, EvalError> {
    let items = this_array(ctx)?.snapshot();
    ctx.require_args(signature, 1)?;
    let needle = ctx.arg(0);
    for (i, item) in items.iter().enumerate() {
        if ctx.interp.values_equal(item, &needle, ctx.scope, ctx.span)? {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

fn contains(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::Bool(position(ctx, "contains(v)")?.is_some()))
}

fn index_of(ctx: &mut FuncContext<'_>) -> EvalResult {
    let index = position(ctx, "indexOf(v)")?.map_or(-1, |i| i as i64);
    Ok(Value::from(index))
}

fn reverse(ctx: &mut FuncContext<'_>) -> EvalResult {
    let mut items = this_array(ctx)?.snapshot();
    items.reverse();
    Ok(Value::array(items))
}

/// Element-wise `==`, each element deciding with its own operator.
fn equals(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_array(ctx)?.snapshot();
    let Some(Value::Array(other)) = ctx.args.first().cloned() else {
        return Ok(Value::Bool(false));
    };
    let b = other.snapshot();
    if a.len() != b.len() {
        return Ok(Value::Bool(false));
    }
    for (x, y) in a.iter().zip(&b) {
        if !ctx.interp.values_equal(x, y, ctx.scope, ctx.span)? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn concat(ctx: &mut FuncContext<'_>) -> EvalResult {
    let mut items = this_array(ctx)?.snapshot();
    match ctx.args.first() {
        Some(Value::Array(other)) => {
            items.extend(other.snapshot());
            Ok(Value::array(items))
        }
        _ => Err(unsupported(ctx, Op::Add)),
    }
}
