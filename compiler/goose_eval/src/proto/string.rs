//! `String` prototype. Indices count chars, not bytes.

use std::sync::Arc;

use goose_ir::Op;
use num_traits::{Signed, ToPrimitive};

use super::number::ordering_value;
use super::{clamp_bounds, unsupported, wrong_receiver, ProtoBuilder};
use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::value::{CompositeRef, FuncContext, Value, MAX_SEQUENCE_LEN};

pub(super) fn build(builder: ProtoBuilder) -> CompositeRef {
    builder
        .method("toString", to_string)
        .method("toDebugString", to_debug_string)
        .method("split", split)
        .method("padLeft", pad_left)
        .method("padRight", pad_right)
        .method("slice", slice)
        .method("trim", trim)
        .method("startsWith", starts_with)
        .method("endsWith", ends_with)
        .method("toUpperCase", to_upper_case)
        .method("toLowerCase", to_lower_case)
        .method("contains", contains)
        .method("indexOf", index_of)
        .method("replace", replace)
        .method("chars", chars)
        .operator(Op::Eq, equals)
        .operator(Op::Add, concat)
        .operator(Op::Mul, repeat)
        .operator(Op::Gt, greater)
        .operator(Op::Compare, compare)
        .finish()
}

fn this_str(ctx: &FuncContext<'_>) -> Result<Arc<str>, EvalError> {
    match &ctx.this {
        Value::String(s) => Ok(s.clone()),
        _ => Err(wrong_receiver(ctx, "String")),
    }
}

fn to_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::String(this_str(ctx)?))
}

fn to_debug_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::string(format!("{:?}", &*this_str(ctx)?)))
}

/// `split(sep)`; an empty separator splits into chars.
fn split(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    let sep = ctx.str_arg(0, "split(sep)")?;
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::string(c.to_string())).collect()
    } else {
        s.split(&*sep).map(Value::from).collect()
    };
    Ok(Value::array(parts))
}

fn padding(ctx: &FuncContext<'_>, signature: &str) -> Result<(Arc<str>, String), EvalError> {
    let s = this_str(ctx)?;
    let width = ctx.int_arg(0, signature)?.to_usize().unwrap_or(0);
    let pad = if ctx.has_arg(1) {
        ctx.str_arg(1, signature)?.to_string()
    } else {
        " ".to_string()
    };
    let missing = width.saturating_sub(s.chars().count());
    let fill: String = if pad.is_empty() {
        String::new()
    } else {
        pad.chars().cycle().take(missing).collect()
    };
    Ok((s, fill))
}

fn pad_left(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (s, fill) = padding(ctx, "padLeft(n, pad)")?;
    Ok(Value::string(format!("{fill}{s}")))
}

fn pad_right(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (s, fill) = padding(ctx, "padRight(n, pad)")?;
    Ok(Value::string(format!("{s}{fill}")))
}

/// Optional integer bound argument.
pub(super) fn bound_arg(
    ctx: &FuncContext<'_>,
    index: usize,
    signature: &str,
) -> Result<Option<i64>, EvalError> {
    match ctx.args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Integer(n)) => Ok(Some(n.to_i64().unwrap_or(if n.is_negative() {
            i64::MIN
        } else {
            i64::MAX
        }))),
        Some(other) => Err(type_mismatch(format!(
            "{signature}: expected an integer bound, got {}",
            other.type_name()
        ))),
    }
}

/// Chars `start..end` of `s`, with negative bounds counted from the end.
pub(crate) fn char_slice(s: &str, start: Option<i64>, end: Option<i64>) -> String {
    let len = s.chars().count();
    let (start, end) = clamp_bounds(len, start, end);
    s.chars().skip(start).take(end - start).collect()
}

fn slice(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    let start = bound_arg(ctx, 0, "slice(start, end)")?;
    let end = bound_arg(ctx, 1, "slice(start, end)")?;
    Ok(Value::string(char_slice(&s, start, end)))
}

fn trim(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::from(this_str(ctx)?.trim()))
}

fn starts_with(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    let prefix = ctx.str_arg(0, "startsWith(s)")?;
    Ok(Value::Bool(s.starts_with(&*prefix)))
}

fn ends_with(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    let suffix = ctx.str_arg(0, "endsWith(s)")?;
    Ok(Value::Bool(s.ends_with(&*suffix)))
}

fn to_upper_case(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::string(this_str(ctx)?.to_uppercase()))
}

fn to_lower_case(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::string(this_str(ctx)?.to_lowercase()))
}

fn contains(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    let needle = ctx.str_arg(0, "contains(s)")?;
    Ok(Value::Bool(s.contains(&*needle)))
}

/// Char index of the first occurrence, or -1.
fn index_of(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    let needle = ctx.str_arg(0, "indexOf(s)")?;
    let index = s
        .find(&*needle)
        .and_then(|byte| i64::try_from(s[..byte].chars().count()).ok())
        .unwrap_or(-1);
    Ok(Value::from(index))
}

fn replace(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    let from = ctx.str_arg(0, "replace(a, b)")?;
    let to = ctx.str_arg(1, "replace(a, b)")?;
    Ok(Value::string(s.replace(&*from, &to)))
}

fn chars(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    Ok(Value::array(
        s.chars().map(|c| Value::string(c.to_string())).collect(),
    ))
}

fn equals(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    Ok(Value::Bool(matches!(ctx.args.first(), Some(Value::String(o)) if *o == s)))
}

fn concat(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    let Some(other) = ctx.args.first().cloned() else {
        return Err(unsupported(ctx, Op::Add));
    };
    let other = ctx.stringify(&other)?;
    Ok(Value::string(format!("{s}{other}")))
}

fn repeat(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    let Some(Value::Integer(n)) = ctx.args.first() else {
        return Err(type_mismatch("cannot multiply string by non-integer"));
    };
    if !n.is_positive() {
        return Ok(Value::string(""));
    }
    let count = n
        .to_usize()
        .filter(|count| count.checked_mul(s.len()).is_some_and(|len| len <= MAX_SEQUENCE_LEN))
        .ok_or_else(|| type_mismatch(format!("string repeat count {n} is too large")))?;
    Ok(Value::string(s.repeat(count)))
}

fn greater(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    match ctx.args.first() {
        Some(Value::String(o)) => Ok(Value::Bool(&*s > &**o)),
        _ => Err(unsupported(ctx, Op::Gt)),
    }
}

fn compare(ctx: &mut FuncContext<'_>) -> EvalResult {
    let s = this_str(ctx)?;
    match ctx.args.first() {
        Some(Value::String(o)) => Ok(ordering_value(s.cmp(o))),
        _ => Err(unsupported(ctx, Op::Compare)),
    }
}
