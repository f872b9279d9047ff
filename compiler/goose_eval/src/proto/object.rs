//! The root `Object` prototype.

use goose_ir::Op;
use num_traits::ToPrimitive;

use super::ProtoBuilder;
use crate::errors::{type_mismatch, EvalResult};
use crate::operators::instance_of;
use crate::value::{CompositeRef, FuncContext, PropertyKey, Value};

pub(super) fn build() -> CompositeRef {
    ProtoBuilder::root("Object")
        .method("toString", to_string)
        .method("toDebugString", to_debug_string)
        .operator(Op::Assign, assign)
        .operator(Op::Eq, equals)
        .operator(Op::LogNot, not)
        .operator(Op::Question, question)
        .operator(Op::LogAnd, and)
        .operator(Op::LogOr, or)
        .operator(Op::LogNull, null_coalesce)
        .operator(Op::Is, is)
        .operator(Op::IsNot, is_not)
        .finish()
}

fn to_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    let name = match &ctx.this {
        Value::Composite(c) => c.name().to_string(),
        other => other
            .prototype()
            .map_or_else(|| other.type_name().to_string(), |p| p.name().to_string()),
    };
    Ok(Value::string(format!("<object {name}>")))
}

/// `Name {\n  key: value,\n}` with nested values indented by `depth`.
fn to_debug_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    let Value::Composite(composite) = ctx.this.clone() else {
        return ctx.stringify(&ctx.this.clone()).map(Value::from);
    };
    let depth = match ctx.args.first() {
        None => 0,
        Some(Value::Integer(n)) => n.to_usize().unwrap_or(0),
        Some(_) => {
            return Err(type_mismatch(
                "toDebugString(depth): expected integer as first argument",
            ))
        }
    };

    let entries = composite.entries();
    let name = composite.name();
    if entries.is_empty() {
        return Ok(Value::string(format!("{name} {{}}")));
    }
    let indent = "  ".repeat(depth);
    let mut out = format!("{name} {{\n");
    for (key, value) in entries {
        let rendered = ctx.interp.to_debug_string(&value, depth + 1, ctx.scope)?;
        let key = match key {
            PropertyKey::String(s) => s.to_string(),
            other => format!("[{other}]"),
        };
        out.push_str(&format!("{indent}  {key}: {rendered},\n"));
    }
    out.push_str(&indent);
    out.push('}');
    Ok(Value::string(out))
}

fn assign(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(ctx.arg(0))
}

fn equals(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::Bool(ctx.this.is_identical(&ctx.arg(0))))
}

fn not(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::Bool(!ctx.this.is_truthy()))
}

fn question(ctx: &mut FuncContext<'_>) -> EvalResult {
    let this = ctx.this.clone();
    ctx.stringify(&this).map(Value::from)
}

fn and(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(if ctx.this.is_truthy() {
        ctx.arg(0)
    } else {
        ctx.this.clone()
    })
}

fn or(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(if ctx.this.is_truthy() {
        ctx.this.clone()
    } else {
        ctx.arg(0)
    })
}

fn null_coalesce(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(match ctx.this {
        Value::Null => ctx.arg(0),
        _ => ctx.this.clone(),
    })
}

fn is(ctx: &mut FuncContext<'_>) -> EvalResult {
    let ty = ctx.arg(0);
    instance_of(&ctx.this, &ty).map(Value::Bool)
}

fn is_not(ctx: &mut FuncContext<'_>) -> EvalResult {
    let ty = ctx.arg(0);
    instance_of(&ctx.this, &ty).map(|b| Value::Bool(!b))
}
