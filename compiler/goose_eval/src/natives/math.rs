//! `std:math`

use std::cmp::Ordering;
use std::f64::consts;

use num_traits::Signed;

use super::NativeModule;
use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::value::{FuncContext, Value};

pub(super) fn module() -> NativeModule {
    NativeModule::new("std:math")
        .constant("PI", Value::Float(consts::PI))
        .constant("E", Value::Float(consts::E))
        .constant("TAU", Value::Float(consts::TAU))
        .constant("INF", Value::Float(f64::INFINITY))
        .func("sin", |ctx| unary(ctx, "sin", f64::sin))
        .func("cos", |ctx| unary(ctx, "cos", f64::cos))
        .func("tan", |ctx| unary(ctx, "tan", f64::tan))
        .func("asin", |ctx| unary(ctx, "asin", f64::asin))
        .func("acos", |ctx| unary(ctx, "acos", f64::acos))
        .func("atan", |ctx| unary(ctx, "atan", f64::atan))
        .func("atan2", atan2)
        .func("floor", |ctx| rounding(ctx, "floor", f64::floor))
        .func("ceil", |ctx| rounding(ctx, "ceil", f64::ceil))
        .func("round", |ctx| rounding(ctx, "round", f64::round))
        .func("trunc", |ctx| rounding(ctx, "trunc", f64::trunc))
        .func("sqrt", |ctx| unary(ctx, "sqrt", f64::sqrt))
        .func("log", |ctx| unary(ctx, "log", f64::ln))
        .func("log2", |ctx| unary(ctx, "log2", f64::log2))
        .func("log10", |ctx| unary(ctx, "log10", f64::log10))
        .func("exp", |ctx| unary(ctx, "exp", f64::exp))
        .func("pow", pow)
        .func("abs", abs)
        .func("sign", sign)
        .func("min", |ctx| pick(ctx, "min(a, b)", Ordering::Less))
        .func("max", |ctx| pick(ctx, "max(a, b)", Ordering::Greater))
        .func("clamp", clamp)
}

fn unary(ctx: &mut FuncContext<'_>, name: &str, f: fn(f64) -> f64) -> EvalResult {
    let x = ctx.number_arg(0, &format!("{name}(x)"))?;
    Ok(Value::Float(f(x)))
}

/// Integers are already whole and come back unchanged.
fn rounding(ctx: &mut FuncContext<'_>, name: &str, f: fn(f64) -> f64) -> EvalResult {
    match ctx.arg(0) {
        n @ Value::Integer(_) => Ok(n),
        _ => unary(ctx, name, f),
    }
}

fn atan2(ctx: &mut FuncContext<'_>) -> EvalResult {
    let y = ctx.number_arg(0, "atan2(y, x)")?;
    let x = ctx.number_arg(1, "atan2(y, x)")?;
    Ok(Value::Float(y.atan2(x)))
}

fn pow(ctx: &mut FuncContext<'_>) -> EvalResult {
    let x = ctx.number_arg(0, "pow(x, y)")?;
    let y = ctx.number_arg(1, "pow(x, y)")?;
    Ok(Value::Float(x.powf(y)))
}

fn abs(ctx: &mut FuncContext<'_>) -> EvalResult {
    match ctx.arg(0) {
        Value::Integer(n) => Ok(Value::Integer(n.abs())),
        _ => unary(ctx, "abs", f64::abs),
    }
}

fn sign(ctx: &mut FuncContext<'_>) -> EvalResult {
    let sign = match ctx.arg(0) {
        Value::Integer(n) => n.signum(),
        _ => {
            let x = ctx.number_arg(0, "sign(x)")?;
            if x.is_nan() {
                return Ok(Value::Float(f64::NAN));
            }
            return Ok(Value::from(match x.partial_cmp(&0.0) {
                Some(Ordering::Less) => -1,
                Some(Ordering::Greater) => 1,
                _ => 0,
            }));
        }
    };
    Ok(Value::Integer(sign))
}

/// Order of two numeric arguments; NaN compares equal to everything.
fn compare(a: &Value, b: &Value, signature: &str) -> Result<Ordering, EvalError> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal)),
            _ => Err(type_mismatch(format!(
                "{signature}: expected numbers, got {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

/// `min`/`max`: whichever argument is on the `wanted` side, the first on
/// a tie.
fn pick(ctx: &mut FuncContext<'_>, signature: &str, wanted: Ordering) -> EvalResult {
    ctx.require_args(signature, 2)?;
    let (a, b) = (ctx.arg(0), ctx.arg(1));
    if compare(&b, &a, signature)? == wanted {
        Ok(b)
    } else {
        Ok(a)
    }
}

fn clamp(ctx: &mut FuncContext<'_>) -> EvalResult {
    const SIGNATURE: &str = "clamp(x, lo, hi)";
    ctx.require_args(SIGNATURE, 3)?;
    let (x, lo, hi) = (ctx.arg(0), ctx.arg(1), ctx.arg(2));
    if compare(&x, &lo, SIGNATURE)? == Ordering::Less {
        return Ok(lo);
    }
    if compare(&x, &hi, SIGNATURE)? == Ordering::Greater {
        return Ok(hi);
    }
    Ok(x)
}
