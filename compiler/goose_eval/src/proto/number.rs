//! `Integer` and `Float` prototypes.

use std::cmp::Ordering;

use goose_ir::Op;
use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::{Signed, ToPrimitive, Zero};

use super::{unsupported, wrong_receiver, ProtoBuilder};
use crate::errors::{division_by_zero, type_mismatch, EvalError, EvalResult};
use crate::value::{CompositeRef, FuncContext, Value};

pub(super) fn build_integer(builder: ProtoBuilder) -> CompositeRef {
    builder
        .method("toString", int_to_string)
        .operator(Op::Eq, int_eq)
        .operator(Op::LogNot, not)
        .operator(Op::Add, int_add)
        .operator(Op::Sub, int_sub)
        .operator(Op::Mul, int_mul)
        .operator(Op::Quo, int_quo)
        .operator(Op::Rem, int_rem)
        .operator(Op::Pow, int_pow)
        .operator(Op::Gt, int_gt)
        .operator(Op::Compare, int_compare)
        .operator(Op::BitAnd, int_bit_and)
        .operator(Op::BitOr, int_bit_or)
        .operator(Op::BitXor, int_bit_xor)
        .operator(Op::BitNot, int_bit_not)
        .operator(Op::Shl, int_shl)
        .operator(Op::Shr, int_shr)
        .finish()
}

pub(super) fn build_float(builder: ProtoBuilder) -> CompositeRef {
    builder
        .method("toString", float_to_string)
        .operator(Op::Eq, float_eq)
        .operator(Op::LogNot, not)
        .operator(Op::Add, float_add)
        .operator(Op::Sub, float_sub)
        .operator(Op::Mul, float_mul)
        .operator(Op::Quo, float_quo)
        .operator(Op::Rem, float_rem)
        .operator(Op::Pow, float_pow)
        .operator(Op::Gt, float_gt)
        .operator(Op::Compare, float_compare)
        .finish()
}

pub(crate) fn big_to_f64(n: &BigInt) -> f64 {
    n.to_f64().unwrap_or(f64::NAN)
}

pub(crate) fn ordering_value(ordering: Ordering) -> Value {
    Value::from(match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

fn this_int(ctx: &FuncContext<'_>) -> Result<BigInt, EvalError> {
    match &ctx.this {
        Value::Integer(n) => Ok(n.clone()),
        _ => Err(wrong_receiver(ctx, "Integer")),
    }
}

fn this_float(ctx: &FuncContext<'_>) -> Result<f64, EvalError> {
    match ctx.this {
        Value::Float(x) => Ok(x),
        _ => Err(wrong_receiver(ctx, "Float")),
    }
}

fn not(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::Bool(!ctx.this.is_truthy()))
}

// Integer

fn int_to_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    let n = this_int(ctx)?;
    let base = match ctx.args.first() {
        None => 10,
        Some(Value::Integer(b)) => b.to_u32().unwrap_or(0),
        Some(_) => return Err(type_mismatch("toString(base): base must be an integer")),
    };
    if !(2..=36).contains(&base) {
        return Err(type_mismatch("base must be between 2 and 36"));
    }
    Ok(Value::string(n.to_str_radix(base)))
}

fn int_eq(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_int(ctx)?;
    Ok(Value::Bool(match ctx.args.first() {
        Some(Value::Integer(b)) => a == *b,
        Some(Value::Float(b)) => big_to_f64(&a) == *b,
        _ => false,
    }))
}

fn int_add(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_int(ctx)?;
    match ctx.args.first() {
        None => Ok(Value::Integer(a)),
        Some(Value::Integer(b)) => Ok(Value::Integer(a + b)),
        Some(Value::Float(b)) => Ok(Value::Float(big_to_f64(&a) + b)),
        Some(Value::String(s)) => Ok(Value::string(format!("{a}{s}"))),
        Some(_) => Err(unsupported(ctx, Op::Add)),
    }
}

fn int_sub(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_int(ctx)?;
    match ctx.args.first() {
        None => Ok(Value::Integer(-a)),
        Some(Value::Integer(b)) => Ok(Value::Integer(a - b)),
        Some(Value::Float(b)) => Ok(Value::Float(big_to_f64(&a) - b)),
        Some(_) => Err(unsupported(ctx, Op::Sub)),
    }
}

fn int_mul(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_int(ctx)?;
    match ctx.args.first() {
        Some(Value::Integer(b)) => Ok(Value::Integer(a * b)),
        Some(Value::Float(b)) => Ok(Value::Float(big_to_f64(&a) * b)),
        _ => Err(unsupported(ctx, Op::Mul)),
    }
}

/// Truncating division.
fn int_quo(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_int(ctx)?;
    match ctx.args.first() {
        Some(Value::Integer(b)) if b.is_zero() => Err(division_by_zero()),
        Some(Value::Integer(b)) => Ok(Value::Integer(a / b)),
        Some(Value::Float(b)) => Ok(Value::Float(big_to_f64(&a) / b)),
        _ => Err(unsupported(ctx, Op::Quo)),
    }
}

/// Remainder with the sign of the dividend.
fn int_rem(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_int(ctx)?;
    match ctx.args.first() {
        Some(Value::Integer(b)) if b.is_zero() => Err(division_by_zero()),
        Some(Value::Integer(b)) => Ok(Value::Integer(a % b)),
        Some(Value::Float(b)) => Ok(Value::Float(big_to_f64(&a) % b)),
        _ => Err(unsupported(ctx, Op::Rem)),
    }
}

fn int_pow(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = big_to_f64(&this_int(ctx)?);
    match ctx.args.first().and_then(Value::as_f64) {
        Some(b) => Ok(Value::Float(a.powf(b))),
        None => Err(unsupported(ctx, Op::Pow)),
    }
}

fn int_gt(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_int(ctx)?;
    match ctx.args.first() {
        Some(Value::Integer(b)) => Ok(Value::Bool(a > *b)),
        Some(Value::Float(b)) => Ok(Value::Bool(big_to_f64(&a) > *b)),
        _ => Err(unsupported(ctx, Op::Gt)),
    }
}

fn int_compare(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_int(ctx)?;
    let ordering = match ctx.args.first() {
        Some(Value::Integer(b)) => Some(a.cmp(b)),
        Some(Value::Float(b)) => big_to_f64(&a).partial_cmp(b),
        _ => return Err(unsupported(ctx, Op::Compare)),
    };
    Ok(ordering.map_or(Value::Null, ordering_value))
}

fn int_operand(ctx: &FuncContext<'_>, op: Op) -> Result<(BigInt, BigInt), EvalError> {
    match ctx.args.first() {
        Some(Value::Integer(b)) => Ok((this_int(ctx)?, b.clone())),
        _ => Err(unsupported(ctx, op)),
    }
}

fn int_bit_and(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, b) = int_operand(ctx, Op::BitAnd)?;
    Ok(Value::Integer(a & b))
}

fn int_bit_or(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, b) = int_operand(ctx, Op::BitOr)?;
    Ok(Value::Integer(a | b))
}

fn int_bit_xor(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, b) = int_operand(ctx, Op::BitXor)?;
    Ok(Value::Integer(a ^ b))
}

fn int_bit_not(ctx: &mut FuncContext<'_>) -> EvalResult {
    if !ctx.args.is_empty() {
        return Err(unsupported(ctx, Op::BitNot));
    }
    Ok(Value::Integer(!this_int(ctx)?))
}

fn shift_amount(ctx: &FuncContext<'_>, op: Op) -> Result<(BigInt, usize), EvalError> {
    let (a, b) = int_operand(ctx, op)?;
    if b.is_negative() {
        return Err(type_mismatch(format!("negative shift count {b}")));
    }
    let amount = b
        .to_usize()
        .ok_or_else(|| type_mismatch(format!("shift count {b} too large")))?;
    Ok((a, amount))
}

fn int_shl(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, n) = shift_amount(ctx, Op::Shl)?;
    Ok(Value::Integer(a << n))
}

fn int_shr(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, n) = shift_amount(ctx, Op::Shr)?;
    // Arithmetic shift: rounds toward negative infinity.
    let divisor = BigInt::from(1) << n;
    Ok(Value::Integer(a.div_floor(&divisor)))
}

// Float

fn float_to_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(Value::string(this_float(ctx)?.to_string()))
}

fn float_eq(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_float(ctx)?;
    Ok(Value::Bool(
        ctx.args.first().and_then(Value::as_f64) == Some(a),
    ))
}

fn float_add(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_float(ctx)?;
    match ctx.args.first() {
        None => Ok(Value::Float(a)),
        Some(Value::String(s)) => Ok(Value::string(format!("{a}{s}"))),
        Some(other) => match other.as_f64() {
            Some(b) => Ok(Value::Float(a + b)),
            None => Err(unsupported(ctx, Op::Add)),
        },
    }
}

fn float_sub(ctx: &mut FuncContext<'_>) -> EvalResult {
    let a = this_float(ctx)?;
    match ctx.args.first() {
        None => Ok(Value::Float(-a)),
        Some(other) => match other.as_f64() {
            Some(b) => Ok(Value::Float(a - b)),
            None => Err(unsupported(ctx, Op::Sub)),
        },
    }
}

fn float_binary(ctx: &FuncContext<'_>, op: Op) -> Result<(f64, f64), EvalError> {
    let a = this_float(ctx)?;
    match ctx.args.first().and_then(Value::as_f64) {
        Some(b) => Ok((a, b)),
        None => Err(unsupported(ctx, op)),
    }
}

fn float_mul(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, b) = float_binary(ctx, Op::Mul)?;
    Ok(Value::Float(a * b))
}

fn float_quo(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, b) = float_binary(ctx, Op::Quo)?;
    Ok(Value::Float(a / b))
}

fn float_rem(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, b) = float_binary(ctx, Op::Rem)?;
    Ok(Value::Float(a % b))
}

fn float_pow(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, b) = float_binary(ctx, Op::Pow)?;
    Ok(Value::Float(a.powf(b)))
}

fn float_gt(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, b) = float_binary(ctx, Op::Gt)?;
    Ok(Value::Bool(a > b))
}

fn float_compare(ctx: &mut FuncContext<'_>) -> EvalResult {
    let (a, b) = float_binary(ctx, Op::Compare)?;
    Ok(a.partial_cmp(&b).map_or(Value::Null, ordering_value))
}
