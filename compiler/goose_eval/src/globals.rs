//! Bindings every program starts with.
//!
//! The builtin frame holds names that can never be shadowed or reassigned
//! (`true`, `false`, `null` and the `int`, `float` and `bool`
//! namespaces). The global frame holds the builtin functions, which a
//! program may overwrite.

use std::io::BufRead;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{Num, ToPrimitive};

use crate::environment::{AssignError, ScopeArena, Variable};
use crate::errors::{type_mismatch, ControlFlow, EvalError, EvalResult};
use crate::value::{FuncContext, Function, NativeFn, PropertyKey, Value};

pub(crate) fn install(arena: &mut ScopeArena) -> Result<(), AssignError> {
    let builtins = arena.builtins();
    let constants = [
        ("true", Value::Bool(true)),
        ("false", Value::Bool(false)),
        ("null", Value::Null),
        (
            "int",
            namespace(&[("parse", int_parse), ("tryParse", int_try_parse)]),
        ),
        (
            "float",
            namespace(&[("parse", float_parse), ("tryParse", float_try_parse)]),
        ),
        ("bool", namespace(&[("parse", bool_parse)])),
    ];
    for (name, value) in constants {
        arena.set(builtins, name.into(), Variable::constant(value))?;
    }

    let global = arena.global();
    let functions: [(&str, NativeFn); 8] = [
        ("len", len),
        ("print", print),
        ("println", println),
        ("printf", printf),
        ("exit", exit),
        ("typeof", type_of),
        ("readline", readline),
        ("toDebugString", to_debug_string),
    ];
    for (name, f) in functions {
        arena.set(
            global,
            name.into(),
            Variable::mutable(Value::func(Function::native(name, f))),
        )?;
    }
    tracing::trace!("globals installed");
    Ok(())
}

/// Frozen object of native functions.
fn namespace(functions: &[(&str, NativeFn)]) -> Value {
    let object = Value::object(functions.iter().map(|&(name, f)| {
        (
            PropertyKey::string(name),
            Value::func(Function::native(name, f)),
        )
    }));
    object.freeze();
    object
}

// Type namespaces

fn parse_int(ctx: &FuncContext<'_>, signature: &str) -> Result<Option<BigInt>, EvalError> {
    let text = ctx.str_arg(0, signature)?;
    let base = if ctx.has_arg(1) {
        ctx.int_arg(1, signature)?
            .to_u32()
            .filter(|base| (2..=36).contains(base))
            .ok_or_else(|| type_mismatch(format!("{signature}: base must be between 2 and 36")))?
    } else {
        10
    };
    Ok(BigInt::from_str_radix(text.trim(), base).ok())
}

fn int_parse(ctx: &mut FuncContext<'_>) -> EvalResult {
    const SIGNATURE: &str = "int.parse(s, base = 10)";
    match parse_int(ctx, SIGNATURE)? {
        Some(n) => Ok(Value::Integer(n)),
        None => Err(EvalError::new(format!(
            "{SIGNATURE}: cannot parse {:?} as an integer",
            ctx.arg(0).as_str().unwrap_or_default()
        ))),
    }
}

fn int_try_parse(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(parse_int(ctx, "int.tryParse(s, base = 10)")?.map_or(Value::Null, Value::Integer))
}

fn parse_float(ctx: &FuncContext<'_>, signature: &str) -> Result<Option<f64>, EvalError> {
    Ok(ctx.str_arg(0, signature)?.trim().parse::<f64>().ok())
}

fn float_parse(ctx: &mut FuncContext<'_>) -> EvalResult {
    const SIGNATURE: &str = "float.parse(s)";
    match parse_float(ctx, SIGNATURE)? {
        Some(x) => Ok(Value::Float(x)),
        None => Err(EvalError::new(format!(
            "{SIGNATURE}: cannot parse {:?} as a float",
            ctx.arg(0).as_str().unwrap_or_default()
        ))),
    }
}

fn float_try_parse(ctx: &mut FuncContext<'_>) -> EvalResult {
    Ok(parse_float(ctx, "float.tryParse(s)")?.map_or(Value::Null, Value::Float))
}

fn bool_parse(ctx: &mut FuncContext<'_>) -> EvalResult {
    const SIGNATURE: &str = "bool.parse(s)";
    let text = ctx.str_arg(0, SIGNATURE)?;
    match text.trim() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        other => Err(EvalError::new(format!(
            "{SIGNATURE}: cannot parse {other:?} as a bool"
        ))),
    }
}

// Global functions

fn len(ctx: &mut FuncContext<'_>) -> EvalResult {
    ctx.require_args("len(x)", 1)?;
    let length = match ctx.arg(0) {
        Value::Array(array) => BigInt::from(array.len()),
        Value::String(s) => BigInt::from(s.len()),
        Value::Composite(object) => BigInt::from(object.len()),
        Value::IntRange(range) => range.len(),
        Value::FloatRange(range) => BigInt::from(range.len()),
        other => {
            return Err(type_mismatch(format!(
                "len(x): expected an array, string, object or range, got {}",
                other.type_name()
            )))
        }
    };
    Ok(Value::Integer(length))
}

fn joined_args(ctx: &mut FuncContext<'_>) -> Result<String, EvalError> {
    let args = ctx.args.clone();
    let mut parts = Vec::with_capacity(args.len());
    for arg in &args {
        parts.push(ctx.stringify(arg)?);
    }
    Ok(parts.join(" "))
}

fn print(ctx: &mut FuncContext<'_>) -> EvalResult {
    let text = joined_args(ctx)?;
    ctx.interp.print_handler.print(&text);
    Ok(Value::Null)
}

fn println(ctx: &mut FuncContext<'_>) -> EvalResult {
    let text = joined_args(ctx)?;
    ctx.interp.print_handler.println(&text);
    Ok(Value::Null)
}

fn printf(ctx: &mut FuncContext<'_>) -> EvalResult {
    const SIGNATURE: &str = "printf(format, ...)";
    let format = ctx.str_arg(0, SIGNATURE)?;
    let args = ctx.args.get(1..).map(<[Value]>::to_vec).unwrap_or_default();
    let text = expand_format(ctx, &format, &args)?;
    ctx.interp.print_handler.print(&text);
    Ok(Value::Null)
}

/// Expand `%s`, `%d`, `%f` (with optional `.N` precision), `%v` and `%%`.
pub(crate) fn expand_format(
    ctx: &mut FuncContext<'_>,
    format: &str,
    args: &[Value],
) -> Result<String, EvalError> {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = String::new();
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(*d);
                chars.next();
            }
            precision = digits.parse::<usize>().ok();
        }
        let Some(verb) = chars.next() else {
            out.push('%');
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let Some(arg) = args.next() else {
            return Err(type_mismatch(format!("printf: missing argument for %{verb}")));
        };
        match verb {
            's' => out.push_str(&ctx.stringify(arg)?),
            'v' => out.push_str(&ctx.interp.to_debug_string(arg, 0, ctx.scope)?),
            'd' => match arg {
                Value::Integer(n) => out.push_str(&n.to_string()),
                Value::Float(x) => out.push_str(&format!("{}", x.trunc())),
                other => {
                    return Err(type_mismatch(format!(
                        "printf: %d expects a number, got {}",
                        other.type_name()
                    )))
                }
            },
            'f' => {
                let Some(x) = arg.as_f64() else {
                    return Err(type_mismatch(format!(
                        "printf: %f expects a number, got {}",
                        arg.type_name()
                    )));
                };
                out.push_str(&format!("{:.*}", precision.unwrap_or(6), x));
            }
            other => return Err(type_mismatch(format!("printf: unknown verb %{other}"))),
        }
    }
    Ok(out)
}

fn exit(ctx: &mut FuncContext<'_>) -> EvalResult {
    let code = if ctx.has_arg(0) {
        ctx.int_arg(0, "exit(code = 0)")?
            .to_i32()
            .ok_or_else(|| type_mismatch("exit(code = 0): code out of range"))?
    } else {
        0
    };
    tracing::debug!(code, "exit requested");
    Err(EvalError::control(ControlFlow::Exit(code)))
}

fn type_of(ctx: &mut FuncContext<'_>) -> EvalResult {
    ctx.require_args("typeof(value)", 1)?;
    Ok(match ctx.arg(0) {
        Value::Composite(object) => Value::String(Arc::from(object.name())),
        other => Value::from(other.type_name()),
    })
}

fn readline(ctx: &mut FuncContext<'_>) -> EvalResult {
    let mut line = String::new();
    let read = ctx
        .interp
        .stdin
        .lock()
        .read_line(&mut line)
        .map_err(|err| EvalError::new(format!("readline: {err}")))?;
    if read == 0 {
        return Ok(Value::Null);
    }
    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(Value::from(trimmed))
}

/// `toDebugString(value, depth = 0)`
fn to_debug_string(ctx: &mut FuncContext<'_>) -> EvalResult {
    ctx.require_args("toDebugString(value, depth = 0)", 1)?;
    let depth = if ctx.has_arg(1) {
        ctx.int_arg(1, "toDebugString(value, depth = 0)")?
            .to_usize()
            .unwrap_or(0)
    } else {
        0
    };
    let value = ctx.arg(0);
    let rendered = ctx.interp.to_debug_string(&value, depth, ctx.scope)?;
    Ok(Value::from(rendered))
}
