//! `std:json`, backed by `serde_json`.

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde_json::{Map, Number};

use super::NativeModule;
use crate::errors::{EvalError, EvalResult};
use crate::value::{FuncContext, PropertyKey, Value};

/// Self-referencing values would otherwise recurse forever.
const MAX_DEPTH: usize = 128;

pub(super) fn module() -> NativeModule {
    NativeModule::new("std:json")
        .func("encode", encode)
        .func("decode", decode)
}

fn encode(ctx: &mut FuncContext<'_>) -> EvalResult {
    ctx.require_args("encode(value, pretty = false)", 1)?;
    let json = to_json(&ctx.arg(0), 0)?;
    let text = if ctx.arg(1).is_truthy() {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    text.map(Value::from)
        .map_err(|err| EvalError::new(format!("encode: {err}")))
}

fn decode(ctx: &mut FuncContext<'_>) -> EvalResult {
    let text = ctx.str_arg(0, "decode(text)")?;
    let json: serde_json::Value =
        serde_json::from_str(&text).map_err(|err| EvalError::new(format!("decode: {err}")))?;
    Ok(from_json(json))
}

pub(crate) fn to_json(value: &Value, depth: usize) -> Result<serde_json::Value, EvalError> {
    if depth > MAX_DEPTH {
        return Err(EvalError::new("encode: value is nested too deeply"));
    }
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(n) => match (n.to_i64(), n.to_u64()) {
            (Some(small), _) => serde_json::Value::from(small),
            (None, Some(large)) => serde_json::Value::from(large),
            (None, None) => {
                return Err(EvalError::new(format!("encode: integer {n} does not fit in JSON")))
            }
        },
        Value::Float(x) => Number::from_f64(*x)
            .map(serde_json::Value::Number)
            .ok_or_else(|| EvalError::new(format!("encode: {x} is not a JSON number")))?,
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Array(array) => serde_json::Value::Array(
            array
                .snapshot()
                .iter()
                .map(|item| to_json(item, depth + 1))
                .collect::<Result<_, _>>()?,
        ),
        Value::Composite(object) => {
            let mut map = Map::new();
            for (key, item) in object.entries() {
                let key = match key {
                    PropertyKey::String(name) => name.to_string(),
                    PropertyKey::Integer(n) => n.to_string(),
                    PropertyKey::Symbol(_) => continue,
                };
                map.insert(key, to_json(&item, depth + 1)?);
            }
            serde_json::Value::Object(map)
        }
        other => {
            return Err(EvalError::new(format!(
                "encode: cannot encode {} as JSON",
                other.type_name()
            )))
        }
    })
}

pub(crate) fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(small) = n.as_i64() {
                Value::from(small)
            } else if let Some(large) = n.as_u64() {
                Value::Integer(BigInt::from(large))
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::from(s),
        serde_json::Value::Array(items) => Value::array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::object(
            map.into_iter()
                .map(|(key, item)| (PropertyKey::String(key.into()), from_json(item))),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_then_encode_keeps_shape() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"a":[1,2.5,"x",null,true],"b":{"c":-3}}"#).unwrap_or_default();
        let value = from_json(json.clone());
        assert_eq!(to_json(&value, 0).ok(), Some(json));
    }

    #[test]
    fn big_integers_and_nan_are_rejected() {
        let huge = Value::Integer(BigInt::from(u64::MAX) * 4);
        assert!(to_json(&huge, 0).is_err());
        assert!(to_json(&Value::Float(f64::NAN), 0).is_err());
    }

    #[test]
    fn symbol_keys_are_skipped() {
        let object = Value::object([
            (PropertyKey::string("k"), Value::from(1)),
            (
                PropertyKey::Symbol(crate::value::Symbol::new("s")),
                Value::from(2),
            ),
        ]);
        assert_eq!(
            to_json(&object, 0).ok(),
            Some(serde_json::json!({ "k": 1 }))
        );
    }
}
