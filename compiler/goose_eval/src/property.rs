//! Property reads and writes.
//!
//! Reads never fail on a missing key: a miss anywhere on the prototype
//! chain is `null`, and so is an array or string index past the end.
//! Writes are strict: arrays reject out-of-range indices and non-integer
//! keys, and only arrays and composites accept writes at all.

use num_traits::ToPrimitive;

use crate::errors::{
    frozen_value, index_out_of_range, invalid_index, property_of_null, type_mismatch, EvalError,
    EvalResult,
};
use crate::operators::dispatch_root;
use crate::value::{lookup, PropertyKey, Value};

/// `value[key]`
pub fn get_property(value: &Value, key: &Value) -> EvalResult {
    match (value, key) {
        (Value::Null, _) => Err(property_of_null(&describe_key(key))),
        (Value::Array(array), Value::Integer(n)) => {
            Ok(n.to_usize().and_then(|i| array.get(i)).unwrap_or(Value::Null))
        }
        (Value::String(s), Value::Integer(n)) => Ok(n
            .to_usize()
            .and_then(|i| s.chars().nth(i))
            .map_or(Value::Null, |c| Value::string(c.to_string()))),
        _ => {
            let key = key.to_property_key()?;
            Ok(lookup_property(value, &key).unwrap_or(Value::Null))
        }
    }
}

/// `value.name`
pub fn get_named(value: &Value, name: &str) -> EvalResult {
    if matches!(value, Value::Null) {
        return Err(property_of_null(name));
    }
    Ok(lookup_property(value, &PropertyKey::string(name)).unwrap_or(Value::Null))
}

/// Find `key` on `value` or along its prototype chain.
pub fn lookup_property(value: &Value, key: &PropertyKey) -> Option<Value> {
    dispatch_root(value).and_then(|root| lookup(&root, key))
}

/// `target[key] = value`
pub fn set_property(target: &Value, key: &Value, value: Value) -> Result<(), EvalError> {
    match target {
        Value::Array(array) => {
            let Value::Integer(n) = key else {
                return Err(invalid_index(key.type_name()));
            };
            match n.to_usize() {
                Some(index) => array.set(index, value),
                None if array.is_frozen() => Err(frozen_value()),
                None => Err(index_out_of_range(n)),
            }
        }
        Value::Composite(composite) => composite.set(key.to_property_key()?, value),
        Value::Null => Err(property_of_null(&describe_key(key))),
        other => Err(type_mismatch(format!(
            "cannot set property on value of type {}",
            other.type_name()
        ))),
    }
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Symbol(sym) => sym.canonical(),
        other => other.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests;
