//! Runtime values.
//!
//! [`Value`] is a closed enum. Primitives are stored inline; arrays,
//! composites, functions and generators are shared handles (`Arc`) with
//! interior locks, so cloning a `Value` never copies a container.
//!
//! All behavior that depends on the variant funnels through a handful of
//! `match`es here: [`Value::prototype`] for property and operator lookup,
//! [`Value::is_truthy`], [`Value::hash_key`] and [`Value::clone_shallow`].

mod array;
mod composite;
mod function;
mod range;
mod symbol;

use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

pub use array::{Array, ArrayRef};
pub use composite::{lookup, Composite, CompositeRef, Properties, PropertyKey};
pub use function::{
    Callable, FuncContext, FuncRef, Function, MemoCache, NativeFn, StructDef, UserFunc,
};
pub use range::{FloatRange, IntRange};
pub use symbol::Symbol;

use crate::errors::{invalid_property_key, EvalError};
use crate::generator::GeneratorRef;
use crate::proto::prototypes;

/// Longest string (in bytes) or array a single repeat or `[v; n]` may build.
pub const MAX_SEQUENCE_LEN: usize = 1 << 30;

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(BigInt),
    Float(f64),
    String(Arc<str>),
    Symbol(Symbol),
    Array(ArrayRef),
    Composite(CompositeRef),
    Func(FuncRef),
    Generator(GeneratorRef),
    IntRange(Arc<IntRange>),
    FloatRange(FloatRange),
}

impl Value {
    // Factories

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn int(n: impl Into<BigInt>) -> Self {
        Value::Integer(n.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Array::new(items))
    }

    /// Plain object: a composite named `Object` whose prototype is Object.
    pub fn object(entries: impl IntoIterator<Item = (PropertyKey, Value)>) -> Self {
        let composite = Composite::new("Object", Some(prototypes().object.clone()));
        for (key, value) in entries {
            composite.insert_unchecked(key, value);
        }
        Value::Composite(composite)
    }

    pub fn func(function: Function) -> Self {
        Value::Func(Arc::new(function))
    }

    /// Type tag as shown in error messages and by `typeof`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Array(_) => "Array",
            Value::Composite(_) => "Composite",
            Value::Func(_) => "Func",
            Value::Generator(_) => "Generator",
            Value::IntRange(_) => "IntRange",
            Value::FloatRange(_) => "FloatRange",
        }
    }

    /// Where property and operator lookup starts for this value.
    ///
    /// A composite starts at its own prototype link; Object itself has
    /// none.
    pub fn prototype(&self) -> Option<CompositeRef> {
        let protos = prototypes();
        let proto = match self {
            Value::Null => &protos.null,
            Value::Bool(_) => &protos.bool,
            Value::Integer(_) => &protos.integer,
            Value::Float(_) => &protos.float,
            Value::String(_) => &protos.string,
            Value::Symbol(_) => &protos.symbol,
            Value::Array(_) => &protos.array,
            Value::Func(_) => &protos.func,
            Value::Generator(_) => &protos.generator,
            Value::IntRange(_) | Value::FloatRange(_) => &protos.range,
            Value::Composite(c) => return c.proto().cloned(),
        };
        Some(proto.clone())
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(n) => !n.is_zero(),
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Composite(c) => c.len() > 0,
            Value::Symbol(_)
            | Value::Func(_)
            | Value::Generator(_)
            | Value::IntRange(_)
            | Value::FloatRange(_) => true,
        }
    }

    /// Stable identity string: equal for equal primitives, distinct per
    /// allocation for containers. Used as the memoization key.
    pub fn hash_key(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.to_string(),
            Value::Symbol(sym) => sym.id().to_string(),
            Value::Array(a) => format!("{:p}", Arc::as_ptr(a)),
            Value::Composite(c) => format!("{:p}", Arc::as_ptr(c)),
            Value::Func(f) => format!("{:p}", Arc::as_ptr(f)),
            Value::Generator(g) => format!("{:p}", Arc::as_ptr(g)),
            Value::IntRange(r) => format!("{}:{}:{}", r.start, r.stop, r.step),
            Value::FloatRange(r) => format!("{}:{}:{}", r.start, r.stop, r.step),
        }
    }

    /// Copy used when binding arguments and array-initializer elements.
    ///
    /// Composites get a new wrapper that still shares its property map;
    /// everything else is copied by value or by reference.
    #[must_use]
    pub fn clone_shallow(&self) -> Value {
        match self {
            Value::Composite(c) => Value::Composite(Arc::new(c.duplicate())),
            other => other.clone(),
        }
    }

    pub fn freeze(&self) {
        match self {
            Value::Array(a) => a.freeze(),
            Value::Composite(c) => c.freeze(),
            Value::Func(f) => f.freeze(),
            _ => {}
        }
    }

    pub fn unfreeze(&self) {
        match self {
            Value::Array(a) => a.unfreeze(),
            Value::Composite(c) => c.unfreeze(),
            Value::Func(f) => f.unfreeze(),
            _ => {}
        }
    }

    pub fn is_frozen(&self) -> bool {
        match self {
            Value::Array(a) => a.is_frozen(),
            Value::Composite(c) => c.is_frozen(),
            Value::Func(f) => f.is_frozen(),
            _ => false,
        }
    }

    /// Whether two values are the same allocation (containers) or equal
    /// primitives.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Composite(a), Value::Composite(b)) => Arc::ptr_eq(a, b),
            (Value::Func(a), Value::Func(b)) => Arc::ptr_eq(a, b),
            (Value::Generator(a), Value::Generator(b)) => Arc::ptr_eq(a, b),
            (Value::IntRange(a), Value::IntRange(b)) => a == b,
            (Value::FloatRange(a), Value::FloatRange(b)) => a == b,
            _ => false,
        }
    }

    /// Numeric view of Integer and Float values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => n.to_f64(),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret this value as a property key.
    pub fn to_property_key(&self) -> Result<PropertyKey, EvalError> {
        match self {
            Value::String(s) => Ok(PropertyKey::String(s.clone())),
            Value::Integer(n) => Ok(PropertyKey::Integer(n.clone())),
            Value::Symbol(sym) => Ok(PropertyKey::Symbol(sym.clone())),
            other => Err(invalid_property_key(other.type_name())),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(BigInt::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Symbol(sym) => write!(f, "Symbol({})", sym.canonical()),
            Value::Array(a) => write!(f, "Array(len={})", a.len()),
            Value::Composite(c) => write!(f, "Composite({})", c.name()),
            Value::Func(func) => write!(f, "Func({})", func.display_name()),
            Value::Generator(_) => f.write_str("Generator"),
            Value::IntRange(r) => write!(f, "IntRange({r})"),
            Value::FloatRange(r) => write!(f, "FloatRange({r})"),
        }
    }
}

#[cfg(test)]
mod tests;
