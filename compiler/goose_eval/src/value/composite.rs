//! Composites: keyed objects with an operator table and a prototype link.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use goose_ir::Op;
use num_bigint::BigInt;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{Symbol, Value};
use crate::errors::{frozen_value, EvalError};

pub type CompositeRef = Arc<Composite>;

/// A property key. Each variant is its own key space: `"1"` and `1` are
/// different keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    String(Arc<str>),
    Integer(BigInt),
    Symbol(Symbol),
}

impl PropertyKey {
    pub fn string(name: &str) -> Self {
        PropertyKey::String(name.into())
    }

    pub fn to_value(&self) -> Value {
        match self {
            PropertyKey::String(s) => Value::String(s.clone()),
            PropertyKey::Integer(n) => Value::Integer(n.clone()),
            PropertyKey::Symbol(sym) => Value::Symbol(sym.clone()),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => f.write_str(s),
            PropertyKey::Integer(n) => write!(f, "{n}"),
            PropertyKey::Symbol(sym) => f.write_str(&sym.canonical()),
        }
    }
}

/// Insertion-ordered property map.
#[derive(Clone, Default)]
pub struct Properties {
    entries: Vec<(PropertyKey, Value)>,
    index: FxHashMap<PropertyKey, usize>,
}

impl Properties {
    pub fn get(&self, key: &PropertyKey) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, key: PropertyKey, value: Value) -> Option<Value> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

/// An object.
///
/// The property map and operator table sit behind their own `Arc`s so a
/// shallow clone ([`Composite::duplicate`]) gets a new identity and frozen
/// flag while still sharing state with the original.
pub struct Composite {
    name: Arc<str>,
    props: Arc<RwLock<Properties>>,
    operators: Arc<RwLock<FxHashMap<Op, Value>>>,
    proto: Option<CompositeRef>,
    frozen: AtomicBool,
}

impl Composite {
    pub fn new(name: impl Into<Arc<str>>, proto: Option<CompositeRef>) -> CompositeRef {
        Arc::new(Composite {
            name: name.into(),
            props: Arc::default(),
            operators: Arc::default(),
            proto,
            frozen: AtomicBool::new(false),
        })
    }

    /// Display name: `Object`, a struct name, or a builtin type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn proto(&self) -> Option<&CompositeRef> {
        self.proto.as_ref()
    }

    pub fn get_own(&self, key: &PropertyKey) -> Option<Value> {
        self.props.read().get(key).cloned()
    }

    pub fn has_own(&self, key: &PropertyKey) -> bool {
        self.props.read().get(key).is_some()
    }

    /// Write a property, honoring the frozen flag.
    pub fn set(&self, key: PropertyKey, value: Value) -> Result<(), EvalError> {
        if self.is_frozen() {
            return Err(frozen_value());
        }
        self.insert_unchecked(key, value);
        Ok(())
    }

    /// Write a property even when frozen. Used while building prototypes
    /// and module snapshots.
    pub fn insert_unchecked(&self, key: PropertyKey, value: Value) {
        let old = self.props.write().insert(key, value);
        drop(old);
    }

    pub fn len(&self) -> usize {
        self.props.read().len()
    }

    pub fn entries(&self) -> Vec<(PropertyKey, Value)> {
        self.props
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn operator(&self, op: Op) -> Option<Value> {
        self.operators.read().get(&op).cloned()
    }

    pub fn set_operator(&self, op: Op, implementation: Value) {
        let old = self.operators.write().insert(op, implementation);
        drop(old);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn unfreeze(&self) {
        self.frozen.store(false, Ordering::Release);
    }

    /// New wrapper sharing this composite's properties and operators.
    pub fn duplicate(&self) -> Composite {
        Composite {
            name: self.name.clone(),
            props: Arc::clone(&self.props),
            operators: Arc::clone(&self.operators),
            proto: self.proto.clone(),
            frozen: AtomicBool::new(self.is_frozen()),
        }
    }

    /// Whether `proto` appears on this composite's prototype chain,
    /// including the composite itself.
    pub fn inherits_from(self: &Arc<Self>, proto: &CompositeRef) -> bool {
        let mut current = Some(self.clone());
        while let Some(c) = current {
            if Arc::ptr_eq(&c, proto) || Arc::ptr_eq(&c.props, &proto.props) {
                return true;
            }
            current = c.proto.clone();
        }
        false
    }
}

/// Look `key` up on `start` and then along its prototype chain.
pub fn lookup(start: &CompositeRef, key: &PropertyKey) -> Option<Value> {
    let mut current = Some(start.clone());
    while let Some(c) = current {
        if let Some(value) = c.get_own(key) {
            return Some(value);
        }
        current = c.proto.clone();
    }
    None
}
