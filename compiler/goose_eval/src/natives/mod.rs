//! Host implementations behind `native` declarations.
//!
//! A [`NativeRegistry`] maps a module name (`std:math`, or the native name
//! of any other module) to a table of values keyed the way the declaring
//! module's `native` statements ask for them (`F/sin`, `C/PI`, ...). It is
//! filled once before the interpreter is built and never changes after.

mod fs;
mod json;
mod math;
mod platform;

use goose_ir::Op;
use rustc_hash::FxHashMap;

use crate::value::{Function, NativeFn, Value};

/// One module's native table.
pub struct NativeModule {
    name: String,
    entries: FxHashMap<String, Value>,
}

impl NativeModule {
    pub fn new(name: impl Into<String>) -> Self {
        NativeModule {
            name: name.into(),
            entries: FxHashMap::default(),
        }
    }

    /// `native const NAME`
    #[must_use]
    pub fn constant(mut self, name: &str, value: Value) -> Self {
        self.entries.insert(format!("C/{name}"), value);
        self
    }

    /// `native fn NAME(...)`
    #[must_use]
    pub fn func(mut self, name: &str, f: NativeFn) -> Self {
        self.entries
            .insert(format!("F/{name}"), Value::func(Function::native(name, f)));
        self
    }

    /// `native fn Recv.NAME(...)`
    #[must_use]
    pub fn method(mut self, receiver: &str, name: &str, f: NativeFn) -> Self {
        self.entries.insert(
            format!("F/{receiver}.{name}"),
            Value::func(Function::native(name, f)),
        );
        self
    }

    /// `native operator Recv OP(...)`
    #[must_use]
    pub fn operator(mut self, receiver: &str, op: Op, f: NativeFn) -> Self {
        self.entries.insert(
            format!("O/{receiver}.{op}"),
            Value::func(Function::native(op.as_str(), f)),
        );
        self
    }

    /// `native struct NAME(...)`; `constructor` is whatever callable builds
    /// the instances.
    #[must_use]
    pub fn structure(mut self, name: &str, constructor: Value) -> Self {
        self.entries.insert(format!("S/{name}"), constructor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Default)]
pub struct NativeRegistry {
    modules: FxHashMap<String, FxHashMap<String, Value>>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the bundled `std:` modules.
    pub fn with_std() -> Self {
        let mut registry = Self::new();
        registry.register(math::module());
        registry.register(fs::module());
        registry.register(platform::module());
        registry.register(json::module());
        registry
    }

    /// Add `module`, merging into an existing table of the same name.
    pub fn register(&mut self, module: NativeModule) {
        tracing::trace!(module = module.name, entries = module.entries.len(), "natives registered");
        self.modules
            .entry(module.name)
            .or_default()
            .extend(module.entries);
    }

    pub fn get(&self, module: &str, key: &str) -> Option<Value> {
        self.modules.get(module)?.get(key).cloned()
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests;
