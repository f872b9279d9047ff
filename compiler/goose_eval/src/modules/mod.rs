//! Module loading, imports and exports.
//!
//! Every module is evaluated once per interpreter, in a frame forked from
//! the global scope, and cached under its canonical key
//! (`scheme:resolved-path`). Its exports are collected in declaration
//! order in [`ModuleData`]. An export names a variable in the module
//! frame, not a value: a plain import snapshots the current values into a
//! frozen composite, while `show` binds read-only aliases that follow later
//! reassignments inside the module.

mod assets;
mod loader;
mod specifier;

pub use specifier::{derive_module_name, Scheme, Specifier, SpecifierError};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use goose_ir::SourceFile;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::environment::{Binding, ScopeArena, ScopeId, Variable};
use crate::errors::{duplicate_export, EvalError};
use crate::value::{PropertyKey, Value};

/// Where a module came from, which decides how its bare relative imports
/// resolve: they inherit the importer's scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// A file on disk reached through `scheme` (`file` or `pkg`).
    Dir { scheme: Scheme, dir: PathBuf },
    /// A compiled-in `std` source; `dir` is its directory in the asset
    /// table, empty at the top.
    Asset { dir: String },
}

impl Origin {
    /// Origin of a program started from the working directory.
    pub fn working_dir() -> Self {
        Origin::Dir {
            scheme: Scheme::File,
            dir: PathBuf::from("."),
        }
    }
}

/// What an exported name refers to.
#[derive(Clone, Debug)]
pub enum Export {
    /// A variable in a module frame; readers see its current value.
    Live(Binding),
    /// A value fixed at export time, such as a re-exported snapshot.
    Fixed(Value),
}

impl Export {
    pub fn value(&self, arena: &ScopeArena) -> Value {
        match self {
            Export::Live(binding) => arena.binding_value(binding).unwrap_or(Value::Null),
            Export::Fixed(value) => value.clone(),
        }
    }

    /// The importer's variable for this export.
    pub fn into_variable(self) -> Variable {
        match self {
            Export::Live(binding) => Variable::linked(binding),
            Export::Fixed(value) => Variable::imported(value),
        }
    }
}

/// A loaded module.
pub struct ModuleData {
    key: String,
    scope: ScopeId,
    source: Arc<SourceFile>,
    origin: Origin,
    exports: RwLock<Vec<(Arc<str>, Export)>>,
}

impl ModuleData {
    pub(crate) fn new(key: String, scope: ScopeId, source: Arc<SourceFile>, origin: Origin) -> Self {
        ModuleData {
            key,
            scope,
            source,
            origin,
            exports: RwLock::new(Vec::new()),
        }
    }

    /// Canonical cache key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The module's top-level frame.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn source(&self) -> &Arc<SourceFile> {
        &self.source
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Directory on disk relative imports resolve against; `None` for
    /// compiled-in modules.
    pub fn dir(&self) -> Option<&Path> {
        match &self.origin {
            Origin::Dir { dir, .. } => Some(dir),
            Origin::Asset { .. } => None,
        }
    }

    /// Name native symbols are registered under: the key without its
    /// `.goose` extension and `/index` suffix, so `std:math.goose` and
    /// `std:math/index.goose` both look up `std:math`.
    pub fn native_name(&self) -> &str {
        let name = self.key.strip_suffix(".goose").unwrap_or(&self.key);
        name.strip_suffix("/index").unwrap_or(name)
    }

    pub fn export(&self, name: &str) -> Option<Export> {
        self.exports
            .read()
            .iter()
            .find(|(exported, _)| &**exported == name)
            .map(|(_, export)| export.clone())
    }

    /// All exports in declaration order.
    pub fn exports(&self) -> Vec<(Arc<str>, Export)> {
        self.exports.read().clone()
    }

    pub(crate) fn add_export(&self, name: Arc<str>, export: Export) -> Result<(), EvalError> {
        let mut exports = self.exports.write();
        if exports.iter().any(|(exported, _)| *exported == name) {
            return Err(duplicate_export(&name));
        }
        exports.push((name, export));
        Ok(())
    }

    /// Frozen composite of the current value of every export, bound by a
    /// plain `import`.
    pub fn snapshot(&self, arena: &ScopeArena) -> Value {
        frozen_object(
            self.exports()
                .into_iter()
                .map(|(name, export)| (name, export.value(arena)))
                .collect(),
        )
    }
}

/// Frozen plain object holding `entries`.
pub(crate) fn frozen_object(entries: Vec<(Arc<str>, Value)>) -> Value {
    let object = Value::object(
        entries
            .into_iter()
            .map(|(name, value)| (PropertyKey::String(name), value)),
    );
    object.freeze();
    object
}

/// Modules loaded so far, by canonical key.
#[derive(Default)]
pub struct ModuleCache {
    modules: FxHashMap<String, Arc<ModuleData>>,
}

impl ModuleCache {
    pub fn get(&self, key: &str) -> Option<Arc<ModuleData>> {
        self.modules.get(key).cloned()
    }

    pub fn insert(&mut self, key: String, module: Arc<ModuleData>) {
        self.modules.insert(key, module);
    }

    pub fn remove(&mut self, key: &str) -> Option<Arc<ModuleData>> {
        self.modules.remove(key)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests;
