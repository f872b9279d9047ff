//! Lexical scopes stored in an arena.
//!
//! Every frame the evaluator opens (function call, loop iteration, module
//! body, ...) is a slot in [`ScopeArena`] addressed by a generation-checked
//! [`ScopeId`]. Parent links are ids.
//!
//! A frame stays open until its opener releases it. After that it lives
//! on while it has live child frames or [`CapturedScope`]s held by
//! closures and struct constructors, unless it is pinned (global and module
//! frames never go away). A closure stored in the very frame it captured
//! does not keep that frame alive by itself. Dropping a `CapturedScope`
//! only queues its id; the queue is drained on the next release, so values
//! can be dropped without holding the arena lock.
//!
//! The arena starts with two frames: the builtin scope, whose names can
//! never be shadowed or reassigned, and the global scope beneath it.

use std::fmt;
use std::sync::Arc;

use crossbeam::channel::{unbounded, Receiver, Sender};
use rustc_hash::FxHashMap;

use crate::errors::{
    builtin_redefinition, constant_assignment, internal, undefined_variable, EvalError,
};
use crate::modules::ModuleData;
use crate::value::Value;

/// Handle to a scope slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId {
    index: u32,
    generation: u32,
}

/// What opened a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeOwner {
    Function,
    Closure,
    Do,
    ArrayInit,
    Repeat,
    For,
    If,
    Global,
    Builtin,
    Module,
    Pipeline,
    Block,
    Struct,
    Generator,
    Import,
    Match,
    Operator,
}

/// How a binding got into its frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VariableSource {
    Decl,
    Import,
}

/// A variable slot in a frame that outlives the importer's view of it:
/// an export, or the target of a `show` import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub scope: ScopeId,
    pub name: Arc<str>,
}

#[derive(Clone, Debug)]
pub struct Variable {
    pub constant: bool,
    pub value: Value,
    pub source: VariableSource,
    /// Reads go to this binding instead of `value`.
    pub link: Option<Binding>,
}

impl Variable {
    pub fn mutable(value: Value) -> Self {
        Variable {
            constant: false,
            value,
            source: VariableSource::Decl,
            link: None,
        }
    }

    pub fn constant(value: Value) -> Self {
        Variable {
            constant: true,
            value,
            source: VariableSource::Decl,
            link: None,
        }
    }

    pub fn imported(value: Value) -> Self {
        Variable {
            constant: true,
            value,
            source: VariableSource::Import,
            link: None,
        }
    }

    /// Read-only alias of another module's variable.
    pub fn linked(binding: Binding) -> Self {
        Variable {
            constant: true,
            value: Value::Null,
            source: VariableSource::Import,
            link: Some(binding),
        }
    }
}

/// Links followed before a read gives up; only a cycle of `show` imports
/// between partially loaded modules gets this far.
const MAX_LINK_HOPS: usize = 64;

/// A counted reference to a frame, held by a closure or a struct
/// constructor for as long as it can still run code in that frame.
pub struct CapturedScope {
    id: ScopeId,
    returns: Sender<ScopeId>,
}

impl CapturedScope {
    pub fn id(&self) -> ScopeId {
        self.id
    }
}

impl Drop for CapturedScope {
    fn drop(&mut self) {
        // The arena may already be gone at shutdown.
        let _ = self.returns.send(self.id);
    }
}

impl fmt::Debug for CapturedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapturedScope").field(&self.id).finish()
    }
}

/// Frames freed by a release. Dropping it drops their variables, which
/// callers do after giving up the arena lock.
pub struct Released(Vec<Frame>);

impl Released {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Failure of a scope operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AssignError {
    #[error("cannot redefine builtin {0}")]
    Builtin(Arc<str>),
    #[error("cannot assign to constant {0}")]
    Constant(Arc<str>),
    #[error("{0} is not defined")]
    Undefined(Arc<str>),
    #[error("stale scope id {0:?}")]
    StaleScope(ScopeId),
}

impl From<AssignError> for EvalError {
    fn from(err: AssignError) -> Self {
        match err {
            AssignError::Builtin(name) => builtin_redefinition(&name),
            AssignError::Constant(name) => constant_assignment(&name),
            AssignError::Undefined(name) => undefined_variable(&name),
            AssignError::StaleScope(_) => internal(err.to_string()),
        }
    }
}

struct Frame {
    owner: ScopeOwner,
    parent: Option<ScopeId>,
    module: Option<Arc<ModuleData>>,
    vars: FxHashMap<Arc<str>, Variable>,
    /// Its opener has not released it yet.
    open: bool,
    /// Live children plus captures.
    refs: u32,
    /// Never freed.
    pinned: bool,
}

impl Frame {
    /// Captures of `id` held only by functions stored directly in this
    /// frame's own variables.
    fn self_captures(&self, id: ScopeId) -> u32 {
        let count = self
            .vars
            .values()
            .filter(|var| match &var.value {
                Value::Func(func) => Arc::strong_count(func) == 1 && func.sole_capture() == Some(id),
                _ => false,
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn is_garbage(&self, id: ScopeId) -> bool {
        !self.open && !self.pinned && self.refs <= self.self_captures(id)
    }
}

struct Slot {
    generation: u32,
    frame: Option<Frame>,
}

pub struct ScopeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    builtins: ScopeId,
    global: ScopeId,
    returns: (Sender<ScopeId>, Receiver<ScopeId>),
}

impl ScopeArena {
    pub fn new() -> Self {
        let mut arena = ScopeArena {
            slots: Vec::new(),
            free: Vec::new(),
            returns: unbounded(),
            builtins: ScopeId {
                index: 0,
                generation: 0,
            },
            global: ScopeId {
                index: 0,
                generation: 0,
            },
        };
        arena.builtins = arena.alloc(ScopeOwner::Builtin, None);
        arena.global = arena.alloc(ScopeOwner::Global, Some(arena.builtins));
        arena.pin(arena.builtins);
        arena.pin(arena.global);
        arena
    }

    pub fn builtins(&self) -> ScopeId {
        self.builtins
    }

    pub fn global(&self) -> ScopeId {
        self.global
    }

    fn alloc(&mut self, owner: ScopeOwner, parent: Option<ScopeId>) -> ScopeId {
        let frame = Frame {
            owner,
            parent,
            module: None,
            vars: FxHashMap::default(),
            open: true,
            refs: 0,
            pinned: false,
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.frame = Some(frame);
            return ScopeId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            frame: Some(frame),
        });
        ScopeId {
            index,
            generation: 0,
        }
    }

    fn frame(&self, id: ScopeId) -> Result<&Frame, AssignError> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.frame.as_ref())
            .ok_or(AssignError::StaleScope(id))
    }

    fn frame_mut(&mut self, id: ScopeId) -> Result<&mut Frame, AssignError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.frame.as_mut())
            .ok_or(AssignError::StaleScope(id))
    }

    /// Open a child frame of `parent`. The caller owns one reference and
    /// gives it back with [`ScopeArena::release`].
    pub fn fork(&mut self, parent: ScopeId, owner: ScopeOwner) -> Result<ScopeId, AssignError> {
        self.frame_mut(parent)?.refs += 1;
        Ok(self.alloc(owner, Some(parent)))
    }

    /// Close a frame the caller opened, and settle captures dropped
    /// since the last release.
    pub fn release(&mut self, id: ScopeId) -> Released {
        let mut freed = Vec::new();
        if let Ok(frame) = self.frame_mut(id) {
            frame.open = false;
            self.collect(id, &mut freed);
        }
        while let Ok(returned) = self.returns.1.try_recv() {
            if let Ok(frame) = self.frame_mut(returned) {
                frame.refs = frame.refs.saturating_sub(1);
                self.collect(returned, &mut freed);
            }
        }
        Released(freed)
    }

    /// Take a counted reference to `id` for a closure.
    pub fn capture(&mut self, id: ScopeId) -> Result<CapturedScope, AssignError> {
        self.frame_mut(id)?.refs += 1;
        Ok(CapturedScope {
            id,
            returns: self.returns.0.clone(),
        })
    }

    /// Free `id` if nothing keeps it alive, then its parent the same way.
    fn collect(&mut self, id: ScopeId, freed: &mut Vec<Frame>) {
        let mut next = Some(id);
        while let Some(id) = next.take() {
            if !self.frame(id).is_ok_and(|frame| frame.is_garbage(id)) {
                return;
            }
            let slot = &mut self.slots[id.index as usize];
            let Some(frame) = slot.frame.take() else {
                return;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            if let Some(parent) = frame.parent {
                if let Ok(parent_frame) = self.frame_mut(parent) {
                    parent_frame.refs = parent_frame.refs.saturating_sub(1);
                    next = Some(parent);
                }
            }
            freed.push(frame);
        }
    }

    /// Keep `id` alive for the rest of the run.
    pub fn pin(&mut self, id: ScopeId) {
        if let Ok(frame) = self.frame_mut(id) {
            frame.pinned = true;
        }
    }

    /// Follow `var`'s link, if any, to the variable it aliases.
    fn resolve<'a>(&'a self, var: &'a Variable) -> Option<&'a Variable> {
        let mut current = var;
        for _ in 0..MAX_LINK_HOPS {
            let Some(link) = &current.link else {
                return Some(current);
            };
            current = self.frame(link.scope).ok()?.vars.get(&link.name)?;
        }
        None
    }

    /// Nearest binding of `name`, walking parent links.
    pub fn get(&self, id: ScopeId, name: &str) -> Result<&Variable, AssignError> {
        let mut current = Some(id);
        while let Some(id) = current {
            let frame = self.frame(id)?;
            if let Some(var) = frame.vars.get(name) {
                return self
                    .resolve(var)
                    .ok_or_else(|| AssignError::Undefined(name.into()));
            }
            current = frame.parent;
        }
        Err(AssignError::Undefined(name.into()))
    }

    /// Current value behind an exported binding.
    pub fn binding_value(&self, binding: &Binding) -> Option<Value> {
        self.get_local(binding.scope, &binding.name)
            .map(|var| var.value.clone())
    }

    pub fn get_local(&self, id: ScopeId, name: &str) -> Option<&Variable> {
        self.resolve(self.frame(id).ok()?.vars.get(name)?)
    }

    /// Bind `name` in frame `id`.
    pub fn set(&mut self, id: ScopeId, name: Arc<str>, var: Variable) -> Result<(), AssignError> {
        if id != self.builtins && self.frame(self.builtins)?.vars.contains_key(&name) {
            return Err(AssignError::Builtin(name));
        }
        let frame = self.frame_mut(id)?;
        if frame.vars.get(&name).is_some_and(|v| v.constant) {
            return Err(AssignError::Constant(name));
        }
        frame.vars.insert(name, var);
        Ok(())
    }

    /// Reassign the nearest binding of `name`.
    pub fn update(&mut self, id: ScopeId, name: &str, value: Value) -> Result<(), AssignError> {
        let mut current = Some(id);
        while let Some(scope) = current {
            let is_builtin = scope == self.builtins;
            let frame = self.frame_mut(scope)?;
            if let Some(var) = frame.vars.get_mut(name) {
                if is_builtin {
                    return Err(AssignError::Builtin(name.into()));
                }
                if var.constant {
                    return Err(AssignError::Constant(name.into()));
                }
                var.value = value;
                return Ok(());
            }
            current = frame.parent;
        }
        Err(AssignError::Undefined(name.into()))
    }

    pub fn is_defined_in_current_scope(&self, id: ScopeId, name: &str) -> bool {
        self.frame(id).is_ok_and(|f| f.vars.contains_key(name))
    }

    pub fn owner(&self, id: ScopeId) -> Option<ScopeOwner> {
        self.frame(id).ok().map(|f| f.owner)
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.frame(id).ok()?.parent
    }

    pub fn set_module(&mut self, id: ScopeId, module: Arc<ModuleData>) -> Result<(), AssignError> {
        self.frame_mut(id)?.module = Some(module);
        Ok(())
    }

    /// Module the frame belongs to, from the nearest ancestor that has one.
    pub fn module(&self, id: ScopeId) -> Option<Arc<ModuleData>> {
        let mut current = Some(id);
        while let Some(id) = current {
            let frame = self.frame(id).ok()?;
            if let Some(module) = &frame.module {
                return Some(module.clone());
            }
            current = frame.parent;
        }
        None
    }

    /// Nearest enclosing module frame.
    pub fn module_scope(&self, id: ScopeId) -> Option<ScopeId> {
        let mut current = Some(id);
        while let Some(id) = current {
            let frame = self.frame(id).ok()?;
            if frame.owner == ScopeOwner::Module {
                return Some(id);
            }
            current = frame.parent;
        }
        None
    }

    /// Names bound directly in frame `id`.
    pub fn local_names(&self, id: ScopeId) -> Vec<Arc<str>> {
        self.frame(id)
            .map(|f| f.vars.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of frames currently allocated.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.frame.is_some()).count()
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
