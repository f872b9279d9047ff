//! RAII guard for scope frames.
//!
//! [`ScopedFrame`] owns one freshly forked frame and releases it back to
//! the arena when dropped, including when evaluation unwinds with an
//! error. It derefs to the interpreter, so the guarded code reads exactly
//! like unguarded code:
//!
//! ```text
//! interp.with_scope(parent, ScopeOwner::Block, |frame, scope| {
//!     frame.define(scope, "x", Variable::mutable(value))?;
//!     frame.exec_block(body, scope)
//! })
//! ```
//!
//! Frames captured by a closure are pinned and survive the release.

use std::ops::{Deref, DerefMut};

use super::Interpreter;
use crate::environment::{ScopeId, ScopeOwner};
use crate::errors::EvalError;

pub struct ScopedFrame<'a> {
    interp: &'a mut Interpreter,
    scope: ScopeId,
}

impl ScopedFrame<'_> {
    /// The guarded frame.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }
}

impl Drop for ScopedFrame<'_> {
    fn drop(&mut self) {
        self.interp.release_scope(self.scope);
    }
}

impl Deref for ScopedFrame<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interp
    }
}

impl DerefMut for ScopedFrame<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interp
    }
}

impl Interpreter {
    /// Fork a child of `parent` that is released when the guard drops.
    pub fn scoped(
        &mut self,
        parent: ScopeId,
        owner: ScopeOwner,
    ) -> Result<ScopedFrame<'_>, EvalError> {
        let scope = self.fork_scope(parent, owner)?;
        Ok(ScopedFrame {
            interp: self,
            scope,
        })
    }

    /// Run `f` in a fresh child frame of `parent`.
    pub(crate) fn with_scope<T>(
        &mut self,
        parent: ScopeId,
        owner: ScopeOwner,
        f: impl FnOnce(&mut ScopedFrame<'_>, ScopeId) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        let mut frame = self.scoped(parent, owner)?;
        let scope = frame.scope;
        f(&mut frame, scope)
    }
}
