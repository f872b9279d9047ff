//! Handles to the state a goose program's interpreters share.
//!
//! The main interpreter and every generator worker it forks see one scope
//! arena, one module cache and one native table. The native table is fixed
//! once the interpreter is built, so it needs no lock; the arena and the
//! cache change while the program runs.
//!
//! Lock discipline: a guard covers one arena or cache operation. Holding a
//! guard while evaluating (which may call back into the same state) or while
//! waiting on a generator channel would deadlock, because the worker on the
//! other end takes the same lock. [`SharedMutableRegistry::with_read`] and
//! [`SharedMutableRegistry::with_write`] make the short scope explicit.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read-only table built before the program starts.
pub struct SharedRegistry<T>(Arc<T>);

impl<T> SharedRegistry<T> {
    pub fn new(registry: T) -> Self {
        SharedRegistry(Arc::new(registry))
    }

    /// Whether both handles point at the same table.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for SharedRegistry<T> {
    fn clone(&self) -> Self {
        SharedRegistry(Arc::clone(&self.0))
    }
}

impl<T> std::ops::Deref for SharedRegistry<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedRegistry").field(&*self.0).finish()
    }
}

/// State that changes at run time, behind a `parking_lot` lock.
pub struct SharedMutableRegistry<T>(Arc<RwLock<T>>);

impl<T> SharedMutableRegistry<T> {
    pub fn new(registry: T) -> Self {
        SharedMutableRegistry(Arc::new(RwLock::new(registry)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Run `f` under the read lock and release it before returning.
    pub fn with_read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.read())
    }

    /// Run `f` under the write lock and release it before returning.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.write())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for SharedMutableRegistry<T> {
    fn clone(&self) -> Self {
        SharedMutableRegistry(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for SharedMutableRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Locking here could deadlock a caller that already holds a guard.
        write!(f, "SharedMutableRegistry<{}>", std::any::type_name::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clones_share_one_table() {
        let table = SharedRegistry::new(vec![1, 2, 3]);
        let other = table.clone();
        assert!(table.ptr_eq(&other));
        assert!(!table.ptr_eq(&SharedRegistry::new(vec![1, 2, 3])));
        assert_eq!(other.len(), 3);
    }

    #[test]
    fn writes_are_visible_through_clones() {
        let counter = SharedMutableRegistry::new(0_u32);
        let worker = counter.clone();
        worker.with_write(|n| *n += 2);
        assert_eq!(counter.with_read(|n| *n), 2);
        assert!(counter.ptr_eq(&worker));
    }

    #[test]
    fn guards_are_released_between_calls() {
        let cache = SharedMutableRegistry::new(Vec::<u8>::new());
        cache.with_write(|items| items.push(1));
        // A second write would block forever if the first guard leaked.
        cache.with_write(|items| items.push(2));
        assert_eq!(*cache.read(), vec![1, 2]);
    }
}
