use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::Value;
use crate::errors::{frozen_value, index_out_of_range, EvalError};

pub type ArrayRef = Arc<Array>;

/// Shared, mutable list of values.
pub struct Array {
    items: RwLock<Vec<Value>>,
    frozen: AtomicBool,
}

impl Array {
    pub fn new(items: Vec<Value>) -> ArrayRef {
        Arc::new(Array {
            items: RwLock::new(items),
            frozen: AtomicBool::new(false),
        })
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    /// Copy of the current elements. Iteration works on snapshots so the
    /// lock is never held while user code runs.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    pub fn set(&self, index: usize, value: Value) -> Result<(), EvalError> {
        self.check_mutable()?;
        let mut items = self.items.write();
        match items.get_mut(index) {
            Some(slot) => {
                // Drop the old element after releasing the lock.
                let old = std::mem::replace(slot, value);
                drop(items);
                drop(old);
                Ok(())
            }
            None => Err(index_out_of_range(index)),
        }
    }

    pub fn push(&self, values: impl IntoIterator<Item = Value>) -> Result<(), EvalError> {
        self.check_mutable()?;
        self.items.write().extend(values);
        Ok(())
    }

    pub fn pop(&self) -> Result<Option<Value>, EvalError> {
        self.check_mutable()?;
        Ok(self.items.write().pop())
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

    fn check_mutable(&self) -> Result<(), EvalError> {
        if self.is_frozen() {
            Err(frozen_value())
        } else {
            Ok(())
        }
    }
}
