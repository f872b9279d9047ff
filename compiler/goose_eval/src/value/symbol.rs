use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A unique key. Two symbols with the same name are still distinct;
/// identity is the process-wide `id`.
#[derive(Clone, Debug)]
pub struct Symbol {
    name: Arc<str>,
    id: u64,
}

impl Symbol {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Symbol {
            name: name.into(),
            id: NEXT_SYMBOL_ID.fetch_add(1, AtomicOrdering::Relaxed),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// `@name#id`, the form used in the symbol key space and in debug output.
    pub fn canonical(&self) -> String {
        format!("@{}#{}", self.name, self.id)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}
