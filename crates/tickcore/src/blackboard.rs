use crate::{lock, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Narrow contract the node core consumes from the shared data store.
///
/// The store is externally owned and shared by reference across every node
/// of a tree instance; it is responsible for its own thread-safety, storage
/// and lifetime. The core only ever performs single get/set calls through
/// this trait, one per parameter operation.
pub trait Blackboard: Send + Sync {
    /// Returns a snapshot of the entry under `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Creates the entry if absent, otherwise overwrites both its value and
    /// its dynamic type.
    fn set(&self, key: &str, value: Value);
}

/// Shared handle to a blackboard, cloned into every node of the same tree.
pub type BlackboardHandle = Arc<dyn Blackboard>;

/// Default in-process blackboard backed by a locked hash map.
#[derive(Default)]
pub struct InMemoryBlackboard {
    entries: Mutex<HashMap<String, Value>>,
}

impl InMemoryBlackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for the common case of one store shared across a tree.
    pub fn shared() -> BlackboardHandle {
        Arc::new(Self::new())
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

impl Blackboard for InMemoryBlackboard {
    fn get(&self, key: &str) -> Option<Value> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        lock(&self.entries).insert(key.to_string(), value);
    }
}
