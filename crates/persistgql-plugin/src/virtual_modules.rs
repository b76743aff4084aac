//! Addressable in-memory module store.
//!
//! Content written here is visible to import resolution as if a real file
//! existed at that path. The store is cheaply cloneable; clones share state,
//! so a plugin can write while the host reads during resolution.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Slot {
    source: String,
    version: u64,
}

/// Shared name → source store with a per-name write counter.
#[derive(Debug, Clone, Default)]
pub struct VirtualModuleStore {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl VirtualModuleStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write (or overwrite) a virtual module's source.
    pub fn write(&self, name: &str, source: &str) {
        tracing::trace!(name, bytes = source.len(), "writing virtual module");
        let mut slots = self.slots.lock();
        let slot = slots.entry(name.to_string()).or_default();
        slot.source = source.to_string();
        slot.version += 1;
    }

    /// Current source of a virtual module, if one was written.
    pub fn read(&self, name: &str) -> Option<String> {
        self.slots.lock().get(name).map(|slot| slot.source.clone())
    }

    /// Whether a virtual module exists under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.lock().contains_key(name)
    }

    /// How many times `name` has been written. Lets callers observe that an
    /// unchanged map produced no republish.
    pub fn version(&self, name: &str) -> u64 {
        self.slots.lock().get(name).map(|slot| slot.version).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let store = VirtualModuleStore::new();
        let clone = store.clone();
        store.write("queries.json", "{}");
        assert_eq!(clone.read("queries.json").as_deref(), Some("{}"));
    }

    #[test]
    fn writes_bump_the_version() {
        let store = VirtualModuleStore::new();
        assert_eq!(store.version("queries.json"), 0);
        store.write("queries.json", "{}");
        store.write("queries.json", "{\"a\":1}");
        assert_eq!(store.version("queries.json"), 2);
        assert_eq!(store.read("queries.json").as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn missing_names_read_none() {
        assert_eq!(VirtualModuleStore::new().read("nope"), None);
    }
}
