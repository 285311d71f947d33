//! In-memory store, for tests and ephemeral sessions.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::ports::{CharacterStore, StoreError};

/// Map-backed store. Clones share the same underlying map, so a service
/// can be reloaded from the store it previously saved to.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CharacterStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, payload: &[u8]) -> Result<(), StoreError> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), payload.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_none_for_unset_key() {
        let store = MemoryStore::new();
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn set_replaces_previous_value_and_clones_share_state() {
        let store = MemoryStore::new();
        let alias = store.clone();
        store.set("k", b"one").unwrap();
        alias.set("k", b"two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"two"[..]));
    }
}
