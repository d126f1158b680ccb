//! In-memory store for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use super::{KvStore, StoreError};

/// A [`KvStore`] backed by a mutex-guarded map. Nothing survives the
/// process; useful in tests and for "private browsing" style sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently present, for test assertions.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        records.keys().cloned().collect()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        records.insert(key.to_owned(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        records.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_records_round_trip() {
        let store = MemoryStore::new();
        store
            .put_record("session", &json!({ "id": "u1" }))
            .expect("write");
        let back: Value = store
            .get_record("session")
            .expect("read")
            .expect("present");
        assert_eq!(back["id"], "u1");

        store.remove("session").expect("remove");
        assert!(store.get("session").expect("read").is_none());
    }
}
