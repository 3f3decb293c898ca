//! In-memory store for tests and ephemeral sessions.

use std::collections::BTreeMap;

use crate::{validate_key, Error, KeyValueStore};

/// A `KeyValueStore` backed by a plain map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries. Useful in tests asserting isolation.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        validate_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("mockdb.demo").unwrap(), None);

        store.set("mockdb.demo", r#"{"products":[]}"#).unwrap();
        assert_eq!(
            store.get("mockdb.demo").unwrap().as_deref(),
            Some(r#"{"products":[]}"#)
        );

        store.set("mockdb.demo", "{}").unwrap();
        assert_eq!(store.get("mockdb.demo").unwrap().as_deref(), Some("{}"));

        store.remove("mockdb.demo").unwrap();
        assert_eq!(store.get("mockdb.demo").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn invalid_key_is_rejected() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.set("bad/key", "x"),
            Err(Error::InvalidKey { .. })
        ));
    }
}
