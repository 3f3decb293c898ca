//! Persistence of per-exercise edit maps.

use std::collections::BTreeMap;

use sandbench_kv::KeyValueStore;

use crate::{Error, VirtualPath};

/// Loads and saves one exercise's `path -> content` edit map through a
/// [`KeyValueStore`], under the `edits.<exercise>` key. An absent key means
/// "no edits yet"; each save fully overwrites the snapshot.
pub struct EditStore<S> {
    store: S,
}

impl<S: KeyValueStore> EditStore<S> {
    pub fn new(store: S) -> Self {
        EditStore { store }
    }

    fn key(exercise_id: &str) -> String {
        format!("edits.{}", exercise_id)
    }

    /// Load the saved edit map for `exercise_id`, empty if none was saved.
    pub fn load(&self, exercise_id: &str) -> Result<BTreeMap<VirtualPath, String>, Error> {
        match self.store.get(&Self::key(exercise_id))? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Persist the full edit map for `exercise_id`.
    pub fn save(
        &mut self,
        exercise_id: &str,
        edits: &BTreeMap<VirtualPath, String>,
    ) -> Result<(), Error> {
        log::debug!("Saving {} edited file(s) for '{}'...", edits.len(), exercise_id);
        let raw = serde_json::to_string(edits)?;
        self.store.set(&Self::key(exercise_id), &raw)?;
        Ok(())
    }

    /// Drop the saved edits for `exercise_id` (revert to seed on next load).
    pub fn clear(&mut self, exercise_id: &str) -> Result<(), Error> {
        self.store.remove(&Self::key(exercise_id))?;
        Ok(())
    }

    /// Access the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }
}
