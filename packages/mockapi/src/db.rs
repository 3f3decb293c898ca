//! The persisted collection snapshot.

use std::collections::BTreeMap;

use sandbench_kv::KeyValueStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// The mock database: named collections of JSON records, each record carrying
/// a numeric `id`. Serializes to the exact persisted layout
/// (`{"products": [...]}`), one snapshot per exercise.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MockDb {
    #[serde(flatten)]
    collections: BTreeMap<String, Vec<Value>>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of `collection`, empty when the collection does not exist.
    pub fn records(&self, collection: &str) -> &[Value] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    fn id_of(record: &Value) -> Option<i64> {
        record.get("id").and_then(Value::as_i64)
    }

    /// The next monotonic id for `collection`: `max(existing ids) + 1`.
    pub fn next_id(&self, collection: &str) -> i64 {
        self.records(collection)
            .iter()
            .filter_map(Self::id_of)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Append `record` to `collection` under a freshly assigned id, returning
    /// the stored record. Any client-supplied `id` is overwritten.
    pub fn insert(&mut self, collection: &str, mut record: Value) -> Value {
        let id = self.next_id(collection);
        if let Some(object) = record.as_object_mut() {
            object.insert("id".to_string(), Value::from(id));
        }
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    pub fn find(&self, collection: &str, id: i64) -> Option<&Value> {
        self.records(collection)
            .iter()
            .find(|r| Self::id_of(r) == Some(id))
    }

    /// Shallow-merge `patch` into the record with `id`, returning the updated
    /// record. `None` when the id is unknown.
    pub fn merge(&mut self, collection: &str, id: i64, patch: &Value) -> Option<Value> {
        let records = self.collections.get_mut(collection)?;
        let record = records.iter_mut().find(|r| Self::id_of(r) == Some(id))?;

        if let (Some(target), Some(source)) = (record.as_object_mut(), patch.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
            // The identity of the record never changes under a merge.
            target.insert("id".to_string(), Value::from(id));
        }
        Some(record.clone())
    }

    /// Remove the record with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, collection: &str, id: i64) -> bool {
        match self.collections.get_mut(collection) {
            Some(records) => {
                let before = records.len();
                records.retain(|r| Self::id_of(r) != Some(id));
                records.len() != before
            }
            None => false,
        }
    }
}

fn key(exercise_id: &str) -> String {
    format!("mockdb.{}", exercise_id)
}

/// Load the persisted snapshot for `exercise_id`, if one exists.
pub fn load(store: &impl KeyValueStore, exercise_id: &str) -> Result<Option<MockDb>, Error> {
    match store.get(&key(exercise_id))? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Persist `db` as the full snapshot for `exercise_id`.
pub fn save(store: &mut impl KeyValueStore, exercise_id: &str, db: &MockDb) -> Result<(), Error> {
    let raw = serde_json::to_string(db)?;
    store.set(&key(exercise_id), &raw)?;
    Ok(())
}

/// Drop the persisted snapshot for `exercise_id`.
pub fn clear(store: &mut impl KeyValueStore, exercise_id: &str) -> Result<(), Error> {
    store.remove(&key(exercise_id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbench_kv::MemoryStore;
    use serde_json::json;

    fn seeded() -> MockDb {
        serde_json::from_value(json!({
            "products": [
                { "id": 1, "name": "Colombian Coffee", "price": 1299 },
                { "id": 3, "name": "Kenya AA", "price": 1399 },
            ]
        }))
        .unwrap()
    }

    #[test]
    fn ids_are_monotonic_past_the_max() {
        let mut db = seeded();
        assert_eq!(db.next_id("products"), 4);

        let created = db.insert("products", json!({ "name": "X", "price": 100 }));
        assert_eq!(created["id"], json!(4));
        assert_eq!(db.next_id("products"), 5);

        // Empty collection starts at 1.
        assert_eq!(db.next_id("orders"), 1);
    }

    #[test]
    fn insert_overwrites_client_supplied_id() {
        let mut db = seeded();
        let created = db.insert("products", json!({ "id": 999, "name": "Y", "price": 1 }));
        assert_eq!(created["id"], json!(4));
    }

    #[test]
    fn merge_is_shallow_and_preserves_id() {
        let mut db = seeded();
        let updated = db
            .merge("products", 1, &json!({ "price": 1099, "id": 777 }))
            .unwrap();
        assert_eq!(updated["price"], json!(1099));
        assert_eq!(updated["name"], json!("Colombian Coffee"));
        assert_eq!(updated["id"], json!(1));

        assert!(db.merge("products", 99, &json!({})).is_none());
    }

    #[test]
    fn remove_reports_effect() {
        let mut db = seeded();
        assert!(db.remove("products", 3));
        assert!(!db.remove("products", 3));
        assert_eq!(db.records("products").len(), 1);
    }

    #[test]
    fn persisted_layout_is_flat() {
        let raw = serde_json::to_string(&seeded()).unwrap();
        assert!(raw.starts_with("{\"products\":["));
    }

    #[test]
    fn snapshot_round_trip() {
        let mut store = MemoryStore::new();
        assert!(load(&store, "demo").unwrap().is_none());

        let db = seeded();
        save(&mut store, "demo", &db).unwrap();
        assert_eq!(load(&store, "demo").unwrap().unwrap(), db);

        clear(&mut store, "demo").unwrap();
        assert!(load(&store, "demo").unwrap().is_none());
    }
}
