//! In-memory sync adapter

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::error::{ModelError, ModelResult};
use crate::model::PrimaryKey;

use super::SyncAdapter;

/// Thread-safe in-memory record store keyed by model type name and primary
/// key. New records get auto-incremented integer keys; `update` merges the
/// payload into the stored record so fields the payload omits are kept.
#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    records: Arc<DashMap<(String, PrimaryKey), Map<String, Value>>>,
    next_id: Arc<AtomicI64>,
    id_attribute: String,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::with_id_attribute("id")
    }

    /// An adapter whose records carry their key under `id_attribute`
    pub fn with_id_attribute(id_attribute: impl Into<String>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
            id_attribute: id_attribute.into(),
        }
    }

    /// Seed a record. The record must be an object carrying a usable key;
    /// returns the key, or `None` when the record was not stored.
    pub fn insert(&self, model_type: &str, record: Value) -> Option<PrimaryKey> {
        let Value::Object(record) = record else {
            return None;
        };
        let id = record.get(&self.id_attribute).and_then(PrimaryKey::from_value)?;
        if let Some(n) = id.as_i64() {
            self.next_id.fetch_max(n + 1, Ordering::SeqCst);
        }
        self.records.insert((model_type.to_string(), id.clone()), record);
        Some(id)
    }

    /// The stored record, if any
    pub fn get(&self, model_type: &str, id: &PrimaryKey) -> Option<Value> {
        self.records
            .get(&(model_type.to_string(), id.clone()))
            .map(|record| Value::Object(record.value().clone()))
    }

    /// Number of records stored for `model_type`
    pub fn len(&self, model_type: &str) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.key().0 == model_type)
            .count()
    }

    pub fn is_empty(&self, model_type: &str) -> bool {
        self.len(model_type) == 0
    }

    pub fn clear(&self) {
        self.records.clear();
    }

    fn object(payload: Value) -> ModelResult<Map<String, Value>> {
        match payload {
            Value::Object(map) => Ok(map),
            other => Err(ModelError::Serialization(format!(
                "expected a JSON object payload, found {}",
                other
            ))),
        }
    }

    fn not_found(model_type: &str, id: &PrimaryKey) -> ModelError {
        ModelError::NotFound(format!("{} with {}", model_type, id))
    }
}

impl SyncAdapter for MemoryAdapter {
    fn read(&self, model_type: &str, id: &PrimaryKey) -> ModelResult<Value> {
        self.get(model_type, id)
            .ok_or_else(|| Self::not_found(model_type, id))
    }

    fn create(&self, model_type: &str, payload: Value) -> ModelResult<Value> {
        let mut record = Self::object(payload)?;
        let id = PrimaryKey::Integer(self.next_id.fetch_add(1, Ordering::SeqCst));
        record.insert(self.id_attribute.clone(), id.to_value());

        tracing::debug!(model = model_type, id = %id, "record created");
        self.records
            .insert((model_type.to_string(), id), record.clone());
        Ok(Value::Object(record))
    }

    fn update(&self, model_type: &str, id: &PrimaryKey, payload: Value) -> ModelResult<Value> {
        let changes = Self::object(payload)?;
        let mut record = self
            .records
            .get_mut(&(model_type.to_string(), id.clone()))
            .ok_or_else(|| Self::not_found(model_type, id))?;

        record.extend(changes);
        record.insert(self.id_attribute.clone(), id.to_value());

        tracing::debug!(model = model_type, id = %id, "record updated");
        Ok(Value::Object(record.value().clone()))
    }

    fn delete(&self, model_type: &str, id: &PrimaryKey) -> ModelResult<()> {
        self.records
            .remove(&(model_type.to_string(), id.clone()))
            .ok_or_else(|| Self::not_found(model_type, id))?;

        tracing::debug!(model = model_type, id = %id, "record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_assigns_incrementing_ids() {
        let adapter = MemoryAdapter::new();
        let first = adapter.create("Post", json!({"title": "a"})).unwrap();
        let second = adapter.create("Post", json!({"title": "b"})).unwrap();

        assert_eq!(first["id"], json!(1));
        assert_eq!(second["id"], json!(2));
        assert_eq!(adapter.len("Post"), 2);
    }

    #[test]
    fn test_insert_advances_next_id() {
        let adapter = MemoryAdapter::new();
        assert_eq!(adapter.insert("Blog", json!({"id": 5})), Some(PrimaryKey::Integer(5)));

        let created = adapter.create("Blog", json!({})).unwrap();
        assert_eq!(created["id"], json!(6));
    }

    #[test]
    fn test_insert_rejects_records_without_key() {
        let adapter = MemoryAdapter::new();
        assert!(adapter.insert("Blog", json!({"name": "no key"})).is_none());
        assert!(adapter.insert("Blog", json!([1, 2])).is_none());
        assert!(adapter.is_empty("Blog"));
    }

    #[test]
    fn test_update_merges_payload() {
        let adapter = MemoryAdapter::new();
        adapter.insert("Blog", json!({"id": 5, "name": "My Story", "posts": [{"title": "kept"}]}));

        let updated = adapter
            .update("Blog", &PrimaryKey::Integer(5), json!({"name": "Renamed"}))
            .unwrap();

        assert_eq!(updated["name"], json!("Renamed"));
        assert_eq!(updated["posts"], json!([{"title": "kept"}]));
    }

    #[test]
    fn test_missing_records() {
        let adapter = MemoryAdapter::new();
        let id = PrimaryKey::Integer(1);

        assert!(matches!(adapter.read("Blog", &id), Err(ModelError::NotFound(_))));
        assert!(matches!(adapter.update("Blog", &id, json!({})), Err(ModelError::NotFound(_))));
        assert!(matches!(adapter.delete("Blog", &id), Err(ModelError::NotFound(_))));
    }

    #[test]
    fn test_non_object_payload() {
        let adapter = MemoryAdapter::new();
        assert!(matches!(
            adapter.create("Blog", json!("nope")),
            Err(ModelError::Serialization(_))
        ));
    }

    #[test]
    fn test_records_are_scoped_by_type() {
        let adapter = MemoryAdapter::new();
        adapter.insert("Blog", json!({"id": 1}));

        assert!(adapter.get("Post", &PrimaryKey::Integer(1)).is_none());
        assert!(adapter.get("Blog", &PrimaryKey::Integer(1)).is_some());
    }

    #[test]
    fn test_custom_id_attribute() {
        let adapter = MemoryAdapter::with_id_attribute("uuid");
        let created = adapter.create("Blog", json!({})).unwrap();
        assert_eq!(created["uuid"], json!(1));
        assert!(created.get("id").is_none());
    }
}
