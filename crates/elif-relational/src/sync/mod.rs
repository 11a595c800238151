//! Sync - persistence of models through a pluggable adapter
//!
//! A [`SyncAdapter`] stores JSON records keyed by model type name and primary
//! key. Models read and write themselves through one with
//! [`Model::fetch`], [`Model::save`] and [`Model::destroy`]. Responses are
//! assigned back through [`Model::set`], so association data in a response is
//! materialized like any other assignment, and associations a response omits
//! are left as they are.

pub mod memory;

pub use memory::MemoryAdapter;

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::events::ModelEvent;
use crate::model::{Attributes, ChangeSet, Model, PrimaryKey};

/// Storage backend for models
pub trait SyncAdapter: Send + Sync {
    /// Read the stored record of `model_type` with primary key `id`
    fn read(&self, model_type: &str, id: &PrimaryKey) -> ModelResult<Value>;

    /// Store a new record and return it as stored, including its new key
    fn create(&self, model_type: &str, payload: Value) -> ModelResult<Value>;

    /// Update an existing record and return it as stored
    fn update(&self, model_type: &str, id: &PrimaryKey, payload: Value) -> ModelResult<Value>;

    /// Remove a record
    fn delete(&self, model_type: &str, id: &PrimaryKey) -> ModelResult<()>;
}

impl Model {
    /// Load this model's record and assign it.
    ///
    /// Associations missing from the record keep their current value.
    pub fn fetch(&self, adapter: &dyn SyncAdapter) -> ModelResult<ChangeSet> {
        let id = self.id().ok_or(ModelError::MissingPrimaryKey)?;
        tracing::debug!(model = self.model_type().name(), id = %id, "fetching model");

        let response = adapter.read(self.model_type().name(), &id)?;
        self.apply_response(response)
    }

    /// Create or update this model's record and assign the stored result.
    ///
    /// Associations that were never loaded are not part of the payload.
    pub fn save(&self, adapter: &dyn SyncAdapter) -> ModelResult<ChangeSet> {
        let payload = self.to_json();
        let response = match self.id() {
            None => {
                tracing::debug!(model = self.model_type().name(), "creating model");
                adapter.create(self.model_type().name(), payload)?
            }
            Some(id) => {
                tracing::debug!(model = self.model_type().name(), id = %id, "updating model");
                adapter.update(self.model_type().name(), &id, payload)?
            }
        };
        self.apply_response(response)
    }

    /// Remove this model's record. Returns false for a new model, which has
    /// no record to remove.
    pub fn destroy(&self, adapter: &dyn SyncAdapter) -> ModelResult<bool> {
        let Some(id) = self.id() else {
            return Ok(false);
        };
        tracing::debug!(model = self.model_type().name(), id = %id, "destroying model");

        adapter.delete(self.model_type().name(), &id)?;
        Ok(true)
    }

    fn apply_response(&self, response: Value) -> ModelResult<ChangeSet> {
        let changes = self.set(Attributes::from_json(response)?)?;
        self.trigger(&ModelEvent::Synced);
        Ok(changes)
    }
}
