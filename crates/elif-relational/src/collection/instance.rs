use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use serde_json::Value;

use crate::collection::CollectionType;
use crate::error::{ModelError, ModelResult};
use crate::events::CollectionEvent;
use crate::model::{Attributes, ClientId, Model, ModelType, PrimaryKey, WeakModel};
use crate::observers::{ObserverId, ObserverRegistry};

/// An ordered, observable set of models.
///
/// A model appears at most once. Member `Change` notifications are re-emitted
/// as [`CollectionEvent::Change`]. Cheap to clone; clones refer to the same
/// instance.
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

/// Non-owning reference to a [`Collection`]
#[derive(Debug, Clone)]
pub struct WeakCollection(Weak<CollectionInner>);

impl WeakCollection {
    pub fn upgrade(&self) -> Option<Collection> {
        self.0.upgrade().map(|inner| Collection { inner })
    }
}

struct CollectionInner {
    cid: ClientId,
    collection_type: CollectionType,
    model_type: Option<ModelType>,
    models: RwLock<Vec<Model>>,
    member_observers: Mutex<HashMap<ClientId, (WeakModel, ObserverId)>>,
    observers: ObserverRegistry<CollectionEvent>,
}

impl Collection {
    /// Seed a collection of `collection_type`. No events are emitted.
    pub fn new(collection_type: &CollectionType, models: Vec<Model>) -> Self {
        Self::with_model_type(collection_type, collection_type.model().cloned(), models)
    }

    /// Seed a collection whose members are built as `model_type` rather than
    /// the collection type's default
    pub fn with_model_type(
        collection_type: &CollectionType,
        model_type: Option<ModelType>,
        models: Vec<Model>,
    ) -> Self {
        let collection = Self {
            inner: Arc::new(CollectionInner {
                cid: ClientId::next(),
                collection_type: collection_type.clone(),
                model_type,
                models: RwLock::new(Vec::with_capacity(models.len())),
                member_observers: Mutex::new(HashMap::new()),
                observers: ObserverRegistry::new(),
            }),
        };
        collection.replace_members(models);
        collection
    }

    pub fn cid(&self) -> ClientId {
        self.inner.cid
    }

    pub fn collection_type(&self) -> &CollectionType {
        &self.inner.collection_type
    }

    /// Type used to build members from field-sets
    pub fn model_type(&self) -> Option<&ModelType> {
        self.inner.model_type.as_ref()
    }

    pub fn same_instance(&self, other: &Collection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakCollection {
        WeakCollection(Arc::downgrade(&self.inner))
    }

    pub fn len(&self) -> usize {
        self.read_models().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_models().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Model> {
        self.read_models().get(index).cloned()
    }

    pub fn first(&self) -> Option<Model> {
        self.read_models().first().cloned()
    }

    pub fn last(&self) -> Option<Model> {
        self.read_models().last().cloned()
    }

    pub fn get_by_id(&self, id: &PrimaryKey) -> Option<Model> {
        self.read_models()
            .iter()
            .find(|model| model.id().as_ref() == Some(id))
            .cloned()
    }

    pub fn get_by_cid(&self, cid: ClientId) -> Option<Model> {
        self.read_models().iter().find(|model| model.cid() == cid).cloned()
    }

    pub fn index_of(&self, model: &Model) -> Option<usize> {
        self.read_models().iter().position(|member| member.same_instance(model))
    }

    pub fn contains(&self, model: &Model) -> bool {
        self.index_of(model).is_some()
    }

    /// Snapshot of the members, in order
    pub fn models(&self) -> Vec<Model> {
        self.read_models().clone()
    }

    /// Append `model`; returns false if it is already a member
    pub fn add(&self, model: Model) -> bool {
        let index = {
            let mut models = self.write_models();
            if models.iter().any(|member| member.same_instance(&model)) {
                return false;
            }
            models.push(model.clone());
            models.len() - 1
        };

        self.watch(&model);
        self.inner.observers.trigger(&CollectionEvent::Add { model, index });
        true
    }

    /// Build a member from a field-set and append it
    pub fn add_attributes(&self, attrs: Attributes) -> ModelResult<Model> {
        let model_type = self.inner.model_type.as_ref().ok_or_else(|| {
            ModelError::Configuration(format!(
                "collection '{}' has no model type to build members with",
                self.inner.collection_type.name()
            ))
        })?;

        let model = model_type.create(attrs)?;
        self.add(model.clone());
        Ok(model)
    }

    /// Remove `model`; returns false if it was not a member
    pub fn remove(&self, model: &Model) -> bool {
        let removed = {
            let mut models = self.write_models();
            models
                .iter()
                .position(|member| member.same_instance(model))
                .map(|index| (index, models.remove(index)))
        };

        match removed {
            Some((index, model)) => {
                self.unwatch(&model);
                self.inner.observers.trigger(&CollectionEvent::Remove { model, index });
                true
            }
            None => false,
        }
    }

    /// Replace all members at once
    pub fn reset(&self, models: Vec<Model>) {
        self.replace_members(models);
        self.inner.observers.trigger(&CollectionEvent::Reset);
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.read_models().iter().map(Model::to_json).collect())
    }

    pub fn on<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&CollectionEvent) + Send + Sync + 'static,
    {
        self.inner.observers.register(observer)
    }

    pub fn off(&self, id: ObserverId) -> bool {
        self.inner.observers.unregister(id)
    }

    pub fn is_observing(&self, id: ObserverId) -> bool {
        self.inner.observers.is_registered(id)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.observer_count()
    }

    fn replace_members(&self, models: Vec<Model>) {
        let mut unique: Vec<Model> = Vec::with_capacity(models.len());
        for model in models {
            if !unique.iter().any(|member| member.same_instance(&model)) {
                unique.push(model);
            }
        }

        let previous = std::mem::replace(&mut *self.write_models(), unique.clone());
        for model in &previous {
            self.unwatch(model);
        }
        for model in &unique {
            self.watch(model);
        }
    }

    fn watch(&self, model: &Model) {
        let collection = self.downgrade();
        let member = model.downgrade();
        let id = model.on(move |event| {
            if !event.is_change() {
                return;
            }
            if let (Some(collection), Some(model)) = (collection.upgrade(), member.upgrade()) {
                collection.inner.observers.trigger(&CollectionEvent::Change { model });
            }
        });

        self.lock_member_observers()
            .insert(model.cid(), (model.downgrade(), id));
    }

    fn unwatch(&self, model: &Model) {
        let watched = self.lock_member_observers().remove(&model.cid());
        if let Some((_, id)) = watched {
            model.off(id);
        }
    }

    fn read_models(&self) -> std::sync::RwLockReadGuard<'_, Vec<Model>> {
        self.inner.models.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_models(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Model>> {
        self.inner.models.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_member_observers(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<ClientId, (WeakModel, ObserverId)>> {
        self.inner
            .member_observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CollectionInner {
    fn drop(&mut self) {
        let watched = self
            .member_observers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, (member, id)) in watched.drain() {
            if let Some(model) = member.upgrade() {
                model.off(id);
            }
        }
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Collection");
        debug
            .field("type", &self.inner.collection_type.name())
            .field("cid", &self.inner.cid);
        match self.inner.models.try_read() {
            Ok(models) => debug.field("len", &models.len()),
            Err(_) => debug.field("len", &"<locked>"),
        };
        debug.finish()
    }
}
