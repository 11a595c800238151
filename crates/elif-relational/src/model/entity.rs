//! Model entity - the observable record
//!
//! A [`Model`] is a shared handle to a mutable attribute map with change
//! tracking and synchronous notifications. Clones of a handle refer to the
//! same instance.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use serde_json::Value;

use crate::collection::Collection;
use crate::error::ModelResult;
use crate::events::ModelEvent;
use crate::model::attributes::{Attribute, Attributes};
use crate::model::client_id::ClientId;
use crate::model::model_type::ModelType;
use crate::model::primary_key::PrimaryKey;
use crate::model::set_call::{ChangeSet, SetCall, SetOptions};
use crate::observers::{ObserverId, ObserverRegistry};
use crate::relationships::{intercept, AssociationBinding};

#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

/// Non-owning reference to a [`Model`]
#[derive(Debug, Clone)]
pub struct WeakModel(Weak<ModelInner>);

impl WeakModel {
    pub fn upgrade(&self) -> Option<Model> {
        self.0.upgrade().map(|inner| Model { inner })
    }
}

struct ModelInner {
    cid: ClientId,
    model_type: ModelType,
    state: RwLock<ModelState>,
    observers: ObserverRegistry<ModelEvent>,
    bindings: Mutex<HashMap<String, AssociationBinding>>,
}

#[derive(Default)]
struct ModelState {
    attributes: Attributes,
    previous: Attributes,
    changed: Vec<String>,
}

impl Model {
    pub(crate) fn new(model_type: &ModelType) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                cid: ClientId::next(),
                model_type: model_type.clone(),
                state: RwLock::new(ModelState::default()),
                observers: ObserverRegistry::new(),
                bindings: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn cid(&self) -> ClientId {
        self.inner.cid
    }

    pub fn model_type(&self) -> &ModelType {
        &self.inner.model_type
    }

    pub fn is_instance_of(&self, model_type: &ModelType) -> bool {
        self.inner.model_type.same_type(model_type)
    }

    pub fn same_instance(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakModel {
        WeakModel(Arc::downgrade(&self.inner))
    }

    pub fn id_attribute(&self) -> &str {
        self.inner.model_type.id_attribute()
    }

    /// Primary key read from the id attribute
    pub fn id(&self) -> Option<PrimaryKey> {
        self.get(self.id_attribute())
            .as_ref()
            .and_then(Attribute::as_value)
            .and_then(PrimaryKey::from_value)
    }

    /// A model is new until it has a primary key
    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    pub fn get(&self, name: &str) -> Option<Attribute> {
        self.read_state().attributes.get(name).cloned()
    }

    /// True when `name` holds a non-null value
    pub fn has(&self, name: &str) -> bool {
        self.read_state().attributes.has(name)
    }

    /// The collection stored under `name`, if it holds one
    pub fn association(&self, name: &str) -> Option<Collection> {
        match self.get(name) {
            Some(Attribute::Collection(collection)) => Some(collection),
            _ => None,
        }
    }

    /// Snapshot of all attributes
    pub fn attributes(&self) -> Attributes {
        self.read_state().attributes.clone()
    }

    /// Assign attributes.
    ///
    /// Accepts every [`SetCall`] shape. For model types that declare
    /// associations, association values are materialized into collections
    /// before the attributes are stored.
    pub fn set(&self, call: impl Into<SetCall>) -> ModelResult<ChangeSet> {
        let (attrs, options) = call.into().normalize();
        match self.inner.model_type.associations() {
            Some(source) => intercept::assign(self, attrs, options, source),
            None => Ok(self.set_attributes(attrs, &options)),
        }
    }

    /// Store attributes as given, with no association handling.
    ///
    /// Emits `FieldChanged` for every attribute whose value changed, then a
    /// single `Change`, unless `options.silent` is set.
    pub fn set_attributes(&self, attrs: Attributes, options: &SetOptions) -> ChangeSet {
        let (changed, _) = self.commit(attrs, options, Vec::new());
        self.notify(changed, options)
    }

    /// Store attributes and swap association bindings in one critical
    /// section, then notify. Returns the change set and the bindings that
    /// were replaced, for the caller to release.
    pub(crate) fn assign_with_bindings(
        &self,
        attrs: Attributes,
        options: &SetOptions,
        bindings: Vec<(String, Option<AssociationBinding>)>,
    ) -> (ChangeSet, Vec<AssociationBinding>) {
        let (changed, replaced) = self.commit(attrs, options, bindings);
        (self.notify(changed, options), replaced)
    }

    // Lock order: state, then bindings
    fn commit(
        &self,
        attrs: Attributes,
        options: &SetOptions,
        bindings: Vec<(String, Option<AssociationBinding>)>,
    ) -> (Vec<String>, Vec<AssociationBinding>) {
        let mut state = self.write_state();

        let mut replaced = Vec::new();
        if !bindings.is_empty() {
            let mut held = self.lock_bindings();
            for (name, binding) in bindings {
                let previous = match binding {
                    Some(binding) => held.insert(name, binding),
                    None => held.remove(&name),
                };
                replaced.extend(previous);
            }
        }

        let previous = state.attributes.clone();
        let mut changed = Vec::new();
        for (name, value) in attrs {
            if options.unset {
                if state.attributes.remove(&name).is_some() {
                    changed.push(name);
                }
            } else if state.attributes.get(&name) != Some(&value) {
                state.attributes.insert(name.clone(), value);
                changed.push(name);
            }
        }

        state.previous = previous;
        state.changed = changed.clone();
        (changed, replaced)
    }

    fn notify(&self, changed: Vec<String>, options: &SetOptions) -> ChangeSet {
        if !options.silent {
            for name in &changed {
                self.trigger(&ModelEvent::FieldChanged { name: name.clone() });
            }
            if !changed.is_empty() {
                self.trigger(&ModelEvent::Change);
            }
        }

        ChangeSet::new(changed)
    }

    /// Remove one attribute
    pub fn unset(&self, name: &str, options: SetOptions) -> ModelResult<ChangeSet> {
        self.set(SetCall::field(name, Attribute::null()).with_options(SetOptions {
            unset: true,
            ..options
        }))
    }

    /// Remove every attribute
    pub fn clear(&self, options: SetOptions) -> ModelResult<ChangeSet> {
        let attrs: Attributes = self
            .read_state()
            .attributes
            .keys()
            .map(|name| (name.clone(), Attribute::null()))
            .collect();
        self.set(SetCall::Map {
            attrs,
            options: SetOptions {
                unset: true,
                ..options
            },
        })
    }

    /// Value of `name` before the last assignment
    pub fn previous(&self, name: &str) -> Option<Attribute> {
        self.read_state().previous.get(name).cloned()
    }

    pub fn previous_attributes(&self) -> Attributes {
        self.read_state().previous.clone()
    }

    /// Attributes changed by the last assignment
    pub fn changed_attributes(&self) -> Vec<String> {
        self.read_state().changed.clone()
    }

    pub fn has_changed(&self, name: &str) -> bool {
        self.read_state().changed.iter().any(|changed| changed == name)
    }

    /// Serialize for a sync backend. Associations that were never loaded are
    /// absent and therefore omitted.
    pub fn to_json(&self) -> Value {
        self.read_state().attributes.to_json()
    }

    pub fn on<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&ModelEvent) + Send + Sync + 'static,
    {
        self.inner.observers.register(observer)
    }

    pub fn off(&self, id: ObserverId) -> bool {
        self.inner.observers.unregister(id)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.observer_count()
    }

    /// Emit a bare `Change` notification
    pub fn trigger_change(&self) {
        self.trigger(&ModelEvent::Change);
    }

    pub(crate) fn trigger(&self, event: &ModelEvent) {
        self.inner.observers.trigger(event);
    }

    /// True while the association stored under `name` propagates its
    /// changes to this model
    pub fn is_association_bound(&self, name: &str) -> bool {
        self.lock_bindings()
            .get(name)
            .is_some_and(AssociationBinding::is_bound)
    }

    /// Stop propagating changes of the association stored under `name`
    pub fn unbind_association(&self, name: &str) -> bool {
        let binding = self.lock_bindings().remove(name);
        binding.is_some_and(AssociationBinding::unbind)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, ModelState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, ModelState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_bindings(&self) -> std::sync::MutexGuard<'_, HashMap<String, AssociationBinding>> {
        self.inner.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ModelInner {
    fn drop(&mut self) {
        let bindings = self.bindings.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, binding) in bindings.drain() {
            binding.unbind();
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Model");
        debug
            .field("type", &self.inner.model_type.name())
            .field("cid", &self.inner.cid);
        match self.inner.state.try_read() {
            Ok(state) => debug.field("attributes", &state.attributes),
            Err(_) => debug.field("attributes", &"<locked>"),
        };
        debug.finish()
    }
}
