//! Association declaration tables

use std::borrow::Cow;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ModelError, ModelResult};

use super::descriptor::AssociationDescriptor;
use super::registry::TypeRegistry;

/// Association name → descriptor, for one model type
#[derive(Debug, Clone, Default)]
pub struct Associations {
    entries: BTreeMap<String, AssociationDescriptor>,
}

impl Associations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declaration of a has-many association
    pub fn has_many(mut self, name: impl Into<String>, descriptor: impl Into<AssociationDescriptor>) -> Self {
        self.entries.insert(name.into(), descriptor.into());
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        descriptor: impl Into<AssociationDescriptor>,
    ) -> Option<AssociationDescriptor> {
        self.entries.insert(name.into(), descriptor.into())
    }

    pub fn get(&self, name: &str) -> Option<&AssociationDescriptor> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, AssociationDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a declaration table from a JSON object of
    /// `name → descriptor` entries (see [`AssociationDescriptor::from_config`])
    pub fn from_config(config: &Value, registry: &TypeRegistry) -> ModelResult<Self> {
        let entries = config.as_object().ok_or_else(|| {
            ModelError::Configuration("association declarations must be a JSON object".to_string())
        })?;

        let mut associations = Self::new();
        for (name, value) in entries {
            associations.insert(name.clone(), AssociationDescriptor::from_config(name, value, registry)?);
        }
        Ok(associations)
    }
}

impl<'a> IntoIterator for &'a Associations {
    type Item = (&'a String, &'a AssociationDescriptor);
    type IntoIter = btree_map::Iter<'a, String, AssociationDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Resolver for declaration tables that reference types defined later
pub type AssociationResolver = dyn Fn() -> ModelResult<Associations> + Send + Sync;

/// Where a model type's declarations come from
#[derive(Clone)]
pub enum AssociationSource {
    /// Fixed when the model type is built
    Static(Associations),
    /// Recomputed on every assignment
    Deferred(Arc<AssociationResolver>),
}

impl AssociationSource {
    pub fn deferred<F>(resolver: F) -> Self
    where
        F: Fn() -> ModelResult<Associations> + Send + Sync + 'static,
    {
        AssociationSource::Deferred(Arc::new(resolver))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, AssociationSource::Deferred(_))
    }

    pub fn resolve(&self) -> ModelResult<Cow<'_, Associations>> {
        match self {
            AssociationSource::Static(associations) => Ok(Cow::Borrowed(associations)),
            AssociationSource::Deferred(resolver) => resolver().map(Cow::Owned),
        }
    }
}

impl From<Associations> for AssociationSource {
    fn from(associations: Associations) -> Self {
        AssociationSource::Static(associations)
    }
}

impl fmt::Debug for AssociationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationSource::Static(associations) => {
                f.debug_tuple("Static").field(associations).finish()
            }
            AssociationSource::Deferred(_) => f.write_str("Deferred(<resolver>)"),
        }
    }
}
