use std::fmt;
use std::sync::Arc;

use crate::collection::Collection;
use crate::model::{Model, ModelType};

/// A collection type. Cheap to clone; clones refer to the same type.
#[derive(Clone)]
pub struct CollectionType {
    inner: Arc<CollectionTypeInner>,
}

struct CollectionTypeInner {
    name: String,
    model: Option<ModelType>,
}

impl CollectionType {
    /// A collection type with no default member type. Associations using it
    /// must name a model type in their options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(CollectionTypeInner {
                name: name.into(),
                model: None,
            }),
        }
    }

    /// A collection type whose members default to `model`
    pub fn of(name: impl Into<String>, model: &ModelType) -> Self {
        Self {
            inner: Arc::new(CollectionTypeInner {
                name: name.into(),
                model: Some(model.clone()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The declared default member type
    pub fn model(&self) -> Option<&ModelType> {
        self.inner.model.as_ref()
    }

    pub fn same_type(&self, other: &CollectionType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn instantiate(&self, models: Vec<Model>) -> Collection {
        Collection::new(self, models)
    }
}

impl fmt::Debug for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionType")
            .field("name", &self.inner.name)
            .field("model", &self.inner.model.as_ref().map(ModelType::name))
            .finish()
    }
}
