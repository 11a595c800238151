//! Model types - named entity definitions with identity, defaults and
//! association declarations

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::RelationalConfig;
use crate::error::ModelResult;
use crate::model::attributes::{Attribute, Attributes};
use crate::model::Model;
use crate::relationships::{AssociationSource, Associations, TypeRegistry};

/// A model type. Cheap to clone; clones refer to the same type.
#[derive(Clone)]
pub struct ModelType {
    inner: Arc<ModelTypeInner>,
}

struct ModelTypeInner {
    name: String,
    id_attribute: String,
    defaults: Attributes,
    associations: Option<AssociationSource>,
    config: RelationalConfig,
}

impl ModelType {
    /// A plain model type with no defaults and no associations
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    pub fn builder(name: impl Into<String>) -> ModelTypeBuilder {
        ModelTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn id_attribute(&self) -> &str {
        &self.inner.id_attribute
    }

    pub fn defaults(&self) -> &Attributes {
        &self.inner.defaults
    }

    pub fn associations(&self) -> Option<&AssociationSource> {
        self.inner.associations.as_ref()
    }

    /// True when the type declares has-many associations
    pub fn is_relational(&self) -> bool {
        self.inner.associations.is_some()
    }

    pub fn config(&self) -> &RelationalConfig {
        &self.inner.config
    }

    pub fn same_type(&self, other: &ModelType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// A blank instance: no defaults applied, no assignment run
    pub fn instantiate(&self) -> Model {
        Model::new(self)
    }

    /// Construct an instance from a field-set. Defaults fill in missing keys
    /// and the field-set goes through the normal assignment, so declared
    /// associations are materialized.
    pub fn create(&self, attrs: Attributes) -> ModelResult<Model> {
        let mut attrs = attrs;
        attrs.merge_defaults(&self.inner.defaults);

        let model = self.instantiate();
        model.set(attrs)?;
        Ok(model)
    }

    pub fn create_from_json(&self, value: Value) -> ModelResult<Model> {
        self.create(Attributes::from_json(value)?)
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.inner.name)
            .field("id_attribute", &self.inner.id_attribute)
            .field("relational", &self.is_relational())
            .finish()
    }
}

/// Builder for [`ModelType`]
pub struct ModelTypeBuilder {
    name: String,
    id_attribute: Option<String>,
    defaults: Attributes,
    associations: Option<AssociationSource>,
    config: RelationalConfig,
}

impl ModelTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_attribute: None,
            defaults: Attributes::new(),
            associations: None,
            config: RelationalConfig::default(),
        }
    }

    /// Override the identity attribute (defaults to the config's `id_attribute`)
    pub fn id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = Some(name.into());
        self
    }

    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<Attribute>) -> Self {
        self.defaults.insert(name, value);
        self
    }

    pub fn defaults(mut self, defaults: Attributes) -> Self {
        self.defaults = defaults;
        self
    }

    /// Declare associations up front
    pub fn associations(mut self, associations: Associations) -> Self {
        self.associations = Some(AssociationSource::Static(associations));
        self
    }

    /// Declare associations through a resolver that runs on every assignment,
    /// for declarations that name types defined later
    pub fn deferred_associations<F>(mut self, resolver: F) -> Self
    where
        F: Fn() -> ModelResult<Associations> + Send + Sync + 'static,
    {
        self.associations = Some(AssociationSource::deferred(resolver));
        self
    }

    /// Declare associations from JSON configuration, resolving type names
    /// against `registry` at assignment time
    pub fn associations_from_config(self, config: Value, registry: TypeRegistry) -> Self {
        self.deferred_associations(move || Associations::from_config(&config, &registry))
    }

    pub fn config(mut self, config: RelationalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ModelType {
        let id_attribute = self
            .id_attribute
            .unwrap_or_else(|| self.config.get_id_attribute().clone());

        ModelType {
            inner: Arc::new(ModelTypeInner {
                name: self.name,
                id_attribute,
                defaults: self.defaults,
                associations: self.associations,
                config: self.config,
            }),
        }
    }
}
