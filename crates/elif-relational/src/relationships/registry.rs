//! Type Registry - named model and collection types for late-bound declarations

use std::sync::Arc;

use dashmap::DashMap;

use crate::collection::CollectionType;
use crate::error::AssociationError;
use crate::model::ModelType;

/// Thread-safe registry of model and collection types by name.
///
/// Deferred and configuration-driven association declarations look types up
/// here when an assignment runs, so a declaration may name a type that is
/// registered after the declaring type is built.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    /// Model type name -> model type
    models: Arc<DashMap<String, ModelType>>,

    /// Collection type name -> collection type
    collections: Arc<DashMap<String, CollectionType>>,
}

impl TypeRegistry {
    /// Create a new empty type registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model type under its name, returning the type it replaces
    pub fn register_model(&self, model_type: ModelType) -> Option<ModelType> {
        tracing::debug!(model = model_type.name(), "registering model type");
        self.models.insert(model_type.name().to_string(), model_type)
    }

    /// Register a collection type under its name, returning the type it replaces
    pub fn register_collection(&self, collection_type: CollectionType) -> Option<CollectionType> {
        tracing::debug!(collection = collection_type.name(), "registering collection type");
        self.collections
            .insert(collection_type.name().to_string(), collection_type)
    }

    pub fn model(&self, name: &str) -> Option<ModelType> {
        self.models.get(name).map(|entry| entry.value().clone())
    }

    pub fn collection(&self, name: &str) -> Option<CollectionType> {
        self.collections.get(name).map(|entry| entry.value().clone())
    }

    /// Look up a model type named by the declaration of `association`
    pub fn resolve_model(&self, association: &str, name: &str) -> Result<ModelType, AssociationError> {
        self.model(name).ok_or_else(|| {
            AssociationError::unresolved(association, format!("unknown model type '{}'", name))
        })
    }

    /// Look up a collection type named by the declaration of `association`
    pub fn resolve_collection(
        &self,
        association: &str,
        name: &str,
    ) -> Result<CollectionType, AssociationError> {
        self.collection(name).ok_or_else(|| {
            AssociationError::unresolved(association, format!("unknown collection type '{}'", name))
        })
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Registered model type names, sorted
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Registered collection type names, sorted
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Get statistics about the registry
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            model_types: self.models.len(),
            collection_types: self.collections.len(),
            relational_model_types: self
                .models
                .iter()
                .filter(|entry| entry.value().is_relational())
                .count(),
        }
    }

    /// Clear all registered types
    pub fn clear(&self) {
        self.models.clear();
        self.collections.clear();
    }
}

/// Statistics about the type registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub model_types: usize,
    pub collection_types: usize,
    pub relational_model_types: usize,
}

/// Global registry instance for the application
static GLOBAL_REGISTRY: std::sync::OnceLock<TypeRegistry> = std::sync::OnceLock::new();

/// Get the global type registry
pub fn global_registry() -> &'static TypeRegistry {
    GLOBAL_REGISTRY.get_or_init(TypeRegistry::new)
}
