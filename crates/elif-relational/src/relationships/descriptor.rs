//! Association descriptors - the declaration of one has-many association

use serde::Deserialize;
use serde_json::Value;

use crate::collection::CollectionType;
use crate::error::AssociationError;
use crate::model::ModelType;

use super::registry::TypeRegistry;

/// Options of a configured association
#[derive(Debug, Clone, Default)]
pub struct AssociationOptions {
    /// Member type to build instead of the collection type's default
    pub model: Option<ModelType>,
    /// Do not propagate collection changes to the parent
    pub silent: bool,
}

impl AssociationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: &ModelType) -> Self {
        self.model = Some(model.clone());
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }
}

/// Declaration of one has-many association
#[derive(Debug, Clone)]
pub enum AssociationDescriptor {
    /// Shorthand: a collection type with its default member type
    Collection(CollectionType),
    /// A collection type with options
    Configured(CollectionType, AssociationOptions),
}

/// A descriptor with its member type resolved
#[derive(Debug, Clone)]
pub struct ResolvedAssociation {
    pub name: String,
    pub collection_type: CollectionType,
    pub model_type: ModelType,
    pub silent: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OptionsConfig {
    model: Option<String>,
    silent: bool,
}

impl AssociationDescriptor {
    pub fn collection_type(&self) -> &CollectionType {
        match self {
            AssociationDescriptor::Collection(collection_type) => collection_type,
            AssociationDescriptor::Configured(collection_type, _) => collection_type,
        }
    }

    pub fn options(&self) -> Option<&AssociationOptions> {
        match self {
            AssociationDescriptor::Collection(_) => None,
            AssociationDescriptor::Configured(_, options) => Some(options),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.options().is_some_and(|options| options.silent)
    }

    /// Resolve the member type: the options' model, else the collection
    /// type's default, else an error
    pub fn resolve(&self, name: &str) -> Result<ResolvedAssociation, AssociationError> {
        let collection_type = self.collection_type();
        let model_type = self
            .options()
            .and_then(|options| options.model.clone())
            .or_else(|| collection_type.model().cloned())
            .ok_or_else(|| {
                AssociationError::unresolved(
                    name,
                    format!(
                        "collection type '{}' declares no model type and the association names none",
                        collection_type.name()
                    ),
                )
            })?;

        Ok(ResolvedAssociation {
            name: name.to_string(),
            collection_type: collection_type.clone(),
            model_type,
            silent: self.is_silent(),
        })
    }

    /// Parse a declaration from configuration.
    ///
    /// Accepts `"Posts"` or `["Posts", {"model": "Post", "silent": true}]`,
    /// with type names looked up in `registry`.
    pub fn from_config(
        name: &str,
        value: &Value,
        registry: &TypeRegistry,
    ) -> Result<Self, AssociationError> {
        match value {
            Value::String(collection) => Ok(AssociationDescriptor::Collection(
                registry.resolve_collection(name, collection)?,
            )),
            Value::Array(pair) if pair.len() == 2 => {
                let collection = pair[0].as_str().ok_or_else(|| {
                    AssociationError::unresolved(name, "first element must name a collection type")
                })?;
                if !pair[1].is_object() {
                    return Err(AssociationError::unresolved(
                        name,
                        "second element must be an options object",
                    ));
                }
                let config: OptionsConfig = serde_json::from_value(pair[1].clone())
                    .map_err(|e| AssociationError::unresolved(name, e.to_string()))?;

                let mut options = AssociationOptions::new().silent(config.silent);
                if let Some(model) = config.model {
                    options = options.model(&registry.resolve_model(name, &model)?);
                }
                Ok(AssociationDescriptor::Configured(
                    registry.resolve_collection(name, collection)?,
                    options,
                ))
            }
            other => Err(AssociationError::unresolved(
                name,
                format!(
                    "expected a collection type name or a [collection, options] pair, found {}",
                    other
                ),
            )),
        }
    }
}

impl From<CollectionType> for AssociationDescriptor {
    fn from(collection_type: CollectionType) -> Self {
        AssociationDescriptor::Collection(collection_type)
    }
}

impl From<(CollectionType, AssociationOptions)> for AssociationDescriptor {
    fn from((collection_type, options): (CollectionType, AssociationOptions)) -> Self {
        AssociationDescriptor::Configured(collection_type, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> (TypeRegistry, ModelType, CollectionType) {
        let registry = TypeRegistry::new();
        let post_type = ModelType::new("Post");
        let posts_type = CollectionType::of("Posts", &post_type);
        registry.register_model(post_type.clone());
        registry.register_collection(posts_type.clone());
        registry.register_collection(CollectionType::new("Collection"));
        (registry, post_type, posts_type)
    }

    #[test]
    fn test_shorthand_resolves_collection_default_model() {
        let (_, post_type, posts_type) = registry();
        let resolved = AssociationDescriptor::from(posts_type.clone())
            .resolve("posts")
            .unwrap();

        assert_eq!(resolved.name, "posts");
        assert!(resolved.collection_type.same_type(&posts_type));
        assert!(resolved.model_type.same_type(&post_type));
        assert!(!resolved.silent);
    }

    #[test]
    fn test_options_model_overrides_collection_default() {
        let (_, _, posts_type) = registry();
        let draft_type = ModelType::new("Draft");
        let descriptor = AssociationDescriptor::from((
            posts_type,
            AssociationOptions::new().model(&draft_type).silent(true),
        ));

        let resolved = descriptor.resolve("drafts").unwrap();
        assert!(resolved.model_type.same_type(&draft_type));
        assert!(resolved.silent);
    }

    #[test]
    fn test_missing_model_type_is_unresolved() {
        let descriptor = AssociationDescriptor::from(CollectionType::new("Collection"));
        let err = descriptor.resolve("posts").unwrap_err();
        assert!(matches!(err, AssociationError::UnresolvedDeclaration { .. }));
        assert_eq!(err.association(), "posts");
    }

    #[test]
    fn test_from_config_shorthand() {
        let (registry, post_type, _) = registry();
        let descriptor = AssociationDescriptor::from_config("posts", &json!("Posts"), &registry).unwrap();
        assert!(descriptor.resolve("posts").unwrap().model_type.same_type(&post_type));
    }

    #[test]
    fn test_from_config_pair() {
        let (registry, post_type, _) = registry();
        let descriptor = AssociationDescriptor::from_config(
            "posts",
            &json!(["Collection", {"model": "Post", "silent": true}]),
            &registry,
        )
        .unwrap();

        let resolved = descriptor.resolve("posts").unwrap();
        assert_eq!(resolved.collection_type.name(), "Collection");
        assert!(resolved.model_type.same_type(&post_type));
        assert!(resolved.silent);
    }

    #[test]
    fn test_from_config_rejects_malformed_declarations() {
        let (registry, _, _) = registry();
        for value in [
            json!(42),
            json!(["Posts"]),
            json!(["Posts", {}, {}]),
            json!([1, {}]),
            json!(["Posts", "silent"]),
            json!(["Posts", {"silent": "yes"}]),
            json!({"collection": "Posts"}),
            json!("Comments"),
            json!(["Posts", {"model": "Comment"}]),
        ] {
            let err = AssociationDescriptor::from_config("posts", &value, &registry).unwrap_err();
            assert!(
                matches!(err, AssociationError::UnresolvedDeclaration { .. }),
                "expected {} to be rejected",
                value
            );
        }
    }
}
