//! Association materialization - raw association data to a typed collection

use serde_json::Value;

use crate::collection::Collection;
use crate::error::{AssociationError, ModelResult};
use crate::model::{Attribute, Model, ModelType};

use super::descriptor::AssociationDescriptor;
use super::propagation::{bind, AssociationBinding};

/// A freshly built association collection and, unless the association is
/// silent, its binding to the parent
#[derive(Debug)]
pub struct Materialized {
    pub collection: Collection,
    pub binding: Option<AssociationBinding>,
}

/// Build the collection for association `name` of `parent` from `items`.
///
/// Absent or null `items` produce an empty collection. Members that are
/// already instances of the resolved model type are kept as-is; JSON
/// field-sets are constructed through the model type's own assignment.
pub fn materialize(
    parent: &Model,
    name: &str,
    items: Option<Attribute>,
    descriptor: &AssociationDescriptor,
) -> ModelResult<Materialized> {
    let resolved = descriptor.resolve(name)?;
    let models = match items {
        Some(items) => build_members(name, items, &resolved.model_type)?,
        None => Vec::new(),
    };

    let collection = Collection::with_model_type(
        &resolved.collection_type,
        Some(resolved.model_type.clone()),
        models,
    );
    let binding = if resolved.silent {
        None
    } else {
        Some(bind(&collection, parent))
    };

    tracing::debug!(
        association = name,
        collection = resolved.collection_type.name(),
        model = resolved.model_type.name(),
        members = collection.len(),
        silent = resolved.silent,
        "association materialized"
    );

    Ok(Materialized { collection, binding })
}

fn build_members(name: &str, items: Attribute, model_type: &ModelType) -> ModelResult<Vec<Model>> {
    match items {
        Attribute::Value(Value::Null) => Ok(Vec::new()),
        Attribute::Value(Value::Array(values)) => values
            .into_iter()
            .enumerate()
            .map(|(index, value)| build_from_value(name, index, value, model_type))
            .collect(),
        Attribute::List(elements) => elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| match element {
                Attribute::Model(model) => adopt(model, model_type),
                Attribute::Value(value) => build_from_value(name, index, value, model_type),
                other => Err(AssociationError::malformed(
                    name,
                    format!("element {} is a {}, expected a field-set or model", index, other.kind()),
                )
                .into()),
            })
            .collect(),
        Attribute::Collection(collection) => collection
            .models()
            .into_iter()
            .map(|model| adopt(model, model_type))
            .collect(),
        other => Err(AssociationError::malformed(
            name,
            format!("expected an ordered sequence, found {}", other.kind()),
        )
        .into()),
    }
}

fn build_from_value(name: &str, index: usize, value: Value, model_type: &ModelType) -> ModelResult<Model> {
    match value {
        Value::Object(_) => model_type.create_from_json(value),
        other => Err(AssociationError::malformed(
            name,
            format!(
                "element {} is a {}, expected a field-set or model",
                index,
                Attribute::Value(other).kind()
            ),
        )
        .into()),
    }
}

fn adopt(model: Model, model_type: &ModelType) -> ModelResult<Model> {
    if model.is_instance_of(model_type) {
        return Ok(model);
    }

    tracing::warn!(
        from = model.model_type().name(),
        to = model_type.name(),
        "rebuilding association member as the declared model type"
    );
    model_type.create(model.attributes())
}
