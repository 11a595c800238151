//! Assignment intercept for model types that declare associations
//!
//! Runs between call-shape normalization and the base assignment routine:
//! every declared association present in the incoming attributes is
//! materialized into a collection, new models get empty collections for the
//! rest, and associations that are neither are left out so a stored
//! collection (or the absence of one) survives the assignment.

use crate::error::ModelResult;
use crate::model::{Attributes, ChangeSet, Model, SetOptions};

use super::declarations::AssociationSource;
use super::materializer::{materialize, Materialized};
use super::new_entity::{is_new_without_id, should_default};
use super::propagation::AssociationBinding;

pub(crate) fn assign(
    model: &Model,
    attrs: Attributes,
    options: SetOptions,
    source: &AssociationSource,
) -> ModelResult<ChangeSet> {
    let associations = source.resolve()?;
    for (name, descriptor) in associations.iter() {
        descriptor.resolve(name)?;
    }

    if options.unset {
        let released: Vec<(String, Option<AssociationBinding>)> = associations
            .names()
            .filter(|name| attrs.contains_key(name))
            .map(|name| (name.clone(), None))
            .collect();
        let (changes, replaced) = model.assign_with_bindings(attrs, &options, released);
        for binding in replaced {
            binding.unbind();
        }
        return Ok(changes);
    }

    let mut attrs = attrs;
    let new_without_id = is_new_without_id(model, &attrs);
    let mut bindings: Vec<(String, Option<AssociationBinding>)> = Vec::new();

    // Nothing is committed until every association has materialized
    for (name, descriptor) in associations.iter() {
        let items = if attrs.contains_key(name) {
            attrs.remove(name)
        } else if should_default(model, name, new_without_id) {
            None
        } else {
            continue;
        };

        let Materialized { collection, binding } = materialize(model, name, items, descriptor)?;
        attrs.insert(name.clone(), collection);
        bindings.push((name.clone(), binding));
    }

    // Bindings are swapped with the commit and before notification, so a
    // handler that assigns the same association again replaces these
    let (changes, replaced) = model.assign_with_bindings(attrs, &options, bindings);
    if *model.model_type().config().get_unbind_replaced_associations() {
        for binding in replaced {
            binding.unbind();
        }
    }

    Ok(changes)
}
