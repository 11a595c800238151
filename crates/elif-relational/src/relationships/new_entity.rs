//! New-entity detection for association defaulting

use crate::model::{Attributes, Model};

/// True when `model` has no primary key and `attrs` does not supply a
/// non-null identity value
pub fn is_new_without_id(model: &Model, attrs: &Attributes) -> bool {
    model.is_new() && !attrs.has(model.id_attribute())
}

/// Whether association `name`, absent from the incoming attributes, should
/// default to an empty collection
pub fn should_default(model: &Model, name: &str, new_without_id: bool) -> bool {
    new_without_id && !model.has(name)
}
