//! Attribute values and attribute maps
//!
//! A model stores plain JSON values next to live models and collections.
//! Raw association data arrives either as a JSON array of field-sets or as a
//! [`Attribute::List`] that may mix field-sets with already built models.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::collection::Collection;
use crate::error::{ModelError, ModelResult};
use crate::model::Model;

/// A single attribute value
#[derive(Debug, Clone)]
pub enum Attribute {
    /// Plain JSON data
    Value(Value),
    /// A model instance
    Model(Model),
    /// An ordered list of field-sets and/or models
    List(Vec<Attribute>),
    /// A live collection, typically a materialized association
    Collection(Collection),
}

impl Attribute {
    pub fn null() -> Self {
        Attribute::Value(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Attribute::Value(Value::Null))
    }

    /// Short name of the value's shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Attribute::Value(Value::Null) => "null",
            Attribute::Value(Value::Bool(_)) => "boolean",
            Attribute::Value(Value::Number(_)) => "number",
            Attribute::Value(Value::String(_)) => "string",
            Attribute::Value(Value::Array(_)) => "array",
            Attribute::Value(Value::Object(_)) => "object",
            Attribute::Model(_) => "model",
            Attribute::List(_) => "list",
            Attribute::Collection(_) => "collection",
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Attribute::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Attribute::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Attribute::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Serialize for a sync backend. Models and collections serialize to
    /// their attribute maps.
    pub fn to_json(&self) -> Value {
        match self {
            Attribute::Value(value) => value.clone(),
            Attribute::Model(model) => model.to_json(),
            Attribute::List(items) => Value::Array(items.iter().map(Attribute::to_json).collect()),
            Attribute::Collection(collection) => collection.to_json(),
        }
    }
}

// Models and collections compare by instance, data compares structurally
impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Attribute::Value(a), Attribute::Value(b)) => a == b,
            (Attribute::Model(a), Attribute::Model(b)) => a.same_instance(b),
            (Attribute::List(a), Attribute::List(b)) => a == b,
            (Attribute::Collection(a), Attribute::Collection(b)) => a.same_instance(b),
            _ => false,
        }
    }
}

impl From<Value> for Attribute {
    fn from(value: Value) -> Self {
        Attribute::Value(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::Value(Value::String(value))
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Attribute::Value(Value::from(value))
    }
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Attribute::Value(Value::Bool(value))
    }
}

impl From<Model> for Attribute {
    fn from(model: Model) -> Self {
        Attribute::Model(model)
    }
}

impl From<Vec<Model>> for Attribute {
    fn from(models: Vec<Model>) -> Self {
        Attribute::List(models.into_iter().map(Attribute::Model).collect())
    }
}

impl From<Vec<Attribute>> for Attribute {
    fn from(items: Vec<Attribute>) -> Self {
        Attribute::List(items)
    }
}

impl From<Collection> for Attribute {
    fn from(collection: Collection) -> Self {
        Attribute::Collection(collection)
    }
}

/// Ordered map of attribute name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build from a JSON object; any other JSON shape is rejected
    pub fn from_json(value: Value) -> ModelResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(ModelError::Serialization(format!(
                "expected an object of attributes, found {}",
                Attribute::Value(other).kind()
            ))),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Attribute>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Attribute>) -> Option<Attribute> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        self.0.remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// True when `name` is present and not null
    pub fn has(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|value| !value.is_null())
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fill in every key of `defaults` that is missing here
    pub fn merge_defaults(&mut self, defaults: &Attributes) {
        for (name, value) in defaults.iter() {
            self.0.entry(name.clone()).or_insert_with(|| value.clone());
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map.into_iter().map(|(k, v)| (k, Attribute::Value(v))).collect())
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<Attribute>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> Extend<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<Attribute>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.0.insert(k.into(), v.into());
        }
    }
}

impl IntoIterator for Attributes {
    type Item = (String, Attribute);
    type IntoIter = btree_map::IntoIter<String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Attribute);
    type IntoIter = btree_map::Iter<'a, String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
