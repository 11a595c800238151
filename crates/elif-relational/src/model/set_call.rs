//! Assignment call shapes
//!
//! Models accept three call shapes for assignment: a single field with a
//! value, a map of fields, or no fields at all (options only). [`SetCall`]
//! classifies a call once and [`SetCall::normalize`] turns it into the
//! canonical `(attributes, options)` pair both the base assignment and the
//! association intercept work with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::model::attributes::{Attribute, Attributes};

/// Options accepted by every assignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetOptions {
    /// Store without emitting `FieldChanged`/`Change`
    pub silent: bool,
    /// Remove the given attributes instead of storing them
    pub unset: bool,
}

impl SetOptions {
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    pub fn unset() -> Self {
        Self {
            unset: true,
            ..Self::default()
        }
    }

    /// Parse options passed as JSON; absent or null means defaults
    pub fn from_json(value: Option<Value>) -> ModelResult<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value @ Value::Object(_)) => Ok(serde_json::from_value(value)?),
            Some(other) => Err(ModelError::Serialization(format!(
                "expected an options object, found {}",
                Attribute::Value(other).kind()
            ))),
        }
    }
}

/// One assignment call, classified by shape
#[derive(Debug, Clone, PartialEq)]
pub enum SetCall {
    /// `(name, value, options)`
    Field {
        name: String,
        value: Attribute,
        options: SetOptions,
    },
    /// `(attributes, options)`
    Map {
        attrs: Attributes,
        options: SetOptions,
    },
    /// `(null, options)`: no fields, options only
    OptionsOnly { options: SetOptions },
}

impl SetCall {
    pub fn field(name: impl Into<String>, value: impl Into<Attribute>) -> Self {
        SetCall::Field {
            name: name.into(),
            value: value.into(),
            options: SetOptions::default(),
        }
    }

    pub fn map(attrs: Attributes) -> Self {
        SetCall::Map {
            attrs,
            options: SetOptions::default(),
        }
    }

    pub fn options_only(options: SetOptions) -> Self {
        SetCall::OptionsOnly { options }
    }

    /// Replace the options of this call
    pub fn with_options(self, options: SetOptions) -> Self {
        match self {
            SetCall::Field { name, value, .. } => SetCall::Field { name, value, options },
            SetCall::Map { attrs, .. } => SetCall::Map { attrs, options },
            SetCall::OptionsOnly { .. } => SetCall::OptionsOnly { options },
        }
    }

    /// Classify a dynamically shaped call.
    ///
    /// If `first` is an object or null it is the attribute map and `second`
    /// holds the options. Otherwise `first` is a field name, `second` its
    /// value and `third` the options.
    pub fn from_args(first: Value, second: Option<Value>, third: Option<Value>) -> ModelResult<Self> {
        match first {
            Value::Null => Ok(SetCall::OptionsOnly {
                options: SetOptions::from_json(second)?,
            }),
            value @ Value::Object(_) => Ok(SetCall::Map {
                attrs: Attributes::from_json(value)?,
                options: SetOptions::from_json(second)?,
            }),
            Value::String(name) => Ok(SetCall::Field {
                name,
                value: Attribute::Value(second.unwrap_or(Value::Null)),
                options: SetOptions::from_json(third)?,
            }),
            Value::Number(n) => Ok(SetCall::Field {
                name: n.to_string(),
                value: Attribute::Value(second.unwrap_or(Value::Null)),
                options: SetOptions::from_json(third)?,
            }),
            other => Err(ModelError::InvalidKey(format!(
                "cannot use {} as an attribute name or map",
                Attribute::Value(other).kind()
            ))),
        }
    }

    pub fn normalize(self) -> (Attributes, SetOptions) {
        match self {
            SetCall::Field { name, value, options } => {
                let mut attrs = Attributes::new();
                attrs.insert(name, value);
                (attrs, options)
            }
            SetCall::Map { attrs, options } => (attrs, options),
            SetCall::OptionsOnly { options } => (Attributes::new(), options),
        }
    }
}

impl From<Attributes> for SetCall {
    fn from(attrs: Attributes) -> Self {
        SetCall::map(attrs)
    }
}

impl From<(Attributes, SetOptions)> for SetCall {
    fn from((attrs, options): (Attributes, SetOptions)) -> Self {
        SetCall::Map { attrs, options }
    }
}

impl From<Option<Attributes>> for SetCall {
    fn from(attrs: Option<Attributes>) -> Self {
        match attrs {
            Some(attrs) => SetCall::map(attrs),
            None => SetCall::options_only(SetOptions::default()),
        }
    }
}

impl From<SetOptions> for SetCall {
    fn from(options: SetOptions) -> Self {
        SetCall::options_only(options)
    }
}

impl<V: Into<Attribute>> From<(&str, V)> for SetCall {
    fn from((name, value): (&str, V)) -> Self {
        SetCall::field(name, value)
    }
}

impl<V: Into<Attribute>> From<(&str, V, SetOptions)> for SetCall {
    fn from((name, value, options): (&str, V, SetOptions)) -> Self {
        SetCall::field(name, value).with_options(options)
    }
}

/// Names of the attributes an assignment actually changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changed: Vec<String>,
}

impl ChangeSet {
    pub fn new(changed: Vec<String>) -> Self {
        Self { changed }
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changed.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.changed.iter().any(|changed| changed == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.changed.iter()
    }

    pub fn into_names(self) -> Vec<String> {
        self.changed
    }
}
