//! Primary Key System - Identity values read from a model's id attribute
//!
//! Supports integer, UUID, and free-form string identities. A model whose id
//! attribute is absent or null has no primary key and is considered new.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Primary key types supported by relational models
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryKey {
    /// Integer identity, as assigned by most backends
    Integer(i64),
    /// UUID identity
    Uuid(Uuid),
    /// Any other string identity
    String(String),
}

impl std::fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimaryKey::Integer(id) => write!(f, "{}", id),
            PrimaryKey::Uuid(id) => write!(f, "{}", id),
            PrimaryKey::String(id) => write!(f, "{}", id),
        }
    }
}

impl PrimaryKey {
    /// Read a primary key from an attribute value.
    ///
    /// Null, booleans, arrays, objects and non-integral numbers are not
    /// identities.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(PrimaryKey::Integer),
            Value::String(s) => Some(match Uuid::parse_str(s) {
                Ok(uuid) => PrimaryKey::Uuid(uuid),
                Err(_) => PrimaryKey::String(s.clone()),
            }),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            PrimaryKey::Integer(id) => Value::from(*id),
            PrimaryKey::Uuid(id) => Value::String(id.to_string()),
            PrimaryKey::String(id) => Value::String(id.clone()),
        }
    }

    /// Extract as i64 if this is an Integer primary key
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PrimaryKey::Integer(id) => Some(*id),
            _ => None,
        }
    }

    /// Extract as UUID if this is a UUID primary key
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            PrimaryKey::Uuid(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<i64> for PrimaryKey {
    fn from(id: i64) -> Self {
        PrimaryKey::Integer(id)
    }
}

impl From<Uuid> for PrimaryKey {
    fn from(id: Uuid) -> Self {
        PrimaryKey::Uuid(id)
    }
}
