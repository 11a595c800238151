//! Error types for the relational model system
//!
//! Provides error handling for attribute assignment, association
//! materialization, declaration resolution, and model synchronization.

use std::fmt;

use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for model operations
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Record not found in the sync backend
    NotFound(String),
    /// Identity attribute is missing where one is required
    MissingPrimaryKey,
    /// Association declaration or association data error
    Association(AssociationError),
    /// Serialization/deserialization error
    Serialization(String),
    /// Sync backend error
    Sync(String),
    /// Configuration error
    Configuration(String),
    /// Invalid attribute key or call shape
    InvalidKey(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::NotFound(what) => write!(f, "Record not found: {}", what),
            ModelError::MissingPrimaryKey => write!(f, "Primary key is missing or invalid"),
            ModelError::Association(err) => write!(f, "Association error: {}", err),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::Sync(msg) => write!(f, "Sync error: {}", msg),
            ModelError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ModelError::InvalidKey(msg) => write!(f, "Invalid key error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Association(err) => Some(err),
            _ => None,
        }
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<AssociationError> for ModelError {
    fn from(err: AssociationError) -> Self {
        ModelError::Association(err)
    }
}

/// Error types for has-many association handling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssociationError {
    /// The value assigned to an association is not an ordered sequence of
    /// field-sets or models
    #[error("malformed data for association '{association}': {reason}")]
    MalformedData { association: String, reason: String },

    /// The declaration for an association cannot be resolved to a collection
    /// type and a model type
    #[error("unresolved declaration for association '{association}': {reason}")]
    UnresolvedDeclaration { association: String, reason: String },
}

impl AssociationError {
    pub fn malformed(association: &str, reason: impl Into<String>) -> Self {
        Self::MalformedData {
            association: association.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unresolved(association: &str, reason: impl Into<String>) -> Self {
        Self::UnresolvedDeclaration {
            association: association.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the association the error refers to
    pub fn association(&self) -> &str {
        match self {
            Self::MalformedData { association, .. } => association,
            Self::UnresolvedDeclaration { association, .. } => association,
        }
    }
}
