//! Relational model configuration types and builders

use serde::{Deserialize, Serialize};
use service_builder::builder;

use crate::error::{ModelError, ModelResult};

/// Configuration shared by model types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[builder]
pub struct RelationalConfig {
    /// Name of the identity attribute for model types that don't set one
    #[builder(default = "\"id\".to_string()", getter)]
    pub id_attribute: String,

    /// Release the change binding of an association when it is reassigned
    #[builder(default = "true", getter)]
    pub unbind_replaced_associations: bool,
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            id_attribute: "id".to_string(),
            unbind_replaced_associations: true,
        }
    }
}

impl RelationalConfig {
    /// Load a configuration from JSON; missing keys keep their defaults
    pub fn from_json(value: &serde_json::Value) -> ModelResult<Self> {
        let config: Self = serde_json::from_value(value.clone())
            .map_err(|e| ModelError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.id_attribute.trim().is_empty() {
            return Err(ModelError::Configuration(
                "id_attribute must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl RelationalConfigBuilder {
    /// Keep listeners on replaced associations alive, matching the behavior
    /// of hosts that rely on garbage collection of the orphaned collection
    pub fn legacy() -> Self {
        RelationalConfigBuilder::new().unbind_replaced_associations(false)
    }
}
