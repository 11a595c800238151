//! Model System - observable records and their types
//!
//! - `entity`: the [`Model`] handle, base assignment and notifications
//! - `model_type`: [`ModelType`] definitions and their builder
//! - `attributes`: attribute values and maps
//! - `set_call`: assignment call shapes and options
//! - `primary_key`: identity values read from the id attribute
//! - `client_id`: per-instance identity

pub mod attributes;
pub mod client_id;
pub mod entity;
pub mod model_type;
pub mod primary_key;
pub mod set_call;

// Re-export main types for convenience
pub use attributes::{Attribute, Attributes};
pub use client_id::ClientId;
pub use entity::{Model, WeakModel};
pub use model_type::{ModelType, ModelTypeBuilder};
pub use primary_key::PrimaryKey;
pub use set_call::{ChangeSet, SetCall, SetOptions};
