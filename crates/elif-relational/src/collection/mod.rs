//! Collections - ordered, observable sets of models
//!
//! - `collection_type`: named collection definitions and their member type
//! - `instance`: the live [`Collection`] with add/remove/change/reset events

pub mod collection_type;
pub mod instance;

pub use collection_type::CollectionType;
pub use instance::{Collection, WeakCollection};
