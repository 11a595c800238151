//! Relationships Module - declarative has-many associations
//!
//! - `declarations`: per-type association tables, static or deferred
//! - `descriptor`: one association's collection type and options
//! - `registry`: named types for late-bound declarations
//! - `materializer`: raw association data to typed collections
//! - `propagation`: collection mutations re-emitted on the parent
//! - `new_entity`: defaulting of associations on new models
//! - `intercept`: the assignment path tying the above together

pub mod declarations;
pub mod descriptor;
pub(crate) mod intercept;
pub mod materializer;
pub mod new_entity;
pub mod propagation;
pub mod registry;

// Re-export main types
pub use declarations::{AssociationResolver, AssociationSource, Associations};
pub use descriptor::{AssociationDescriptor, AssociationOptions, ResolvedAssociation};
pub use materializer::{materialize, Materialized};
pub use new_entity::{is_new_without_id, should_default};
pub use propagation::{bind, AssociationBinding};
pub use registry::{global_registry, RegistryStats, TypeRegistry};
