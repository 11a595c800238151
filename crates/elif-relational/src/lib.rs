//! # elif-relational: has-many associations for observable models
//!
//! Observable models and collections with declarative one-to-many
//! associations. Assigning raw association data to a model that declares
//! it (a list of field-sets, existing models, or a live collection)
//! builds a typed collection of child models, and later mutations of that
//! collection are reported as changes of the parent.
//!
//! ```
//! use elif_relational::{Associations, Attributes, CollectionType, ModelType};
//! use serde_json::json;
//!
//! let post = ModelType::new("Post");
//! let posts = CollectionType::of("Posts", &post);
//! let blog = ModelType::builder("Blog")
//!     .associations(Associations::new().has_many("posts", posts))
//!     .build();
//!
//! let story = blog
//!     .create(Attributes::from_json(json!({"name": "My Story", "posts": [{"title": "Hello world!"}]})).unwrap())
//!     .unwrap();
//! assert_eq!(story.association("posts").unwrap().len(), 1);
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod observers;
pub mod relationships;
pub mod sync;

// Re-export core traits and types
pub use collection::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use model::*;
pub use observers::*;
pub use relationships::*;
pub use sync::*;
