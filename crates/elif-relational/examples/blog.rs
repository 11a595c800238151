//! Blog Usage Example
//!
//! Declares a Blog with many Posts, loads it from an in-memory store and
//! follows changes made through the posts collection.

use elif_relational::{
    Associations, Attributes, CollectionType, MemoryAdapter, ModelError, ModelEvent, ModelType,
    TypeRegistry,
};
use serde_json::json;

fn main() -> Result<(), ModelError> {
    tracing_subscriber::fmt()
        .with_env_filter("elif_relational=debug")
        .init();

    // Blog is declared before Post exists; its associations resolve by name
    let registry = TypeRegistry::new();
    let blog_type = ModelType::builder("Blog")
        .associations_from_config(json!({"posts": "Posts"}), registry.clone())
        .build();

    let post_type = ModelType::builder("Post").default_value("published", false).build();
    registry.register_model(post_type.clone());
    registry.register_collection(CollectionType::of("Posts", &post_type));

    let adapter = MemoryAdapter::new();
    adapter.insert(
        "Blog",
        json!({"id": 5, "name": "My Story", "posts": [{"title": "Hello world!"}]}),
    );

    let blog = blog_type.instantiate();
    blog.on(|event| {
        if let ModelEvent::FieldChanged { name } = event {
            println!("blog field changed: {}", name);
        } else if event.is_change() {
            println!("blog changed");
        }
    });

    blog.set(("id", 5_i64))?;
    blog.fetch(&adapter)?;

    let posts = blog
        .association("posts")
        .ok_or_else(|| ModelError::NotFound("posts".to_string()))?;
    println!("loaded {} post(s): {}", posts.len(), posts.to_json());

    // Renaming leaves the loaded posts in place
    blog.set(Attributes::new().with("name", "Renamed"))?;

    // Mutations of the collection show up as blog changes
    posts.add_attributes(Attributes::new().with("title", "Second post"))?;
    if let Some(first) = posts.first() {
        first.set(("published", true))?;
    }

    blog.save(&adapter)?;
    println!("stored: {}", blog.to_json());
    Ok(())
}
