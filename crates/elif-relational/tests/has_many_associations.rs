use elif_relational::{
    AssociationOptions, Associations, Attribute, Attributes, CollectionType, MemoryAdapter, Model,
    ModelError, ModelEvent, ModelResult, ModelType, PrimaryKey, SetCall, SyncAdapter, TypeRegistry,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("elif_relational=debug")
        .with_test_writer()
        .try_init();
}

/// Blog declares `posts: Posts`, and Posts' default model is Post
struct BlogSchema {
    blog: ModelType,
    post: ModelType,
    posts: CollectionType,
}

fn blog_schema() -> BlogSchema {
    init_tracing();
    let post = ModelType::builder("Post").default_value("published", false).build();
    let posts = CollectionType::of("Posts", &post);
    let blog = ModelType::builder("Blog")
        .associations(Associations::new().has_many("posts", posts.clone()))
        .build();
    BlogSchema { blog, post, posts }
}

fn attrs(value: Value) -> Attributes {
    Attributes::from_json(value).unwrap()
}

fn count_changes(model: &Model) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    model.on(move |event| {
        if event.is_change() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    count
}

#[test]
fn test_new_blog_with_posts() {
    let schema = blog_schema();
    let blog = schema.blog.instantiate();

    blog.set(attrs(json!({"name": "My Story", "posts": [{"title": "Hello world!"}]})))
        .unwrap();

    let posts = blog.association("posts").unwrap();
    assert!(posts.collection_type().same_type(&schema.posts));
    assert_eq!(posts.len(), 1);

    let post = posts.first().unwrap();
    assert!(post.is_instance_of(&schema.post));
    assert_eq!(post.get("title"), Some(Attribute::from("Hello world!")));
}

#[test]
fn test_renamed_existing_blog_keeps_posts_instance() {
    let schema = blog_schema();
    let blog = schema
        .blog
        .create(attrs(json!({"id": 5, "name": "My Story", "posts": [{"title": "Hello world!"}]})))
        .unwrap();
    let loaded = blog.association("posts").unwrap();

    blog.set(attrs(json!({"name": "Renamed"}))).unwrap();

    assert_eq!(blog.get("name"), Some(Attribute::from("Renamed")));
    assert!(blog.association("posts").unwrap().same_instance(&loaded));
    assert_eq!(loaded.len(), 1);
}

#[test]
fn test_members_match_directly_constructed_models() {
    let schema = blog_schema();
    let raw = json!([
        {"title": "First", "tags": ["a", "b"]},
        {"title": "Second", "published": true},
        {}
    ]);

    let blog = schema.blog.create(attrs(json!({"posts": raw.clone()}))).unwrap();
    let members = blog.association("posts").unwrap().models();

    assert_eq!(members.len(), 3);
    for (member, field_set) in members.iter().zip(raw.as_array().unwrap()) {
        let direct = schema.post.create_from_json(field_set.clone()).unwrap();
        assert_eq!(member.to_json(), direct.to_json());
    }
}

#[test]
fn test_existing_instances_pass_through_unchanged() {
    let schema = blog_schema();
    let first = schema.post.create(attrs(json!({"title": "a"}))).unwrap();
    let second = schema.post.create(attrs(json!({"title": "b"}))).unwrap();

    let blog = schema.blog.instantiate();
    blog.set(("posts", vec![first.clone(), second.clone()])).unwrap();

    let members = blog.association("posts").unwrap().models();
    assert!(members[0].same_instance(&first));
    assert!(members[1].same_instance(&second));
}

#[test]
fn test_new_blog_defaults_to_empty_posts() {
    let schema = blog_schema();
    let blog = schema.blog.create(attrs(json!({"name": "Empty"}))).unwrap();

    let posts = blog.association("posts").unwrap();
    assert_eq!(posts.len(), 0);
}

#[test]
fn test_existing_blog_without_posts_stays_unloaded() {
    let schema = blog_schema();
    let blog = schema.blog.create(attrs(json!({"id": 5, "name": "Unloaded"}))).unwrap();

    assert!(blog.get("posts").is_none());
    blog.set(("name", "Still unloaded")).unwrap();
    assert!(blog.get("posts").is_none());
    assert!(blog.to_json().get("posts").is_none());
}

#[test]
fn test_explicit_empty_list_is_materialized_for_existing_blog() {
    let schema = blog_schema();
    let blog = schema.blog.create(attrs(json!({"id": 5}))).unwrap();

    blog.set(attrs(json!({"posts": []}))).unwrap();
    assert!(blog.association("posts").is_some_and(|posts| posts.is_empty()));
}

#[test]
fn test_each_collection_event_fires_one_parent_change() {
    let schema = blog_schema();
    let blog = schema.blog.create(attrs(json!({"name": "Watched"}))).unwrap();
    let posts = blog.association("posts").unwrap();
    let changes = count_changes(&blog);

    let post = schema.post.instantiate();
    posts.add(post.clone());
    assert_eq!(changes.load(Ordering::SeqCst), 1);

    post.set(("title", "Edited")).unwrap();
    assert_eq!(changes.load(Ordering::SeqCst), 2);

    posts.remove(&post);
    assert_eq!(changes.load(Ordering::SeqCst), 3);

    posts.reset(vec![schema.post.instantiate(), schema.post.instantiate()]);
    assert_eq!(changes.load(Ordering::SeqCst), 4);
}

#[test]
fn test_silent_association_produces_no_parent_changes() {
    let schema = blog_schema();
    let blog_type = ModelType::builder("QuietBlog")
        .associations(
            Associations::new().has_many("posts", (schema.posts.clone(), AssociationOptions::new().silent(true))),
        )
        .build();
    let blog = blog_type.create(attrs(json!({"posts": [{"title": "a"}]}))).unwrap();
    let posts = blog.association("posts").unwrap();
    let changes = count_changes(&blog);

    for _ in 0..5 {
        let post = schema.post.instantiate();
        posts.add(post.clone());
        post.set(("title", "edited")).unwrap();
        posts.remove(&post);
    }
    posts.reset(Vec::new());

    assert_eq!(changes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_replaced_association_stops_notifying() {
    let schema = blog_schema();
    let blog = schema.blog.create(attrs(json!({"id": 1, "posts": [{"title": "old"}]}))).unwrap();
    let old = blog.association("posts").unwrap();

    blog.set(attrs(json!({"posts": [{"title": "new"}]}))).unwrap();
    let changes = count_changes(&blog);

    old.add(schema.post.instantiate());
    assert_eq!(changes.load(Ordering::SeqCst), 0);

    blog.association("posts").unwrap().add(schema.post.instantiate());
    assert_eq!(changes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_repeated_reloads_do_not_accumulate_listeners() {
    let schema = blog_schema();
    let blog = schema.blog.create(attrs(json!({"id": 1}))).unwrap();

    let mut previous = Vec::new();
    for round in 0..10 {
        blog.set(attrs(json!({"posts": [{"title": format!("round {}", round)}]}))).unwrap();
        previous.push(blog.association("posts").unwrap());
    }

    let current = previous.pop().unwrap();
    assert_eq!(current.observer_count(), 1);
    assert!(previous.iter().all(|posts| posts.observer_count() == 0));
}

#[test]
fn test_parents_never_cross_trigger() {
    let schema = blog_schema();
    let a = schema.blog.create(attrs(json!({"name": "a"}))).unwrap();
    let b = schema.blog.create(attrs(json!({"name": "b"}))).unwrap();
    let a_changes = count_changes(&a);
    let b_changes = count_changes(&b);

    a.association("posts").unwrap().add(schema.post.instantiate());

    assert_eq!(a_changes.load(Ordering::SeqCst), 1);
    assert_eq!(b_changes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_malformed_posts_fail_before_commit() {
    let schema = blog_schema();
    let blog = schema.blog.create(attrs(json!({"id": 1, "name": "Before"}))).unwrap();

    for bad in [json!("posts"), json!(42), json!({"title": "x"}), json!([1, 2])] {
        let err = blog
            .set(attrs(json!({"name": "After", "posts": bad})))
            .unwrap_err();
        assert!(matches!(err, ModelError::Association(_)));
    }

    assert_eq!(blog.get("name"), Some(Attribute::from("Before")));
    assert!(blog.get("posts").is_none());
}

#[test]
fn test_dynamic_call_shapes() {
    let schema = blog_schema();
    let blog = schema.blog.instantiate();

    blog.set(SetCall::from_args(json!("name"), Some(json!("Field form")), None).unwrap())
        .unwrap();
    assert_eq!(blog.get("name"), Some(Attribute::from("Field form")));
    assert!(blog.association("posts").is_some());

    blog.set(SetCall::from_args(json!({"posts": [{"title": "Map form"}]}), Some(json!({"silent": true})), None).unwrap())
        .unwrap();
    assert_eq!(blog.association("posts").unwrap().len(), 1);

    blog.set(SetCall::from_args(Value::Null, Some(json!({"silent": true})), None).unwrap())
        .unwrap();

    let err = SetCall::from_args(json!(true), None, None).unwrap_err();
    assert!(matches!(err, ModelError::InvalidKey(_)));
}

#[test]
fn test_deferred_declarations_resolve_forward_references() {
    init_tracing();
    let registry = TypeRegistry::new();
    let lookup = registry.clone();
    let blog_type = ModelType::builder("Blog")
        .deferred_associations(move || {
            let posts = lookup.resolve_collection("posts", "Posts")?;
            Ok(Associations::new().has_many("posts", posts))
        })
        .build();

    let blog = blog_type.instantiate();
    assert!(matches!(
        blog.set(("name", "Too early")),
        Err(ModelError::Association(_))
    ));

    // Post and Posts are defined after Blog
    let post_type = ModelType::new("Post");
    registry.register_model(post_type.clone());
    registry.register_collection(CollectionType::of("Posts", &post_type));

    blog.set(attrs(json!({"posts": [{"title": "Late bound"}]}))).unwrap();
    assert!(blog
        .association("posts")
        .and_then(|posts| posts.first())
        .is_some_and(|post| post.is_instance_of(&post_type)));
}

#[test]
fn test_config_declarations() {
    init_tracing();
    let registry = TypeRegistry::new();
    let blog_type = ModelType::builder("Blog")
        .associations_from_config(
            json!({
                "posts": "Posts",
                "drafts": ["Collection", {"model": "Post", "silent": true}]
            }),
            registry.clone(),
        )
        .build();
    let post_type = ModelType::new("Post");
    registry.register_model(post_type.clone());
    registry.register_collection(CollectionType::of("Posts", &post_type));
    registry.register_collection(CollectionType::new("Collection"));

    let blog = blog_type.create(attrs(json!({"drafts": [{"title": "wip"}]}))).unwrap();

    let drafts = blog.association("drafts").unwrap();
    assert_eq!(drafts.collection_type().name(), "Collection");
    assert!(drafts.first().is_some_and(|draft| draft.is_instance_of(&post_type)));
    assert!(!blog.is_association_bound("drafts"));
    assert!(blog.association("posts").is_some_and(|posts| posts.is_empty()));
    assert!(blog.is_association_bound("posts"));
}

#[test]
fn test_config_declarations_reject_malformed_shapes() {
    init_tracing();
    let registry = TypeRegistry::new();
    registry.register_collection(CollectionType::of("Posts", &ModelType::new("Post")));
    let blog_type = ModelType::builder("Blog")
        .associations_from_config(json!({"posts": ["Posts"]}), registry)
        .build();

    let err = blog_type.create(Attributes::new()).unwrap_err();
    assert!(matches!(err, ModelError::Association(_)));
    assert!(err.to_string().contains("posts"));
}

#[test]
fn test_nested_associations_materialize_and_bubble() {
    init_tracing();
    let comment = ModelType::new("Comment");
    let comments = CollectionType::of("Comments", &comment);
    let post = ModelType::builder("Post")
        .associations(Associations::new().has_many("comments", comments))
        .build();
    let posts = CollectionType::of("Posts", &post);
    let blog_type = ModelType::builder("Blog")
        .associations(Associations::new().has_many("posts", posts))
        .build();

    let blog = blog_type
        .create(attrs(json!({"posts": [{"title": "p", "comments": [{"body": "c"}]}]})))
        .unwrap();
    let first_post = blog.association("posts").unwrap().first().unwrap();
    let post_comments = first_post.association("comments").unwrap();
    assert!(post_comments.first().is_some_and(|c| c.is_instance_of(&comment)));

    let changes = count_changes(&blog);
    post_comments.add(comment.instantiate());
    assert_eq!(changes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_save_omits_unloaded_posts_and_fetch_leaves_them_untouched() {
    let schema = blog_schema();
    let adapter = MemoryAdapter::new();
    adapter.insert("Blog", json!({"id": 5, "name": "Stored", "posts": [{"title": "server"}]}));

    let blog = schema.blog.create(attrs(json!({"id": 5, "name": "Local"}))).unwrap();
    blog.save(&adapter).unwrap();

    let stored = adapter.get("Blog", &PrimaryKey::Integer(5)).unwrap();
    assert_eq!(stored["name"], json!("Local"));
    assert_eq!(stored["posts"], json!([{"title": "server"}]));
    assert_eq!(blog.association("posts").map(|posts| posts.len()), Some(1));

    // A partial record without posts leaves the loaded collection alone
    let loaded = blog.association("posts").unwrap();
    adapter.insert("Blog", json!({"id": 5, "name": "Partial"}));
    blog.fetch(&adapter).unwrap();

    assert_eq!(blog.get("name"), Some(Attribute::from("Partial")));
    assert!(blog.association("posts").unwrap().same_instance(&loaded));
}

#[test]
fn test_save_new_blog_round_trips_posts() {
    let schema = blog_schema();
    let adapter = MemoryAdapter::new();
    let blog = schema
        .blog
        .create(attrs(json!({"name": "Fresh", "posts": [{"title": "one"}]})))
        .unwrap();

    let changes = blog.save(&adapter).unwrap();
    assert!(changes.contains("id"));
    assert!(!blog.is_new());

    let copy = schema.blog.instantiate();
    copy.set(("id", 1_i64)).unwrap();
    copy.fetch(&adapter).unwrap();

    let posts = copy.association("posts").unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts.first().and_then(|p| p.get("published")), Some(Attribute::from(false)));
}

struct FailingAdapter;

impl SyncAdapter for FailingAdapter {
    fn read(&self, _model_type: &str, _id: &PrimaryKey) -> ModelResult<Value> {
        Err(ModelError::Sync("backend unavailable".to_string()))
    }

    fn create(&self, _model_type: &str, _payload: Value) -> ModelResult<Value> {
        Err(ModelError::Sync("backend unavailable".to_string()))
    }

    fn update(&self, _model_type: &str, _id: &PrimaryKey, _payload: Value) -> ModelResult<Value> {
        Err(ModelError::Sync("backend unavailable".to_string()))
    }

    fn delete(&self, _model_type: &str, _id: &PrimaryKey) -> ModelResult<()> {
        Err(ModelError::Sync("backend unavailable".to_string()))
    }
}

#[test]
fn test_sync_errors_propagate_without_synced_event() {
    let schema = blog_schema();
    let blog = schema.blog.create(attrs(json!({"id": 3, "name": "Offline"}))).unwrap();
    let synced = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&synced);
    blog.on(move |event| {
        if matches!(event, ModelEvent::Synced) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    assert!(matches!(blog.fetch(&FailingAdapter), Err(ModelError::Sync(_))));
    assert!(matches!(blog.save(&FailingAdapter), Err(ModelError::Sync(_))));
    assert!(matches!(blog.destroy(&FailingAdapter), Err(ModelError::Sync(_))));
    assert_eq!(synced.load(Ordering::SeqCst), 0);
    assert_eq!(blog.get("name"), Some(Attribute::from("Offline")));
}
