use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

use snapfeed_store::{ConstraintKind, Database, FixedClock};
use snapfeed_types::{
    Entity, NewComment, NewFollow, NewLike, NewPost, NewUser, ProfileUpdate,
};

fn fresh_db() -> Result<Database> {
    let db = Database::in_memory()?;
    db.initialize()?;
    Ok(db)
}

fn strip_generated(mut map: Map<String, Value>) -> Map<String, Value> {
    map.remove("id");
    map.remove("created_at");
    map
}

fn assert_iso8601(value: &Value) {
    let s = value.as_str().expect("created_at should be a string");
    DateTime::parse_from_rfc3339(s).expect("created_at should be RFC 3339");
}

/// User{a@x.com} -> id 1, Post{user 1, http://i/1.png} -> id 1 with null
/// caption and location
#[test]
fn test_first_user_and_post_scenario() -> Result<()> {
    let db = fresh_db()?;

    let user = db.users().create(&NewUser {
        email: "a@x.com".to_string(),
        username: "a".to_string(),
        password: "h".to_string(),
        is_active: true,
        full_name: None,
        bio: None,
        profile_image: None,
    })?;
    assert_eq!(user.id, 1);

    let post = db.posts().create(&NewPost::new(1, "http://i/1.png"))?;
    assert_eq!(post.id, 1);

    let projection = post.to_transport();
    assert_iso8601(&projection["created_at"]);
    assert_eq!(
        Value::Object(strip_generated(projection.clone())),
        json!({
            "user_id": 1,
            "image_url": "http://i/1.png",
            "caption": null,
            "location": null,
        })
    );
    assert_eq!(projection["id"], json!(1));

    Ok(())
}

#[test]
fn test_every_entity_gets_id_and_timestamp() -> Result<()> {
    let db = fresh_db()?;
    let alice = db.users().create(&NewUser::new("alice@x.com", "alice", "h"))?;
    let bob = db.users().create(&NewUser::new("bob@x.com", "bob", "h"))?;
    let post = db.posts().create(&NewPost::new(alice.id, "http://i/1.png"))?;
    let comment = db.comments().create(&NewComment {
        post_id: post.id,
        user_id: bob.id,
        content: "Those colours!".to_string(),
    })?;
    let like = db.likes().create(&NewLike { user_id: bob.id, post_id: post.id })?;
    let follow = db.follows().create(&NewFollow { follower_id: bob.id, followed_id: alice.id })?;

    let projections = vec![
        alice.to_transport(),
        post.to_transport(),
        comment.to_transport(),
        like.to_transport(),
        follow.to_transport(),
    ];
    for projection in projections {
        assert!(projection["id"].as_i64().unwrap() > 0);
        assert_iso8601(&projection["created_at"]);
    }

    Ok(())
}

#[test]
fn test_user_projection_field_set() -> Result<()> {
    let db = fresh_db()?;
    let user = db.users().create(&NewUser {
        full_name: Some("Alice Liddell".to_string()),
        bio: Some("rooftops".to_string()),
        profile_image: Some("http://i/a.png".to_string()),
        ..NewUser::new("alice@x.com", "alice", "secret")
    })?;

    let projection = user.to_transport();
    let mut keys: Vec<&str> = projection.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["bio", "created_at", "email", "full_name", "id", "profile_image", "username"]
    );
    assert!(!serde_json::to_string(&user)?.contains("secret"));

    Ok(())
}

#[test]
fn test_dangling_foreign_keys_rejected() -> Result<()> {
    let db = fresh_db()?;
    let user = db.users().create(&NewUser::new("a@x.com", "a", "h"))?;
    let post = db.posts().create(&NewPost::new(user.id, "http://i/1.png"))?;

    let errors = vec![
        db.posts().create(&NewPost::new(99, "http://i/2.png")).unwrap_err(),
        db.comments()
            .create(&NewComment { post_id: 99, user_id: user.id, content: "x".to_string() })
            .unwrap_err(),
        db.likes().create(&NewLike { user_id: 99, post_id: post.id }).unwrap_err(),
        db.follows()
            .create(&NewFollow { follower_id: user.id, followed_id: 99 })
            .unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey), "{}", err);
    }

    let counts = db.table_counts()?;
    assert_eq!(
        counts,
        vec![("users", 1), ("posts", 1), ("comments", 0), ("likes", 0), ("follows", 0)]
    );
    Ok(())
}

#[test]
fn test_self_follow_is_rejected() -> Result<()> {
    let db = fresh_db()?;
    let user = db.users().create(&NewUser::new("a@x.com", "a", "h"))?;

    let err = db
        .follows()
        .create(&NewFollow { follower_id: user.id, followed_id: user.id })
        .unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));
    assert_eq!(db.follows().follower_count(user.id)?, 0);
    Ok(())
}

#[test]
fn test_round_trip_through_projection() -> Result<()> {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()));
    let db = Database::in_memory_with_clock(clock.clone())?;
    db.initialize()?;

    let alice = db.users().create(&NewUser::new("alice@x.com", "alice", "h"))?;
    let bob = db.users().create(&NewUser::new("bob@x.com", "bob", "h"))?;

    // Posts and comments have no uniqueness beyond their id
    let post = db.posts().create(&NewPost {
        caption: Some("sunset".to_string()),
        ..NewPost::new(alice.id, "http://i/1.png")
    })?;
    clock.advance(Duration::minutes(5));
    let reinserted: NewPost = serde_json::from_value(Value::Object(post.to_transport()))?;
    let copy = db.posts().create(&reinserted)?;
    assert_ne!(copy.id, post.id);
    assert_eq!(strip_generated(copy.to_transport()), strip_generated(post.to_transport()));

    let comment = db.comments().create(&NewComment {
        post_id: post.id,
        user_id: bob.id,
        content: "wow".to_string(),
    })?;
    let reinserted: NewComment = serde_json::from_value(Value::Object(comment.to_transport()))?;
    let copy = db.comments().create(&reinserted)?;
    assert_ne!(copy.id, comment.id);
    assert_eq!(strip_generated(copy.to_transport()), strip_generated(comment.to_transport()));

    // Edges are unique per pair, so the original has to go first
    let follow = db.follows().create(&NewFollow { follower_id: bob.id, followed_id: alice.id })?;
    let reinserted: NewFollow = serde_json::from_value(Value::Object(follow.to_transport()))?;
    db.follows().delete(follow.id)?;
    let copy = db.follows().create(&reinserted)?;
    assert!(copy.id > follow.id);
    assert_eq!(strip_generated(copy.to_transport()), strip_generated(follow.to_transport()));

    let like = db.likes().create(&NewLike { user_id: bob.id, post_id: post.id })?;
    let reinserted: NewLike = serde_json::from_value(Value::Object(like.to_transport()))?;
    db.likes().unlike(bob.id, post.id)?;
    let copy = db.likes().create(&reinserted)?;
    assert!(copy.id > like.id);
    assert_eq!(strip_generated(copy.to_transport()), strip_generated(like.to_transport()));

    Ok(())
}

#[test]
fn test_relationship_traversal_over_demo_data() -> Result<()> {
    let db = fresh_db()?;
    db.seed_demo_data()?;

    let alice = db.users().get_by_username("alice")?.expect("alice is seeded");
    let posts = db.posts().list_by_user(alice.id)?;
    assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);

    let comments = db.comments().list_by_post(1)?;
    assert_eq!(comments.len(), 2);
    assert!(comments.windows(2).all(|w| w[0].id < w[1].id));

    assert_eq!(db.likes().count_for_post(1)?, 2);
    assert_eq!(db.follows().follower_count(alice.id)?, 2);
    assert_eq!(
        db.follows()
            .following(alice.id)?
            .iter()
            .map(|f| f.followed_id)
            .collect::<Vec<_>>(),
        vec![2]
    );

    let charlie = db.users().get_by_email("charlie@snapfeed.dev")?.expect("charlie is seeded");
    assert!(!charlie.is_active);
    assert_eq!(charlie.full_name, None);

    // Seeded users are referenced, so restrict-on-delete applies
    let err = db.users().delete(alice.id).unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));

    Ok(())
}

#[test]
fn test_profile_update_does_not_touch_generated_fields() -> Result<()> {
    let db = fresh_db()?;
    let user = db.users().create(&NewUser::new("a@x.com", "a", "h"))?;
    let updated = db.users().update_profile(
        user.id,
        &ProfileUpdate {
            bio: Some("new bio".to_string()),
            ..ProfileUpdate::default()
        },
    )?;
    assert_eq!(updated.id, user.id);
    assert_eq!(updated.created_at, user.created_at);
    assert_eq!(updated.bio, "new bio");
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // For any valid user input, the stored user's projection never carries
    // the credential or the active flag
    #[test]
    fn prop_user_projection_never_exposes_credentials(
        local in "[a-z0-9]{1,20}",
        username in "[a-zA-Z0-9_]{1,40}",
        password in "[ -~]{1,64}",
        is_active in any::<bool>(),
    ) {
        let db = fresh_db().unwrap();
        let user = db.users().create(&NewUser {
            is_active,
            ..NewUser::new(format!("{}@example.com", local), username, password)
        }).unwrap();

        let projection = user.to_transport();
        prop_assert!(!projection.contains_key("password"));
        prop_assert!(!projection.contains_key("is_active"));
        prop_assert!(projection["id"].as_i64().unwrap() > 0);
    }

    // Ids are positive and strictly increasing in creation order
    #[test]
    fn prop_post_ids_increase(count in 1usize..12) {
        let db = fresh_db().unwrap();
        let user = db.users().create(&NewUser::new("a@x.com", "a", "h")).unwrap();

        let mut last = 0;
        for n in 0..count {
            let post = db.posts().create(&NewPost::new(user.id, format!("http://i/{}.png", n))).unwrap();
            prop_assert!(post.id > last);
            last = post.id;
        }
        prop_assert_eq!(db.posts().count_by_user(user.id).unwrap(), count as i64);
    }
}
