//! PostgreSQL adapter tests
//!
//! These need a reachable database. Run with:
//! DATABASE_URL=postgres://... cargo test -p quill-core -- --ignored

use quill_core::{
    BlogFilter, BlogPatch, BlogQuery, BlogState, BlogStore, Constraint, NewBlog, NewUser,
    Pagination, Patch, PgStore, Sort, SortDirection, SortField, StoreError, UserStore,
};
use uuid::Uuid;

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgStore::connect(&url, 2).await.expect("connect")
}

async fn user(store: &PgStore) -> Uuid {
    store
        .insert_user(NewUser {
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: "$argon2id$stub".to_string(),
            first_name: "Pg".to_string(),
            last_name: "Tester".to_string(),
        })
        .await
        .unwrap()
        .id
}

fn blog(author: Uuid, body: &str) -> NewBlog {
    NewBlog {
        title: format!("pg-{}", Uuid::new_v4()),
        description: "desc".to_string(),
        body: body.to_string(),
        tags: vec!["pg".to_string(), "rust".to_string()],
        author,
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_unique_constraints_are_classified() {
    let store = store().await;
    let author = user(&store).await;

    let existing = store.find_user_by_id(author).await.unwrap().unwrap();
    let duplicate = store
        .insert_user(NewUser {
            email: existing.email.clone(),
            password_hash: "$argon2id$stub".to_string(),
            first_name: "Again".to_string(),
            last_name: "Again".to_string(),
        })
        .await;
    assert!(matches!(
        duplicate,
        Err(StoreError::UniqueViolation(Constraint::UserEmail))
    ));

    let first = store.insert_blog(blog(author, "body")).await.unwrap();
    let mut again = blog(author, "body");
    again.title = first.title.clone();
    assert!(matches!(
        store.insert_blog(again).await,
        Err(StoreError::UniqueViolation(Constraint::BlogTitle))
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_read_count_update_and_delete() {
    let store = store().await;
    let author = user(&store).await;
    let created = store.insert_blog(blog(author, "short")).await.unwrap();
    assert_eq!(created.state, BlogState::Draft);

    let read = store.increment_read_count(created.id).await.unwrap().unwrap();
    assert_eq!(read.read_count, 1);

    let patch = BlogPatch {
        body: Patch::Set("z".repeat(431)),
        state: Patch::Set(BlogState::Published),
        ..Default::default()
    };
    let updated = store.update_blog(created.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.reading_time, 3);
    assert_eq!(updated.state, BlogState::Published);
    assert_eq!(updated.tags, created.tags);
    assert!(updated.updated_at >= created.updated_at);

    assert!(store.delete_blog(created.id).await.unwrap());
    assert!(store.find_blog(created.id).await.unwrap().is_none());
    assert!(!store.delete_blog(created.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_find_blogs_filters_and_sorts() {
    let store = store().await;
    let author = user(&store).await;

    for len in [10, 500, 300] {
        let created = store.insert_blog(blog(author, &"x".repeat(len))).await.unwrap();
        let publish = BlogPatch {
            state: Patch::Set(BlogState::Published),
            ..Default::default()
        };
        store.update_blog(created.id, &publish).await.unwrap();
    }
    store.insert_blog(blog(author, "draft")).await.unwrap();

    let filter = BlogFilter {
        author: Some(author),
        tags_any: vec!["rust".to_string()],
        title_contains: Some("PG-".to_string()),
        state: Some(BlogState::Published),
    };
    let sort = Sort {
        field: SortField::ReadingTime,
        direction: SortDirection::Ascending,
    };

    let found = store
        .find_blogs(&BlogQuery::new(filter.clone(), Some(sort), Pagination::default()))
        .await
        .unwrap();
    let times: Vec<u32> = found.iter().map(|b| b.reading_time).collect();
    assert_eq!(times, vec![1, 2, 3]);

    let page = store
        .find_blogs(&BlogQuery::new(filter, None, Pagination { limit: 2, page: 2 }))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].reading_time, 2);
}
