//! Runs the PostgreSQL stores against a real database.
//!
//! Ignored by default: set `DATABASE_URL` and run with `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use dotenv::dotenv;
use pretty_assertions::assert_eq;
use sqlx::PgPool;
use todo_api::db;
use todo_api::models::{NewTask, NewUser, Priority, TaskFilter, TaskInput};
use todo_api::store::{PgTaskStore, PgUserStore, TaskStore, UserStore};

async fn connect() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

async fn cleanup_user(pool: &PgPool, username: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await;
}

fn new_user(username: &str) -> NewUser {
    let now = Utc::now();
    NewUser {
        username: username.to_string(),
        password_hash: "$2b$04$placeholderplaceholderplaceholderplaceholderplacehold".to_string(),
        name: "Store Test".to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn new_task(owner: i64, text: &str, category: &str, priority: Priority, age: i64) -> NewTask {
    NewTask::new(
        TaskInput {
            text: text.to_string(),
            category: category.to_string(),
            date: Utc::now(),
            priority_level: priority,
            completed: false,
        },
        owner,
        Utc::now() - Duration::minutes(age),
    )
}

#[ignore]
#[actix_rt::test]
async fn test_user_store_roundtrip() {
    let pool = connect().await;
    let users = PgUserStore::new(pool.clone());
    let username = "pg_store_user";
    cleanup_user(&pool, username).await;

    let id = users.insert(&new_user(username)).await.unwrap();
    let by_name = users.find_by_username(username).await.unwrap().unwrap();
    assert_eq!(by_name.id, id);
    assert_eq!(users.find_by_id(id).await.unwrap().unwrap().username, username);
    assert!(users.find_by_username("pg_store_nobody").await.unwrap().is_none());

    // The unique constraint backs up the service-level pre-check.
    assert!(users.insert(&new_user(username)).await.is_err());

    cleanup_user(&pool, username).await;
}

#[ignore]
#[actix_rt::test]
async fn test_task_store_filters_and_ownership() {
    let pool = connect().await;
    let users = PgUserStore::new(pool.clone());
    let tasks = PgTaskStore::new(pool.clone());
    cleanup_user(&pool, "pg_task_owner").await;
    cleanup_user(&pool, "pg_task_other").await;

    let owner = users.insert(&new_user("pg_task_owner")).await.unwrap();
    let other = users.insert(&new_user("pg_task_other")).await.unwrap();

    let lunch = tasks
        .insert(&new_task(owner, "Eat lunch", "food", Priority::Low, 30))
        .await
        .unwrap();
    tasks
        .insert(&new_task(owner, "100% done_ish", "work", Priority::High, 20))
        .await
        .unwrap();
    tasks
        .insert(&new_task(owner, "eating healthy", "food", Priority::Medium, 10))
        .await
        .unwrap();
    tasks
        .insert(&new_task(other, "Eat dinner", "food", Priority::Low, 0))
        .await
        .unwrap();

    let all = tasks
        .fetch_filtered(owner, 10, 0, &TaskFilter::default())
        .await
        .unwrap();
    let texts: Vec<&str> = all.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["eating healthy", "100% done_ish", "Eat lunch"]);

    let keyword = TaskFilter::new(None, None, Some("EAT")).unwrap();
    let found = tasks.fetch_filtered(owner, 10, 0, &keyword).await.unwrap();
    assert_eq!(found.len(), 2);

    let literal = TaskFilter::new(None, None, Some("0% done_")).unwrap();
    let found = tasks.fetch_filtered(owner, 10, 0, &literal).await.unwrap();
    assert_eq!(found.len(), 1);

    let narrowed = TaskFilter::new(Some("food"), Some("low"), None).unwrap();
    let found = tasks.fetch_filtered(owner, 10, 0, &narrowed).await.unwrap();
    assert_eq!(found[0].id, lunch);
    assert_eq!(found.len(), 1);

    let second_page = tasks
        .fetch_filtered(owner, 2, 2, &TaskFilter::default())
        .await
        .unwrap();
    assert_eq!(second_page[0].id, lunch);

    let mut stored = tasks.fetch_by_id(lunch).await.unwrap().unwrap();
    stored.completed = true;
    stored.updated_at = Utc::now();
    assert_eq!(tasks.update(&stored).await.unwrap(), 1);
    assert!(tasks.fetch_by_id(lunch).await.unwrap().unwrap().completed);

    let mut hijacked = stored.clone();
    hijacked.user_id = other;
    assert_eq!(tasks.update(&hijacked).await.unwrap(), 0);
    assert_eq!(tasks.delete(lunch, other).await.unwrap(), 0);
    assert_eq!(tasks.delete(lunch, owner).await.unwrap(), 1);
    assert!(tasks.fetch_by_id(lunch).await.unwrap().is_none());

    let categories = tasks.list_distinct_categories().await.unwrap();
    assert!(categories.contains(&"food".to_string()));
    assert!(categories.contains(&"work".to_string()));

    cleanup_user(&pool, "pg_task_owner").await;
    cleanup_user(&pool, "pg_task_other").await;
}
