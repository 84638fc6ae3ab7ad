use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{NewTask, NewUser, Task, TaskFilter, User};

/// In-process user store. Ids are assigned sequentially from 1.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<BTreeMap<i64, User>>,
    fail_writes: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `insert` fail, to exercise persistence error paths.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<i64> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("user insert rejected".into()));
        }

        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Unavailable(format!(
                "duplicate key value violates unique constraint on username {:?}",
                user.username
            )));
        }
        let id = users.keys().next_back().copied().unwrap_or(0) + 1;
        users.insert(id, user.clone().into_user(id));
        Ok(id)
    }
}

/// In-process task store with the same ordering and filtering semantics as `PgTaskStore`.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<BTreeMap<i64, Task>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of insert, update and delete calls that changed at least one row.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes every subsequent mutation fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("task write rejected".into()));
        }
        Ok(())
    }
}

/// Newest first; ties broken by id so paging is stable.
fn newest_first(a: &&Task, b: &&Task) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

fn page<'a>(tasks: impl Iterator<Item = &'a Task>, limit: i64, offset: i64) -> Vec<Task> {
    let mut sorted: Vec<&Task> = tasks.collect();
    sorted.sort_by(newest_first);
    sorted
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(0))
        .cloned()
        .collect()
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn fetch_page(&self, limit: i64, offset: i64) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(page(tasks.values(), limit, offset))
    }

    async fn fetch_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn fetch_filtered(
        &self,
        owner: i64,
        limit: i64,
        offset: i64,
        filter: &TaskFilter,
    ) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let owned = tasks
            .values()
            .filter(|t| t.user_id == owner && filter.matches(t));
        Ok(page(owned, limit, offset))
    }

    async fn list_distinct_categories(&self) -> StoreResult<Vec<String>> {
        let tasks = self.tasks.read().await;
        let mut seen = HashSet::new();
        Ok(tasks
            .values()
            .filter(|t| seen.insert(t.category.as_str()))
            .map(|t| t.category.clone())
            .collect())
    }

    async fn insert(&self, task: &NewTask) -> StoreResult<i64> {
        self.check_writable()?;
        let mut tasks = self.tasks.write().await;
        let id = tasks.keys().next_back().copied().unwrap_or(0) + 1;
        tasks.insert(id, task.clone().into_task(id));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn update(&self, task: &Task) -> StoreResult<u64> {
        self.check_writable()?;
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task.id) {
            Some(existing) if existing.user_id == task.user_id => {
                *existing = Task {
                    created_at: existing.created_at,
                    ..task.clone()
                };
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete(&self, id: i64, owner: i64) -> StoreResult<u64> {
        self.check_writable()?;
        let mut tasks = self.tasks.write().await;
        match tasks.get(&id) {
            Some(existing) if existing.user_id == owner => {
                tasks.remove(&id);
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskInput};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn new_task(owner: i64, text: &str, minutes_ago: i64) -> NewTask {
        NewTask::new(
            TaskInput {
                text: text.to_string(),
                category: "misc".to_string(),
                date: Utc::now(),
                priority_level: Priority::Low,
                completed: false,
            },
            owner,
            Utc::now() - Duration::minutes(minutes_ago),
        )
    }

    #[actix_rt::test]
    async fn test_listing_is_newest_first_and_paged() {
        let store = MemoryTaskStore::new();
        for (text, age) in [("oldest", 30), ("newest", 1), ("middle", 10)] {
            store.insert(&new_task(1, text, age)).await.unwrap();
        }

        let all = store.fetch_page(10, 0).await.unwrap();
        let texts: Vec<&str> = all.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["newest", "middle", "oldest"]);

        let second = store.fetch_page(1, 1).await.unwrap();
        assert_eq!(second[0].text, "middle");

        assert!(store.fetch_page(10, 3).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_update_and_delete_are_conditional_on_owner() {
        let store = MemoryTaskStore::new();
        let id = store.insert(&new_task(1, "mine", 0)).await.unwrap();

        let mut stolen = store.fetch_by_id(id).await.unwrap().unwrap();
        stolen.user_id = 2;
        stolen.text = "hijacked".to_string();
        assert_eq!(store.update(&stolen).await.unwrap(), 0);
        assert_eq!(store.delete(id, 2).await.unwrap(), 0);
        assert_eq!(store.write_count(), 1);

        assert_eq!(store.delete(id, 1).await.unwrap(), 1);
        assert!(store.fetch_by_id(id).await.unwrap().is_none());
        assert_eq!(store.delete(id, 1).await.unwrap(), 0);
    }

    #[actix_rt::test]
    async fn test_distinct_categories() {
        let store = MemoryTaskStore::new();
        for category in ["work", "home", "work"] {
            let mut task = new_task(1, "t", 0);
            task.category = category.to_string();
            store.insert(&task).await.unwrap();
        }

        let mut categories = store.list_distinct_categories().await.unwrap();
        categories.sort();
        assert_eq!(categories, vec!["home".to_string(), "work".to_string()]);
    }

    #[actix_rt::test]
    async fn test_user_ids_are_sequential_and_failures_injectable() {
        let store = MemoryUserStore::new();
        let now = Utc::now();
        let user = |name: &str| NewUser {
            username: name.to_string(),
            password_hash: "hash".to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(store.insert(&user("a")).await.unwrap(), 1);
        assert_eq!(store.insert(&user("b")).await.unwrap(), 2);
        assert!(store.insert(&user("a")).await.is_err());

        store.fail_writes(true);
        assert!(store.insert(&user("c")).await.is_err());
        assert_eq!(store.len().await, 2);
        assert_eq!(store.find_by_id(2).await.unwrap().unwrap().username, "b");
    }
}
