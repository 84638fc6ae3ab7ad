use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewTask, Pagination, Task, TaskFilter, TaskInput};
use crate::store::TaskStore;

/// Owner-scoped task operations on top of a `TaskStore`.
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

fn task_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Task {} not found", id))
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Lists tasks of every owner, newest first. Not exposed over HTTP.
    pub async fn fetch(&self, page: Pagination) -> Result<Vec<Task>, AppError> {
        Ok(self.tasks.fetch_page(page.limit(), page.offset()).await?)
    }

    /// Looks a task up by id regardless of owner. Not exposed over HTTP.
    pub async fn get_by_id(&self, id: i64) -> Result<Task, AppError> {
        self.tasks
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    /// Looks a task up by id, failing with `Forbidden` if `owner` does not own it.
    pub async fn get_owned(&self, owner: i64, id: i64) -> Result<Task, AppError> {
        let task = self.get_by_id(id).await?;
        if task.user_id != owner {
            log::warn!("User {} tried to access task {} of another user", owner, id);
            return Err(AppError::Forbidden(
                "You do not have access to this task".into(),
            ));
        }
        Ok(task)
    }

    /// Lists the owner's tasks, newest first, narrowed by every present filter value.
    pub async fn get_by_user_id(
        &self,
        owner: i64,
        page: Pagination,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, AppError> {
        Ok(self
            .tasks
            .fetch_filtered(owner, page.limit(), page.offset(), filter)
            .await?)
    }

    pub async fn get_all_categories(&self) -> Result<Vec<String>, AppError> {
        Ok(self.tasks.list_distinct_categories().await?)
    }

    /// Creates a task owned by `owner`; both timestamps are set to now.
    pub async fn store(&self, owner: i64, input: TaskInput) -> Result<Task, AppError> {
        input.validate()?;

        let new_task = NewTask::new(input, owner, Utc::now());
        let id = self.tasks.insert(&new_task).await?;
        log::info!("User {} created task {}", owner, id);
        Ok(new_task.into_task(id))
    }

    /// Replaces the mutable fields of an owned task and refreshes `updated_at`.
    pub async fn update(&self, owner: i64, id: i64, input: TaskInput) -> Result<Task, AppError> {
        input.validate()?;

        let mut task = self.get_owned(owner, id).await?;
        task.apply(input, Utc::now());

        // Conditional on (id, owner): a concurrent delete shows up as zero rows.
        if self.tasks.update(&task).await? == 0 {
            return Err(task_not_found(id));
        }
        log::info!("User {} updated task {}", owner, id);
        Ok(task)
    }

    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), AppError> {
        self.get_owned(owner, id).await?;

        if self.tasks.delete(id, owner).await? == 0 {
            return Err(task_not_found(id));
        }
        log::info!("User {} deleted task {}", owner, id);
        Ok(())
    }
}
