use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{Pagination, TaskFilter, TaskInput},
    services::TaskService,
};

/// Query string accepted by the task listing.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub priority_level: Option<String>,
    pub keyword: Option<String>,
}

impl TaskListQuery {
    fn filter(&self) -> Result<TaskFilter, AppError> {
        TaskFilter::new(
            self.category.as_deref(),
            self.priority_level.as_deref(),
            self.keyword.as_deref(),
        )
        .map_err(AppError::BadRequest)
    }
}

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `page`, `limit` (optional): 1-based page and page size; a missing, zero or malformed
///   value means page 1 of 10.
/// - `category` (optional): Exact category match.
/// - `priority_level` (optional): One of `low`, `medium`, `high`.
/// - `keyword` (optional): Case-insensitive substring of the task text.
///
/// Empty values are ignored.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `400 Bad Request`: Unknown `priority_level`.
/// - `401 Unauthorized`: Missing or invalid session token.
#[get("")]
pub async fn get_tasks(
    service: web::Data<TaskService>,
    user_id: AuthenticatedUserId,
    query: web::Query<TaskListQuery>,
) -> Result<impl Responder, AppError> {
    let filter = query.filter()?;
    let page = Pagination::parse(query.page.as_deref(), query.limit.as_deref());

    let tasks = service.get_by_user_id(user_id.0, page, &filter).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Lists every distinct category in use.
#[get("/categories")]
pub async fn get_categories(service: web::Data<TaskService>) -> Result<impl Responder, AppError> {
    let categories = service.get_all_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// Creates a task owned by the authenticated user.
///
/// The owner always comes from the session token, never from the body.
///
/// ## Responses:
/// - `201 Created`: The new `Task`.
/// - `400 Bad Request`: Malformed JSON or an unknown priority.
/// - `422 Unprocessable Entity`: `TaskInput` validation failed.
#[post("")]
pub async fn create_task(
    service: web::Data<TaskService>,
    user_id: AuthenticatedUserId,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = service.store(user_id.0, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a single task.
///
/// ## Responses:
/// - `200 OK`: The `Task`.
/// - `403 Forbidden`: The task belongs to another user.
/// - `404 Not Found`: No task with this id.
#[get("/{id}")]
pub async fn get_task(
    service: web::Data<TaskService>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = service.get_owned(user_id.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces the mutable fields of a task.
///
/// ## Responses:
/// - `200 OK`: The updated `Task`.
/// - `403 Forbidden`: The task belongs to another user.
/// - `404 Not Found`: No task with this id.
/// - `422 Unprocessable Entity`: `TaskInput` validation failed.
#[put("/{id}")]
pub async fn update_task(
    service: web::Data<TaskService>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = service
        .update(user_id.0, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`: Deleted.
/// - `403 Forbidden`: The task belongs to another user.
/// - `404 Not Found`: No task with this id.
#[delete("/{id}")]
pub async fn delete_task(
    service: web::Data<TaskService>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    service.delete(user_id.0, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    #[test]
    fn test_list_query_filter() {
        let query = TaskListQuery {
            category: Some("work".into()),
            priority_level: Some("HIGH".into()),
            keyword: Some(String::new()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.category.as_deref(), Some("work"));
        assert_eq!(filter.priority_level, Some(Priority::High));
        assert_eq!(filter.keyword, None);

        let query = TaskListQuery {
            priority_level: Some("urgent".into()),
            ..Default::default()
        };
        assert!(matches!(query.filter(), Err(AppError::BadRequest(_))));
    }
}
