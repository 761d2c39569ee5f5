use crate::auth::CurrentUser;
use crate::database::{NewTask, ProgressStatus, Repository, Task, TaskPriority};
use crate::utils::error::ApiError;
use crate::utils::ids;
use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub(crate) fn parse_progress_filter(raw: Option<&str>) -> Result<Option<ProgressStatus>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() || s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => ProgressStatus::from_str(s)
            .map(Some)
            .map_err(ApiError::BadRequest),
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub total: usize,
}

pub async fn list_tasks_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let status = parse_progress_filter(query.status.as_deref())?;
    let tasks = repository
        .list_tasks(user.lead_scope(), query.search.as_deref(), status)
        .await?;
    let total = tasks.len();
    Ok(Json(TaskListResponse { tasks, total }))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
}

pub async fn create_task_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }
    // Rejected before any write; there are no unassigned tasks.
    let assigned_to = request
        .assigned_to
        .ok_or_else(|| ApiError::BadRequest("assignee is required".to_string()))?;

    let id = repository
        .create_task(NewTask {
            task_id: ids::task_id(),
            title: request.title.trim().to_string(),
            description: request.description,
            assigned_to,
            priority: request.priority.unwrap_or(TaskPriority::Medium),
            due_date: request.due_date,
        })
        .await?;

    info!("Task {} created by {}", id, user.name);
    Ok(Json(serde_json::json!({ "id": id })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub status: ProgressStatus,
}

pub async fn update_task_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = repository
        .update_task_status(id, request.status, user.lead_scope())
        .await?;
    if !updated {
        return Err(ApiError::NotFound(format!("task {}", id)));
    }
    Ok(Json(serde_json::json!({ "id": id, "status": request.status })))
}

pub async fn delete_task_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !repository.delete_task(id, user.lead_scope()).await? {
        return Err(ApiError::NotFound(format!("task {}", id)));
    }
    Ok(Json(serde_json::json!({ "deleted": id })))
}
