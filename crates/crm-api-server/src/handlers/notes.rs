use crate::auth::CurrentUser;
use crate::database::{NewNote, Note, ProgressStatus, Repository};
use crate::handlers::tasks::parse_progress_filter;
use crate::utils::error::ApiError;
use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct NoteListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoteListResponse {
    pub notes: Vec<Note>,
    pub total: usize,
    /// Tab counts per progress status, over the whole set (not the
    /// filtered page).
    pub counts: HashMap<String, i64>,
}

pub async fn list_notes_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Query(query): Query<NoteListQuery>,
) -> Result<Json<NoteListResponse>, ApiError> {
    let status = parse_progress_filter(query.status.as_deref())?;
    let notes = repository
        .list_notes(query.search.as_deref(), status)
        .await?;

    let mut counts: HashMap<String, i64> = ProgressStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for (status, count) in repository.note_status_counts().await? {
        counts.insert(status, count);
    }

    let total = notes.len();
    Ok(Json(NoteListResponse {
        notes,
        total,
        counts,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: Option<String>,
    pub status: Option<ProgressStatus>,
    pub lead_id: Option<Uuid>,
}

pub async fn create_note_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateNoteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let id = repository
        .create_note(NewNote {
            title: request.title.trim().to_string(),
            content: request.content,
            status: request.status.unwrap_or(ProgressStatus::Pending),
            lead_id: request.lead_id,
            created_by: user.id,
        })
        .await?;

    Ok(Json(serde_json::json!({ "id": id })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub status: ProgressStatus,
}

pub async fn update_note_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateNoteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = repository
        .update_note_status(id, request.status, user.lead_scope())
        .await?;
    if !updated {
        return Err(ApiError::NotFound(format!("note {}", id)));
    }
    Ok(Json(serde_json::json!({ "id": id, "status": request.status })))
}

pub async fn delete_note_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !repository.delete_note(id, user.lead_scope()).await? {
        return Err(ApiError::NotFound(format!("note {}", id)));
    }
    Ok(Json(serde_json::json!({ "deleted": id })))
}
