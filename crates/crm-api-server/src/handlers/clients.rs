use crate::auth::CurrentUser;
use crate::database::{Client, ClientDraft, Repository};
use crate::handlers::leads::read_upload;
use crate::services::import::ImportOutcome;
use crate::services::ImportService;
use crate::sheet::writer;
use crate::utils::error::ApiError;
use crate::utils::ids;
use axum::{
    extract::{Extension, Multipart, Path, Query},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Deserialize)]
pub struct ClientListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClientListResponse {
    pub clients: Vec<Client>,
    pub total: usize,
}

pub async fn list_clients_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<ClientListResponse>, ApiError> {
    let clients = repository.list_clients(query.search.as_deref()).await?;
    let total = clients.len();
    Ok(Json(ClientListResponse { clients, total }))
}

#[derive(Debug, Deserialize)]
pub struct ClientRequest {
    pub company: String,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub main_area: Option<String>,
    #[serde(default)]
    pub sub_areas: Vec<String>,
}

impl ClientRequest {
    fn into_draft(self) -> Result<ClientDraft, ApiError> {
        if self.company.trim().is_empty() {
            return Err(ApiError::BadRequest("company is required".to_string()));
        }
        Ok(ClientDraft {
            company: self.company.trim().to_string(),
            pincode: self.pincode.filter(|s| !s.trim().is_empty()),
            state: self.state.filter(|s| !s.trim().is_empty()),
            main_area: self.main_area.filter(|s| !s.trim().is_empty()),
            sub_areas: self
                .sub_areas
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
        })
    }
}

/// Creating a client that matches an existing dedup key merges into it
/// instead of inserting a duplicate.
pub async fn create_client_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<ClientRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let draft = request.into_draft()?;

    let existing = repository.list_clients(None).await?;
    if let Some(client) = existing.iter().find(|c| {
        c.merge_key()
            == (
                draft.company.clone(),
                draft.pincode.clone(),
                draft.state.clone(),
                draft.main_area.clone(),
            )
    }) {
        let mut areas = client.sub_areas.clone();
        for area in &draft.sub_areas {
            if !areas.contains(area) {
                areas.push(area.clone());
            }
        }
        repository.update_client_sub_areas(&client.id, &areas).await?;
        return Ok(Json(serde_json::json!({ "id": client.id, "merged": true })));
    }

    let year = Local::now().year();
    let next = repository.next_client_number(year).await?;
    let id = ids::client_id(year, next);
    repository.insert_client(&id, &draft).await?;

    info!("Client {} created by {}", id, user.name);
    Ok(Json(serde_json::json!({ "id": id, "merged": false })))
}

pub async fn update_client_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<ClientRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_admin()?;
    let draft = request.into_draft()?;
    if !repository.update_client(&id, &draft).await? {
        return Err(ApiError::NotFound(format!("client {}", id)));
    }
    Ok(Json(serde_json::json!({ "id": id })))
}

pub async fn delete_client_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_admin()?;
    if !repository.delete_client(&id).await? {
        return Err(ApiError::NotFound(format!("client {}", id)));
    }
    info!("Client {} deleted by {}", id, user.name);
    Ok(Json(serde_json::json!({ "deleted": id })))
}

pub async fn import_clients_handler(
    Extension(import_service): Extension<Arc<ImportService>>,
    multipart: Multipart,
) -> Result<Json<ImportOutcome>, ApiError> {
    let (filename, bytes) = read_upload(multipart).await?;
    let outcome = import_service.import_clients(&filename, &bytes).await?;
    Ok(Json(outcome))
}

pub async fn client_template_handler(
    Extension(repository): Extension<Arc<Repository>>,
) -> Result<impl IntoResponse, ApiError> {
    let clients = repository.list_clients(None).await?;
    let buffer =
        writer::client_template(&clients).map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"clients-template.xlsx\"",
            ),
        ],
        buffer,
    ))
}
