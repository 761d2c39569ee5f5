use crate::auth::CurrentUser;
use crate::database::{
    FollowUpEntry, FollowUpMethod, FollowUpSave, Lead, LeadStatus, LeadUpdate, NewLead, Repository,
};
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
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// "All" and absence both mean no filter; anything else must be one of the
/// ten pipeline states.
pub(crate) fn parse_status_filter(raw: Option<&str>) -> Result<Option<LeadStatus>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() || s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => LeadStatus::from_str(s)
            .map(Some)
            .map_err(ApiError::BadRequest),
    }
}

#[derive(Debug, Deserialize)]
pub struct LeadListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeadListResponse {
    pub leads: Vec<Lead>,
    pub total: usize,
}

pub async fn list_leads_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<LeadListQuery>,
) -> Result<Json<LeadListResponse>, ApiError> {
    let status = parse_status_filter(query.status.as_deref())?;
    let leads = repository
        .list_leads(user.lead_scope(), query.search.as_deref(), status)
        .await?;
    let total = leads.len();
    Ok(Json(LeadListResponse { leads, total }))
}

#[derive(Debug, Deserialize)]
pub struct CreateLeadRequest {
    pub company: String,
    pub contact: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub source: Option<String>,
    pub product_interested: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub status: Option<LeadStatus>,
    pub value: Option<i64>,
    pub remarks: Option<String>,
    pub inquiry_date: Option<NaiveDate>,
}

pub async fn create_lead_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateLeadRequest>,
) -> Result<Json<Lead>, ApiError> {
    if request.company.trim().is_empty() || request.contact.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "company and contact are required".to_string(),
        ));
    }

    // A salesperson's lead always lands in their own book; otherwise the
    // row would be invisible to its creator.
    let assigned_to = if user.is_admin() {
        request.assigned_to
    } else {
        Some(user.id)
    };

    let lead = repository
        .create_lead(NewLead {
            lead_id: ids::lead_id(),
            company: request.company.trim().to_string(),
            contact: request.contact.trim().to_string(),
            phone: request.phone,
            email: request.email,
            city: request.city,
            state: request.state,
            country: request.country,
            source: request.source,
            product_interested: request.product_interested,
            assigned_to,
            status: request.status.unwrap_or(LeadStatus::New),
            value: request.value.unwrap_or(0),
            remarks: request.remarks,
            inquiry_date: Some(
                request
                    .inquiry_date
                    .unwrap_or_else(|| Local::now().date_naive()),
            ),
        })
        .await?;

    info!("Lead {} created by {}", lead.lead_id, user.name);
    Ok(Json(lead))
}

#[derive(Debug, Deserialize)]
pub struct UpdateLeadRequest {
    pub company: String,
    pub contact: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub source: Option<String>,
    pub product_interested: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub value: Option<i64>,
    pub remarks: Option<String>,
    pub inquiry_date: Option<NaiveDate>,
}

pub async fn update_lead_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateLeadRequest>,
) -> Result<Json<Lead>, ApiError> {
    if request.company.trim().is_empty() || request.contact.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "company and contact are required".to_string(),
        ));
    }

    // Visibility check before the write; a salesperson cannot edit leads
    // outside their scope.
    repository
        .get_lead(id, user.lead_scope())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("lead {}", id)))?;

    let assigned_to = if user.is_admin() {
        request.assigned_to
    } else {
        Some(user.id)
    };

    let lead = repository
        .update_lead(
            id,
            LeadUpdate {
                company: request.company.trim().to_string(),
                contact: request.contact.trim().to_string(),
                phone: request.phone,
                email: request.email,
                city: request.city,
                state: request.state,
                country: request.country,
                source: request.source,
                product_interested: request.product_interested,
                assigned_to,
                value: request.value.unwrap_or(0),
                remarks: request.remarks,
                inquiry_date: request.inquiry_date,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("lead {}", id)))?;

    Ok(Json(lead))
}

pub async fn delete_lead_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_admin()?;
    if !repository.delete_lead(id).await? {
        return Err(ApiError::NotFound(format!("lead {}", id)));
    }
    info!("Lead {} deleted by {}", id, user.name);
    Ok(Json(serde_json::json!({ "deleted": id })))
}

#[derive(Debug, Deserialize)]
pub struct FollowUpRequest {
    pub discussion: String,
    pub status: Option<LeadStatus>,
    pub method: Option<FollowUpMethod>,
    pub follow_up_date: Option<NaiveDate>,
    pub next_action: Option<String>,
    pub next_follow_up_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct FollowUpResponse {
    pub entry_id: Uuid,
    pub lead: Lead,
}

pub async fn save_follow_up_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<FollowUpRequest>,
) -> Result<Json<FollowUpResponse>, ApiError> {
    if request.discussion.trim().is_empty() {
        return Err(ApiError::BadRequest("discussion is required".to_string()));
    }

    repository
        .get_lead(id, user.lead_scope())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("lead {}", id)))?;

    let entry_id = repository
        .save_follow_up(
            id,
            user.id,
            FollowUpSave {
                status: request.status,
                discussion: request.discussion.trim().to_string(),
                method: request.method,
                follow_up_date: request
                    .follow_up_date
                    .unwrap_or_else(|| Local::now().date_naive()),
                next_action: request.next_action,
                next_follow_up_date: request.next_follow_up_date,
            },
        )
        .await?;

    let lead = repository
        .get_lead(id, None)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("lead {}", id)))?;

    Ok(Json(FollowUpResponse { entry_id, lead }))
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<FollowUpEntry>,
    pub total: usize,
}

pub async fn lead_history_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ApiError> {
    repository
        .get_lead(id, user.lead_scope())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("lead {}", id)))?;

    let entries = repository.lead_history(id).await?;
    let total = entries.len();
    Ok(Json(HistoryResponse { entries, total }))
}

/// Pull the first file out of a multipart upload.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(String::from) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(ApiError::BadRequest("no file in request".to_string()))
}

pub async fn import_leads_handler(
    Extension(import_service): Extension<Arc<ImportService>>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<ImportOutcome>, ApiError> {
    let (filename, bytes) = read_upload(multipart).await?;
    let outcome = import_service.import_leads(&user, &filename, &bytes).await?;
    Ok(Json(outcome))
}

pub async fn lead_template_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let leads = repository.list_leads(user.lead_scope(), None, None).await?;
    let buffer =
        writer::lead_template(&leads).map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads-data.xlsx\"",
            ),
        ],
        buffer,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_treats_all_as_absent() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("All")).unwrap(), None);
        assert_eq!(parse_status_filter(Some("")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("Negotiation")).unwrap(),
            Some(LeadStatus::Negotiation)
        );
        assert!(parse_status_filter(Some("Bogus")).is_err());
    }
}
