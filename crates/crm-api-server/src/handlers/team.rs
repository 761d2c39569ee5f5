use crate::auth::{password, CurrentUser};
use crate::database::{NewMember, Repository, StaffRole, StaffStatus};
use crate::utils::error::ApiError;
use crate::utils::ids;
use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// A team member with their derived lead statistics.
#[derive(Debug, Serialize)]
pub struct TeamMemberView {
    pub id: Uuid,
    pub person_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: StaffRole,
    pub status: StaffStatus,
    pub leads: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TeamListResponse {
    pub members: Vec<TeamMemberView>,
    pub total: usize,
}

pub async fn list_team_handler(
    Extension(repository): Extension<Arc<Repository>>,
) -> Result<Json<TeamListResponse>, ApiError> {
    let members = repository.list_team().await?;
    let stats: HashMap<Uuid, (i64, i64)> = repository
        .team_stats()
        .await?
        .into_iter()
        .map(|s| (s.person_id, (s.leads, s.conversions)))
        .collect();

    let members: Vec<TeamMemberView> = members
        .into_iter()
        .map(|m| {
            let (leads, conversions) = stats.get(&m.id).copied().unwrap_or((0, 0));
            TeamMemberView {
                id: m.id,
                person_id: m.person_id,
                name: m.name,
                email: m.email,
                phone: m.phone,
                role: m.role,
                status: m.status,
                leads,
                conversions,
                conversion_rate: if leads == 0 {
                    0.0
                } else {
                    conversions as f64 * 100.0 / leads as f64
                },
                created_at: m.created_at,
            }
        })
        .collect();

    let total = members.len();
    Ok(Json(TeamListResponse { members, total }))
}

#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Option<StaffRole>,
    pub status: Option<StaffStatus>,
}

pub async fn create_member_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateMemberRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_admin()?;
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(ApiError::BadRequest(
            "name, email and password are required".to_string(),
        ));
    }

    let password_hash =
        password::hash(&request.password).map_err(|e| ApiError::InternalError(e.to_string()))?;

    let id = repository
        .create_member(NewMember {
            person_id: ids::person_id(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            phone: request.phone,
            password_hash,
            role: request.role.unwrap_or(StaffRole::Salesperson),
            status: request.status.unwrap_or(StaffStatus::Active),
        })
        .await
        .map_err(|e| {
            // Unique email/person_id collisions read as client errors.
            let msg = e.to_string();
            if msg.contains("duplicate key") {
                ApiError::BadRequest("email already registered".to_string())
            } else {
                ApiError::from(e)
            }
        })?;

    info!("Team member {} created by {}", id, user.name);
    Ok(Json(serde_json::json!({ "id": id })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: Option<StaffStatus>,
    /// Present only when resetting the password.
    pub password: Option<String>,
}

pub async fn update_member_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMemberRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_admin()?;
    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "name and email are required".to_string(),
        ));
    }

    let updated = repository
        .update_member(
            id,
            request.name.trim(),
            &request.email.trim().to_lowercase(),
            request.phone.as_deref(),
            request.status.unwrap_or(StaffStatus::Active),
        )
        .await?;
    if !updated {
        return Err(ApiError::NotFound(format!("team member {}", id)));
    }

    if let Some(new_password) = request.password.filter(|p| !p.is_empty()) {
        let hash =
            password::hash(&new_password).map_err(|e| ApiError::InternalError(e.to_string()))?;
        repository.update_member_password(id, &hash).await?;
        info!("Password reset for member {} by {}", id, user.name);
    }

    Ok(Json(serde_json::json!({ "id": id })))
}

pub async fn delete_member_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_admin()?;
    if id == user.id {
        return Err(ApiError::BadRequest(
            "cannot delete your own account".to_string(),
        ));
    }
    if !repository.delete_member(id).await? {
        return Err(ApiError::NotFound(format!("team member {}", id)));
    }
    info!("Team member {} deleted by {}", id, user.name);
    Ok(Json(serde_json::json!({ "deleted": id })))
}
