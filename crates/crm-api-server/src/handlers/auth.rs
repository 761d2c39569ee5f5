use crate::auth::{password, JwtManager};
use crate::database::{Repository, StaffRole, StaffStatus};
use crate::utils::error::ApiError;
use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: StaffRole,
}

pub async fn login_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(jwt): Extension<Arc<JwtManager>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let member = repository
        .find_member_by_email(&request.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

    let valid = password::verify(&request.password, &member.password_hash)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    if !valid {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }
    if member.status != StaffStatus::Active {
        return Err(ApiError::Forbidden("account is inactive".to_string()));
    }

    let token = jwt
        .generate_token(member.id, &member.name, member.role)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    info!("Login: {} ({:?})", member.email, member.role);

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            id: member.id,
            name: member.name,
            email: member.email,
            role: member.role,
        },
    }))
}
