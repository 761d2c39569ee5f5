use crate::auth::jwt::JwtManager;
use crate::database::StaffRole;
use crate::utils::error::ApiError;
use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// The resolved actor for one request. Threaded explicitly through data
/// access so record scoping happens at the repository boundary, not in any
/// view layer.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub role: StaffRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == StaffRole::Admin
    }

    /// Assignee scope for lead reads: admins see everything, a salesperson
    /// sees only rows assigned to them.
    pub fn lead_scope(&self) -> Option<Uuid> {
        match self.role {
            StaffRole::Admin => None,
            StaffRole::Salesperson => Some(self.id),
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("admin access required".to_string()))
        }
    }
}

/// Validates the bearer token and injects a `CurrentUser` into request
/// extensions for handlers to pick up.
pub async fn auth_middleware(
    Extension(jwt): Extension<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    let claims = jwt
        .validate_token(token)
        .map_err(|e| ApiError::Unauthorized(format!("invalid token: {}", e)))?;

    request.extensions_mut().insert(CurrentUser {
        id: claims.user_id,
        name: claims.name,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: StaffRole) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            name: "t".to_string(),
            role,
        }
    }

    #[test]
    fn admin_scope_is_unrestricted() {
        assert_eq!(user(StaffRole::Admin).lead_scope(), None);
    }

    #[test]
    fn salesperson_scope_is_own_id() {
        let u = user(StaffRole::Salesperson);
        assert_eq!(u.lead_scope(), Some(u.id));
        assert!(u.require_admin().is_err());
    }
}
