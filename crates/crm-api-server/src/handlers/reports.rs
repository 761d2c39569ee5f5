use crate::auth::CurrentUser;
use crate::services::reports::{DashboardSummary, ReportSummary};
use crate::services::ReportsService;
use crate::utils::error::ApiError;
use axum::{extract::Extension, Json};
use std::sync::Arc;

pub async fn dashboard_handler(
    Extension(reports): Extension<Arc<ReportsService>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(reports.dashboard(&user).await?))
}

pub async fn summary_handler(
    Extension(reports): Extension<Arc<ReportsService>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ReportSummary>, ApiError> {
    Ok(Json(reports.summary(&user).await?))
}
