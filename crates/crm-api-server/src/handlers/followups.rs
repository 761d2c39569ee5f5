use crate::auth::CurrentUser;
use crate::database::{Lead, Repository};
use crate::handlers::leads::parse_status_filter;
use crate::utils::dates::week_bounds;
use crate::utils::error::ApiError;
use axum::{
    extract::{Extension, Query},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DueQuery {
    /// "today" (default) or "week"; ignored when from/to are given.
    pub range: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub assignee: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DueResponse {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub leads: Vec<Lead>,
    pub total: usize,
}

fn resolve_window(query: &DueQuery, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), ApiError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ApiError::BadRequest("from is after to".to_string()));
        }
        return Ok((from, to));
    }
    if query.from.is_some() || query.to.is_some() {
        return Err(ApiError::BadRequest(
            "custom range needs both from and to".to_string(),
        ));
    }
    match query.range.as_deref() {
        None | Some("today") => Ok((today, today)),
        Some("week") => Ok(week_bounds(today)),
        Some(other) => Err(ApiError::BadRequest(format!("unknown range '{}'", other))),
    }
}

/// The follow-up work queue: leads whose next follow-up lands in the
/// window. Custom ranges and cross-assignee filtering are admin features.
pub async fn due_follow_ups_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<DueQuery>,
) -> Result<Json<DueResponse>, ApiError> {
    if (query.from.is_some() || query.assignee.is_some()) && !user.is_admin() {
        return Err(ApiError::Forbidden(
            "custom range and assignee filters are admin-only".to_string(),
        ));
    }

    let today = Local::now().date_naive();
    let (from, to) = resolve_window(&query, today)?;
    let status = parse_status_filter(query.status.as_deref())?;

    let leads = repository
        .due_follow_ups(user.lead_scope(), from, to, query.assignee, status)
        .await?;
    let total = leads.len();

    Ok(Json(DueResponse {
        from,
        to,
        leads,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn query(range: Option<&str>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> DueQuery {
        DueQuery {
            range: range.map(String::from),
            from,
            to,
            assignee: None,
            status: None,
        }
    }

    #[test]
    fn default_window_is_today() {
        let today = d(2025, 6, 18);
        assert_eq!(
            resolve_window(&query(None, None, None), today).unwrap(),
            (today, today)
        );
    }

    #[test]
    fn week_window_runs_monday_to_sunday() {
        let today = d(2025, 6, 18); // Wednesday
        assert_eq!(
            resolve_window(&query(Some("week"), None, None), today).unwrap(),
            (d(2025, 6, 16), d(2025, 6, 22))
        );
    }

    #[test]
    fn custom_range_wins_over_range_keyword() {
        let today = d(2025, 6, 18);
        let q = query(Some("week"), Some(d(2025, 1, 1)), Some(d(2025, 1, 31)));
        assert_eq!(
            resolve_window(&q, today).unwrap(),
            (d(2025, 1, 1), d(2025, 1, 31))
        );
    }

    #[test]
    fn inverted_or_half_open_range_is_rejected() {
        let today = d(2025, 6, 18);
        assert!(resolve_window(&query(None, Some(d(2025, 2, 1)), Some(d(2025, 1, 1))), today).is_err());
        assert!(resolve_window(&query(None, Some(d(2025, 1, 1)), None), today).is_err());
        assert!(resolve_window(&query(Some("fortnight"), None, None), today).is_err());
    }
}
