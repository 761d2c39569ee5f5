use crate::auth::CurrentUser;
use crate::database::{Lead, LeadStatus, Repository};
use crate::utils::error::ApiError;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Serialize, PartialEq)]
pub struct StatusCount {
    pub status: LeadStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SourceCount {
    pub source: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct TeamReportRow {
    pub id: Uuid,
    pub name: String,
    pub leads: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
}

/// Everything the dashboard view renders, recomputed per request over the
/// caller's visible lead set.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_leads: i64,
    pub status_counts: Vec<StatusCount>,
    pub due_today: i64,
    pub converted: i64,
    pub conversion_rate: f64,
    pub total_pipeline_value: i64,
    pub team: Vec<TeamReportRow>,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub total_leads: i64,
    pub converted: i64,
    pub conversion_rate: f64,
    pub total_pipeline_value: i64,
    pub average_deal_value: i64,
    pub status_counts: Vec<StatusCount>,
    pub source_counts: Vec<SourceCount>,
}

#[derive(Debug, PartialEq)]
pub struct LeadAggregates {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
    pub due_today: i64,
    pub converted: i64,
    pub total_value: i64,
    pub by_source: Vec<SourceCount>,
}

impl LeadAggregates {
    pub fn conversion_rate(&self) -> f64 {
        rate(self.converted, self.total)
    }

    pub fn average_value(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            self.total_value / self.total
        }
    }
}

fn rate(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Single pass over the lead set. Status buckets come out in pipeline
/// order with zero counts included; sources sort by count descending.
pub fn aggregate_leads(leads: &[Lead], today: NaiveDate) -> LeadAggregates {
    let mut status_counts: HashMap<LeadStatus, i64> = HashMap::new();
    let mut source_counts: HashMap<String, i64> = HashMap::new();
    let mut due_today = 0i64;
    let mut total_value = 0i64;

    for lead in leads {
        *status_counts.entry(lead.status).or_default() += 1;
        if let Some(source) = lead.source.as_deref() {
            if !source.is_empty() {
                *source_counts.entry(source.to_string()).or_default() += 1;
            }
        }
        if lead.next_follow_up_date == Some(today) {
            due_today += 1;
        }
        total_value += lead.value;
    }

    let by_status = LeadStatus::ALL
        .iter()
        .map(|s| StatusCount {
            status: *s,
            count: status_counts.get(s).copied().unwrap_or(0),
        })
        .collect();

    let mut by_source: Vec<SourceCount> = source_counts
        .into_iter()
        .map(|(source, count)| SourceCount { source, count })
        .collect();
    by_source.sort_by(|a, b| b.count.cmp(&a.count).then(a.source.cmp(&b.source)));

    LeadAggregates {
        total: leads.len() as i64,
        converted: status_counts
            .get(&LeadStatus::Converted)
            .copied()
            .unwrap_or(0),
        by_status,
        due_today,
        total_value,
        by_source,
    }
}

pub struct ReportsService {
    repository: Arc<Repository>,
}

impl ReportsService {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    pub async fn dashboard(&self, user: &CurrentUser) -> Result<DashboardSummary, ApiError> {
        let leads = self
            .repository
            .list_leads(user.lead_scope(), None, None)
            .await?;
        let today = Local::now().date_naive();
        let agg = aggregate_leads(&leads, today);
        debug!("Dashboard over {} leads for {}", agg.total, user.name);

        let team = if user.is_admin() {
            self.team_rows().await?
        } else {
            Vec::new()
        };

        Ok(DashboardSummary {
            total_leads: agg.total,
            due_today: agg.due_today,
            converted: agg.converted,
            conversion_rate: agg.conversion_rate(),
            total_pipeline_value: agg.total_value,
            status_counts: agg.by_status,
            team,
        })
    }

    pub async fn summary(&self, user: &CurrentUser) -> Result<ReportSummary, ApiError> {
        let leads = self
            .repository
            .list_leads(user.lead_scope(), None, None)
            .await?;
        let agg = aggregate_leads(&leads, Local::now().date_naive());

        Ok(ReportSummary {
            total_leads: agg.total,
            converted: agg.converted,
            conversion_rate: agg.conversion_rate(),
            total_pipeline_value: agg.total_value,
            average_deal_value: agg.average_value(),
            status_counts: agg.by_status,
            source_counts: agg.by_source,
        })
    }

    async fn team_rows(&self) -> Result<Vec<TeamReportRow>, ApiError> {
        let members = self.repository.list_team().await?;
        let stats = self.repository.team_stats().await?;
        let by_id: HashMap<Uuid, (i64, i64)> = stats
            .into_iter()
            .map(|s| (s.person_id, (s.leads, s.conversions)))
            .collect();

        Ok(members
            .into_iter()
            .map(|m| {
                let (leads, conversions) = by_id.get(&m.id).copied().unwrap_or((0, 0));
                TeamReportRow {
                    id: m.id,
                    name: m.name,
                    leads,
                    conversions,
                    conversion_rate: rate(conversions, leads),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lead(status: LeadStatus, value: i64, source: Option<&str>, due: Option<NaiveDate>) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            lead_id: "LD000000000".to_string(),
            company: "c".to_string(),
            contact: "p".to_string(),
            phone: None,
            email: None,
            city: None,
            state: None,
            country: None,
            source: source.map(String::from),
            product_interested: None,
            assigned_to: None,
            assigned_to_name: None,
            status,
            value,
            remarks: None,
            inquiry_date: None,
            next_follow_up_date: due,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 18).unwrap()
    }

    #[test]
    fn aggregates_pipeline_value_and_conversions() {
        let leads = vec![
            lead(LeadStatus::Converted, 100_000, None, None),
            lead(LeadStatus::New, 50_000, None, None),
        ];
        let agg = aggregate_leads(&leads, today());
        assert_eq!(agg.total, 2);
        assert_eq!(agg.total_value, 150_000);
        assert_eq!(agg.converted, 1);
        assert_eq!(agg.conversion_rate(), 50.0);
        assert_eq!(agg.average_value(), 75_000);
    }

    #[test]
    fn status_buckets_cover_all_states_with_zeros() {
        let agg = aggregate_leads(&[lead(LeadStatus::Lost, 0, None, None)], today());
        assert_eq!(agg.by_status.len(), 10);
        let lost = agg
            .by_status
            .iter()
            .find(|c| c.status == LeadStatus::Lost)
            .unwrap();
        assert_eq!(lost.count, 1);
        let new = agg
            .by_status
            .iter()
            .find(|c| c.status == LeadStatus::New)
            .unwrap();
        assert_eq!(new.count, 0);
    }

    #[test]
    fn due_today_counts_exact_date_matches_only() {
        let leads = vec![
            lead(LeadStatus::New, 0, None, Some(today())),
            lead(LeadStatus::New, 0, None, today().succ_opt()),
            lead(LeadStatus::New, 0, None, None),
        ];
        assert_eq!(aggregate_leads(&leads, today()).due_today, 1);
    }

    #[test]
    fn sources_sort_by_count_then_name() {
        let leads = vec![
            lead(LeadStatus::New, 0, Some("IndiaMART"), None),
            lead(LeadStatus::New, 0, Some("IndiaMART"), None),
            lead(LeadStatus::New, 0, Some("Website"), None),
            lead(LeadStatus::New, 0, Some("Exhibition"), None),
            lead(LeadStatus::New, 0, None, None),
        ];
        let agg = aggregate_leads(&leads, today());
        assert_eq!(agg.by_source[0].source, "IndiaMART");
        assert_eq!(agg.by_source[0].count, 2);
        assert_eq!(agg.by_source[1].source, "Exhibition");
    }

    #[test]
    fn empty_set_yields_zero_rates_not_nan() {
        let agg = aggregate_leads(&[], today());
        assert_eq!(agg.conversion_rate(), 0.0);
        assert_eq!(agg.average_value(), 0);
    }
}
