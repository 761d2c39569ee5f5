use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The ten lead pipeline states. Stored as TEXT; any state may follow any
/// other, there is no transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum LeadStatus {
    New,
    Connected,
    Interested,
    #[serde(rename = "Not Interested")]
    #[sqlx(rename = "Not Interested")]
    NotInterested,
    #[serde(rename = "Detail Share")]
    #[sqlx(rename = "Detail Share")]
    DetailShare,
    #[serde(rename = "Re-connected")]
    #[sqlx(rename = "Re-connected")]
    Reconnected,
    Negotiation,
    Converted,
    Irrelevant,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 10] = [
        LeadStatus::New,
        LeadStatus::Connected,
        LeadStatus::Interested,
        LeadStatus::NotInterested,
        LeadStatus::DetailShare,
        LeadStatus::Reconnected,
        LeadStatus::Negotiation,
        LeadStatus::Converted,
        LeadStatus::Irrelevant,
        LeadStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Connected => "Connected",
            LeadStatus::Interested => "Interested",
            LeadStatus::NotInterested => "Not Interested",
            LeadStatus::DetailShare => "Detail Share",
            LeadStatus::Reconnected => "Re-connected",
            LeadStatus::Negotiation => "Negotiation",
            LeadStatus::Converted => "Converted",
            LeadStatus::Irrelevant => "Irrelevant",
            LeadStatus::Lost => "Lost",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown lead status '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
            TaskPriority::Urgent => "Urgent",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("Low") => Ok(TaskPriority::Low),
            s if s.eq_ignore_ascii_case("Medium") => Ok(TaskPriority::Medium),
            s if s.eq_ignore_ascii_case("High") => Ok(TaskPriority::High),
            s if s.eq_ignore_ascii_case("Urgent") => Ok(TaskPriority::Urgent),
            other => Err(format!("unknown task priority '{}'", other)),
        }
    }
}

/// Shared Pending / In Progress / Completed cycle used by both tasks and
/// notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum ProgressStatus {
    Pending,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 3] = [
        ProgressStatus::Pending,
        ProgressStatus::InProgress,
        ProgressStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Pending => "Pending",
            ProgressStatus::InProgress => "In Progress",
            ProgressStatus::Completed => "Completed",
        }
    }
}

impl FromStr for ProgressStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProgressStatus::ALL
            .iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown progress status '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Salesperson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum StaffStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum FollowUpMethod {
    Call,
    Email,
    WhatsApp,
    Visit,
    Meeting,
}

/// Lead row joined with the assignee's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: Uuid,
    pub lead_id: String,
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
    pub assigned_to_name: Option<String>,
    pub status: LeadStatus,
    pub value: i64,
    pub remarks: Option<String>,
    pub inquiry_date: Option<NaiveDate>,
    pub next_follow_up_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One follow-up conversation record. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FollowUpEntry {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub discussion: String,
    pub method: Option<FollowUpMethod>,
    pub actor_id: Option<Uuid>,
    pub actor_name: Option<String>,
    pub follow_up_date: NaiveDate,
    pub next_action: Option<String>,
    pub next_follow_up_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: Uuid,
    pub task_id: String,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub assigned_to_name: Option<String>,
    pub priority: TaskPriority,
    pub status: ProgressStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub status: ProgressStatus,
    pub lead_id: Option<Uuid>,
    pub lead_company: Option<String>,
    pub created_by: Uuid,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SalesPerson {
    pub id: Uuid,
    pub person_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: StaffRole,
    pub status: StaffStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read-time statistics for one team member, derived by joining against
/// leads.assigned_to. Never stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMemberStats {
    pub person_id: Uuid,
    pub leads: i64,
    pub conversions: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: String,
    pub company: String,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub main_area: Option<String>,
    pub sub_areas: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Dedup key for the client merge rule: rows sharing this key collapse
    /// into one record with unioned sub-areas.
    pub fn merge_key(&self) -> (String, Option<String>, Option<String>, Option<String>) {
        (
            self.company.clone(),
            self.pincode.clone(),
            self.state.clone(),
            self.main_area.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_status_parses_every_pipeline_state() {
        for status in LeadStatus::ALL {
            let parsed: LeadStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert_eq!(LeadStatus::ALL.len(), 10);
    }

    #[test]
    fn lead_status_parse_is_case_insensitive() {
        assert_eq!(
            "not interested".parse::<LeadStatus>().unwrap(),
            LeadStatus::NotInterested
        );
        assert_eq!(
            "RE-CONNECTED".parse::<LeadStatus>().unwrap(),
            LeadStatus::Reconnected
        );
    }

    #[test]
    fn lead_status_rejects_unknown_values() {
        assert!("Closed Won".parse::<LeadStatus>().is_err());
        assert!("".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn lead_status_serde_uses_display_spelling() {
        let json = serde_json::to_string(&LeadStatus::DetailShare).unwrap();
        assert_eq!(json, "\"Detail Share\"");
        let back: LeadStatus = serde_json::from_str("\"Re-connected\"").unwrap();
        assert_eq!(back, LeadStatus::Reconnected);
    }

    #[test]
    fn progress_status_parses_spaced_variant() {
        assert_eq!(
            "in progress".parse::<ProgressStatus>().unwrap(),
            ProgressStatus::InProgress
        );
    }
}
