use crate::auth::CurrentUser;
use crate::database::{Client, ClientDraft, NewLead, Repository};
use crate::sheet::{parse_client_rows, parse_lead_rows, parse_table};
use crate::utils::error::ApiError;
use crate::utils::ids;
use chrono::{Datelike, Local};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub inserted: usize,
    pub merged: usize,
    pub skipped: usize,
}

/// How an incoming batch lands against existing clients: rows matching an
/// existing dedup key become sub-area updates, the rest become inserts.
/// Duplicates inside the batch itself collapse the same way.
#[derive(Debug, PartialEq)]
pub struct ClientMergePlan {
    pub updates: Vec<(String, Vec<String>)>,
    pub inserts: Vec<ClientDraft>,
}

fn union_areas(base: &[String], extra: &[String]) -> Vec<String> {
    let mut out: Vec<String> = base.to_vec();
    for area in extra {
        if !out.iter().any(|a| a == area) {
            out.push(area.clone());
        }
    }
    out
}

type MergeKey = (String, Option<String>, Option<String>, Option<String>);

fn draft_key(draft: &ClientDraft) -> MergeKey {
    (
        draft.company.clone(),
        draft.pincode.clone(),
        draft.state.clone(),
        draft.main_area.clone(),
    )
}

/// Pure merge step: no database access, fully decided from the two inputs.
pub fn plan_client_merge(existing: &[Client], incoming: Vec<ClientDraft>) -> ClientMergePlan {
    let by_key: HashMap<MergeKey, &Client> =
        existing.iter().map(|c| (c.merge_key(), c)).collect();

    let mut updates: HashMap<String, Vec<String>> = HashMap::new();
    let mut update_order: Vec<String> = Vec::new();
    let mut inserts: Vec<ClientDraft> = Vec::new();

    for draft in incoming {
        let key = draft_key(&draft);
        if let Some(client) = by_key.get(&key) {
            let areas = updates
                .entry(client.id.clone())
                .or_insert_with(|| {
                    update_order.push(client.id.clone());
                    client.sub_areas.clone()
                });
            *areas = union_areas(areas, &draft.sub_areas);
        } else if let Some(prior) = inserts.iter_mut().find(|d| draft_key(d) == key) {
            prior.sub_areas = union_areas(&prior.sub_areas, &draft.sub_areas);
        } else {
            inserts.push(draft);
        }
    }

    ClientMergePlan {
        updates: update_order
            .into_iter()
            .filter_map(|id| updates.remove(&id).map(|areas| (id, areas)))
            .collect(),
        inserts,
    }
}

pub struct ImportService {
    repository: Arc<Repository>,
}

impl ImportService {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    /// Parse an uploaded client sheet and apply the merge rule against the
    /// stored set. Malformed files fail wholesale before any write.
    pub async fn import_clients(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ImportOutcome, ApiError> {
        let rows = parse_table(filename, bytes)
            .map_err(|e| ApiError::ImportError(format!("could not read {}: {}", filename, e)))?;
        let drafts = parse_client_rows(&rows);
        if drafts.is_empty() {
            return Err(ApiError::ImportError(
                "no client rows found in file".to_string(),
            ));
        }
        let skipped = rows.len() - drafts.len();

        let existing = self.repository.list_clients(None).await?;
        let plan = plan_client_merge(&existing, drafts);

        let merged = plan.updates.len();
        for (id, areas) in &plan.updates {
            self.repository.update_client_sub_areas(id, areas).await?;
        }

        let year = Local::now().year();
        let mut next = self.repository.next_client_number(year).await?;
        let inserted = plan.inserts.len();
        for draft in &plan.inserts {
            let id = ids::client_id(year, next);
            next += 1;
            self.repository.insert_client(&id, draft).await?;
        }

        info!(
            "Client import from {}: {} inserted, {} merged, {} skipped",
            filename, inserted, merged, skipped
        );
        Ok(ImportOutcome {
            inserted,
            merged,
            skipped,
        })
    }

    /// Parse an uploaded lead sheet and insert every well-formed row.
    /// Assignee names resolve against the team case-insensitively; names
    /// with no match import unassigned.
    pub async fn import_leads(
        &self,
        user: &CurrentUser,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ImportOutcome, ApiError> {
        let rows = parse_table(filename, bytes)
            .map_err(|e| ApiError::ImportError(format!("could not read {}: {}", filename, e)))?;
        let lead_rows = parse_lead_rows(&rows);
        if lead_rows.is_empty() {
            return Err(ApiError::ImportError(
                "no lead rows found in file".to_string(),
            ));
        }
        let skipped = rows.len() - lead_rows.len();

        let team = self.repository.list_team().await?;
        let by_name: HashMap<String, Uuid> = team
            .iter()
            .map(|m| (m.name.to_lowercase(), m.id))
            .collect();

        let today = Local::now().date_naive();
        let inserted = lead_rows.len();
        for row in lead_rows {
            let assigned_to = match &row.assigned_to_name {
                Some(name) => by_name.get(&name.to_lowercase()).copied(),
                // A salesperson's own import lands on their desk.
                None => user.lead_scope(),
            };
            self.repository
                .create_lead(NewLead {
                    lead_id: ids::lead_id(),
                    company: row.company,
                    contact: row.contact,
                    phone: row.phone,
                    email: row.email,
                    city: row.city,
                    state: row.state,
                    country: row.country,
                    source: row.source,
                    product_interested: row.product_interested,
                    assigned_to,
                    status: row.status,
                    value: row.value,
                    remarks: row.remarks,
                    inquiry_date: Some(row.inquiry_date.unwrap_or(today)),
                })
                .await?;
        }

        info!(
            "Lead import from {} by {}: {} inserted, {} skipped",
            filename, user.name, inserted, skipped
        );
        Ok(ImportOutcome {
            inserted,
            merged: 0,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn client(id: &str, company: &str, pincode: Option<&str>, areas: &[&str]) -> Client {
        Client {
            id: id.to_string(),
            company: company.to_string(),
            pincode: pincode.map(String::from),
            state: None,
            main_area: None,
            sub_areas: areas.iter().map(|a| a.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn draft(company: &str, pincode: Option<&str>, areas: &[&str]) -> ClientDraft {
        ClientDraft {
            company: company.to_string(),
            pincode: pincode.map(String::from),
            state: None,
            main_area: None,
            sub_areas: areas.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn matching_key_unions_sub_areas() {
        let existing = vec![client(
            "CLIENT-2025-0001",
            "Acme",
            Some("400001"),
            &["Andheri"],
        )];
        let plan = plan_client_merge(
            &existing,
            vec![draft("Acme", Some("400001"), &["Bandra", "Andheri"])],
        );
        assert!(plan.inserts.is_empty());
        assert_eq!(
            plan.updates,
            vec![(
                "CLIENT-2025-0001".to_string(),
                vec!["Andheri".to_string(), "Bandra".to_string()]
            )]
        );
    }

    #[test]
    fn differing_key_field_inserts_a_new_client() {
        let existing = vec![client("CLIENT-2025-0001", "Acme", Some("400001"), &[])];
        let plan = plan_client_merge(&existing, vec![draft("Acme", Some("400002"), &["Juhu"])]);
        assert!(plan.updates.is_empty());
        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0].pincode.as_deref(), Some("400002"));
    }

    #[test]
    fn duplicates_within_the_batch_collapse() {
        let plan = plan_client_merge(
            &[],
            vec![
                draft("Acme", Some("400001"), &["Andheri"]),
                draft("Acme", Some("400001"), &["Bandra"]),
                draft("Orbit", None, &[]),
            ],
        );
        assert_eq!(plan.inserts.len(), 2);
        assert_eq!(
            plan.inserts[0].sub_areas,
            vec!["Andheri".to_string(), "Bandra".to_string()]
        );
    }

    #[test]
    fn repeat_import_of_same_row_changes_nothing() {
        let existing = vec![client(
            "CLIENT-2025-0001",
            "Acme",
            Some("400001"),
            &["Andheri"],
        )];
        let plan = plan_client_merge(
            &existing,
            vec![draft("Acme", Some("400001"), &["Andheri"])],
        );
        assert_eq!(
            plan.updates[0].1,
            vec!["Andheri".to_string()],
            "union with itself is a no-op"
        );
        assert!(plan.inserts.is_empty());
    }
}
