use super::models::*;
use super::DbPool;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

pub struct Repository {
    pub pool: DbPool,
}

/// Insert payload for a lead. Field optionality mirrors the record store
/// schema, not the form layer.
#[derive(Debug, Clone)]
pub struct NewLead {
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
    pub status: LeadStatus,
    pub value: i64,
    pub remarks: Option<String>,
    pub inquiry_date: Option<NaiveDate>,
}

/// Wholesale replacement of a lead's core fields (the edit form submits the
/// full set every time).
#[derive(Debug, Clone)]
pub struct LeadUpdate {
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
    pub value: i64,
    pub remarks: Option<String>,
    pub inquiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct FollowUpSave {
    pub status: Option<LeadStatus>,
    pub discussion: String,
    pub method: Option<FollowUpMethod>,
    pub follow_up_date: NaiveDate,
    pub next_action: Option<String>,
    pub next_follow_up_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub task_id: String,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: Option<String>,
    pub status: ProgressStatus,
    pub lead_id: Option<Uuid>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub person_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: StaffRole,
    pub status: StaffStatus,
}

/// Client fields without an id; ids are year-scoped counters assigned at
/// insert time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDraft {
    pub company: String,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub main_area: Option<String>,
    pub sub_areas: Vec<String>,
}

const LEAD_COLUMNS: &str = r#"
    l.id, l.lead_id, l.company, l.contact, l.phone, l.email,
    l.city, l.state, l.country, l.source, l.product_interested,
    l.assigned_to, s.name AS assigned_to_name, l.status, l.value,
    l.remarks, l.inquiry_date, l.next_follow_up_date,
    l.created_at, l.updated_at"#;

impl Repository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if this is a fresh database.
    pub async fn ensure_schema(&self) -> Result<()> {
        let pool = self.pool.get_pool();

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS sales_team (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                person_id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                phone TEXT,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'salesperson',
                status TEXT NOT NULL DEFAULT 'Active',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS leads (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                lead_id TEXT NOT NULL UNIQUE,
                company TEXT NOT NULL,
                contact TEXT NOT NULL,
                phone TEXT,
                email TEXT,
                city TEXT,
                state TEXT,
                country TEXT,
                source TEXT,
                product_interested TEXT,
                assigned_to UUID REFERENCES sales_team(id) ON DELETE SET NULL,
                status TEXT NOT NULL DEFAULT 'New',
                value BIGINT NOT NULL DEFAULT 0,
                remarks TEXT,
                inquiry_date DATE,
                next_follow_up_date DATE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS follow_up_history (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                lead_id UUID NOT NULL REFERENCES leads(id) ON DELETE CASCADE,
                discussion TEXT NOT NULL,
                method TEXT,
                actor_id UUID REFERENCES sales_team(id) ON DELETE SET NULL,
                follow_up_date DATE NOT NULL,
                next_action TEXT,
                next_follow_up_date DATE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS tasks (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                task_id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                description TEXT,
                assigned_to UUID NOT NULL REFERENCES sales_team(id) ON DELETE CASCADE,
                priority TEXT NOT NULL DEFAULT 'Medium',
                status TEXT NOT NULL DEFAULT 'Pending',
                due_date DATE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS notes (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                title TEXT NOT NULL,
                content TEXT,
                status TEXT NOT NULL DEFAULT 'Pending',
                lead_id UUID REFERENCES leads(id) ON DELETE SET NULL,
                created_by UUID NOT NULL REFERENCES sales_team(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS clients (
                id TEXT PRIMARY KEY,
                company TEXT NOT NULL,
                pincode TEXT,
                state TEXT,
                main_area TEXT,
                sub_areas TEXT[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_leads_assigned_to ON leads(assigned_to)")
            .execute(pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_leads_status ON leads(status)")
            .execute(pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_leads_next_follow_up ON leads(next_follow_up_date)",
        )
        .execute(pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_history_lead_id ON follow_up_history(lead_id)",
        )
        .execute(pool)
        .await?;

        debug!("Schema ensured");
        Ok(())
    }

    // ============ LEADS ============

    /// List leads visible to `scope` (None = all), newest first, with
    /// optional case-insensitive company/contact search and status filter.
    pub async fn list_leads(
        &self,
        scope: Option<Uuid>,
        search: Option<&str>,
        status: Option<LeadStatus>,
    ) -> Result<Vec<Lead>> {
        let sql = format!(
            r#"SELECT {LEAD_COLUMNS}
               FROM leads l
               LEFT JOIN sales_team s ON s.id = l.assigned_to
               WHERE ($1::uuid IS NULL OR l.assigned_to = $1)
                 AND ($2::text IS NULL
                      OR l.company ILIKE '%' || $2 || '%'
                      OR l.contact ILIKE '%' || $2 || '%')
                 AND ($3::text IS NULL OR l.status = $3)
               ORDER BY l.created_at DESC"#
        );
        let leads = sqlx::query_as::<_, Lead>(&sql)
            .bind(scope)
            .bind(search)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(self.pool.get_pool())
            .await?;
        Ok(leads)
    }

    pub async fn get_lead(&self, id: Uuid, scope: Option<Uuid>) -> Result<Option<Lead>> {
        let sql = format!(
            r#"SELECT {LEAD_COLUMNS}
               FROM leads l
               LEFT JOIN sales_team s ON s.id = l.assigned_to
               WHERE l.id = $1 AND ($2::uuid IS NULL OR l.assigned_to = $2)"#
        );
        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(scope)
            .fetch_optional(self.pool.get_pool())
            .await?;
        Ok(lead)
    }

    pub async fn create_lead(&self, new: NewLead) -> Result<Lead> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO leads (
                   lead_id, company, contact, phone, email, city, state,
                   country, source, product_interested, assigned_to, status,
                   value, remarks, inquiry_date
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
               RETURNING id"#,
        )
        .bind(&new.lead_id)
        .bind(&new.company)
        .bind(&new.contact)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.country)
        .bind(&new.source)
        .bind(&new.product_interested)
        .bind(new.assigned_to)
        .bind(new.status.as_str())
        .bind(new.value)
        .bind(&new.remarks)
        .bind(new.inquiry_date)
        .fetch_one(self.pool.get_pool())
        .await?;

        self.get_lead(id, None)
            .await?
            .ok_or_else(|| anyhow::anyhow!("lead {} vanished after insert", id))
    }

    pub async fn update_lead(&self, id: Uuid, update: LeadUpdate) -> Result<Option<Lead>> {
        let rows = sqlx::query(
            r#"UPDATE leads SET
                   company = $2, contact = $3, phone = $4, email = $5,
                   city = $6, state = $7, country = $8, source = $9,
                   product_interested = $10, assigned_to = $11, value = $12,
                   remarks = $13, inquiry_date = $14, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&update.company)
        .bind(&update.contact)
        .bind(&update.phone)
        .bind(&update.email)
        .bind(&update.city)
        .bind(&update.state)
        .bind(&update.country)
        .bind(&update.source)
        .bind(&update.product_interested)
        .bind(update.assigned_to)
        .bind(update.value)
        .bind(&update.remarks)
        .bind(update.inquiry_date)
        .execute(self.pool.get_pool())
        .await?
        .rows_affected();

        if rows == 0 {
            return Ok(None);
        }
        self.get_lead(id, None).await
    }

    pub async fn delete_lead(&self, id: Uuid) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(self.pool.get_pool())
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    /// Persist one follow-up: status change, next-follow-up reschedule and
    /// the history row are committed in a single transaction so the lead and
    /// its history can never disagree.
    pub async fn save_follow_up(
        &self,
        lead_id: Uuid,
        actor_id: Uuid,
        save: FollowUpSave,
    ) -> Result<Uuid> {
        let mut tx = self.pool.get_pool().begin().await?;

        if let Some(status) = save.status {
            sqlx::query("UPDATE leads SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(lead_id)
                .bind(status.as_str())
                .execute(&mut *tx)
                .await?;
        }

        if save.next_follow_up_date.is_some() {
            sqlx::query(
                "UPDATE leads SET next_follow_up_date = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(lead_id)
            .bind(save.next_follow_up_date)
            .execute(&mut *tx)
            .await?;
        }

        let entry_id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO follow_up_history (
                   lead_id, discussion, method, actor_id,
                   follow_up_date, next_action, next_follow_up_date
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id"#,
        )
        .bind(lead_id)
        .bind(&save.discussion)
        .bind(save.method)
        .bind(actor_id)
        .bind(save.follow_up_date)
        .bind(&save.next_action)
        .bind(save.next_follow_up_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Follow-up {} saved for lead {}", entry_id, lead_id);
        Ok(entry_id)
    }

    /// Reverse-chronological follow-up history for one lead.
    pub async fn lead_history(&self, lead_id: Uuid) -> Result<Vec<FollowUpEntry>> {
        let entries = sqlx::query_as::<_, FollowUpEntry>(
            r#"SELECT
                   h.id, h.lead_id, h.discussion, h.method,
                   h.actor_id, s.name AS actor_name,
                   h.follow_up_date, h.next_action, h.next_follow_up_date,
                   h.created_at
               FROM follow_up_history h
               LEFT JOIN sales_team s ON s.id = h.actor_id
               WHERE h.lead_id = $1
               ORDER BY h.created_at DESC"#,
        )
        .bind(lead_id)
        .fetch_all(self.pool.get_pool())
        .await?;
        Ok(entries)
    }

    /// Leads whose next follow-up falls inside [from, to], with optional
    /// assignee and status narrowing on top of the caller's scope.
    pub async fn due_follow_ups(
        &self,
        scope: Option<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
        assignee: Option<Uuid>,
        status: Option<LeadStatus>,
    ) -> Result<Vec<Lead>> {
        let sql = format!(
            r#"SELECT {LEAD_COLUMNS}
               FROM leads l
               LEFT JOIN sales_team s ON s.id = l.assigned_to
               WHERE l.next_follow_up_date BETWEEN $1 AND $2
                 AND ($3::uuid IS NULL OR l.assigned_to = $3)
                 AND ($4::uuid IS NULL OR l.assigned_to = $4)
                 AND ($5::text IS NULL OR l.status = $5)
               ORDER BY l.next_follow_up_date ASC, l.company ASC"#
        );
        let leads = sqlx::query_as::<_, Lead>(&sql)
            .bind(from)
            .bind(to)
            .bind(scope)
            .bind(assignee)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(self.pool.get_pool())
            .await?;
        Ok(leads)
    }

    // ============ TASKS ============

    pub async fn list_tasks(
        &self,
        scope: Option<Uuid>,
        search: Option<&str>,
        status: Option<ProgressStatus>,
    ) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"SELECT
                   t.id, t.task_id, t.title, t.description, t.assigned_to,
                   s.name AS assigned_to_name, t.priority, t.status,
                   t.due_date, t.created_at, t.updated_at
               FROM tasks t
               LEFT JOIN sales_team s ON s.id = t.assigned_to
               WHERE ($1::uuid IS NULL OR t.assigned_to = $1)
                 AND ($2::text IS NULL
                      OR t.title ILIKE '%' || $2 || '%'
                      OR t.description ILIKE '%' || $2 || '%')
                 AND ($3::text IS NULL OR t.status = $3)
               ORDER BY t.due_date ASC NULLS LAST, t.created_at DESC"#,
        )
        .bind(scope)
        .bind(search)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool.get_pool())
        .await?;
        Ok(tasks)
    }

    pub async fn create_task(&self, new: NewTask) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO tasks (task_id, title, description, assigned_to, priority, due_date)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(&new.task_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.assigned_to)
        .bind(new.priority.as_str())
        .bind(new.due_date)
        .fetch_one(self.pool.get_pool())
        .await?;
        Ok(id)
    }

    /// Status change scoped to the assignee (None = admin, unrestricted).
    pub async fn update_task_status(
        &self,
        id: Uuid,
        status: ProgressStatus,
        scope: Option<Uuid>,
    ) -> Result<bool> {
        let rows = sqlx::query(
            r#"UPDATE tasks SET status = $2, updated_at = NOW()
               WHERE id = $1 AND ($3::uuid IS NULL OR assigned_to = $3)"#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(scope)
        .execute(self.pool.get_pool())
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    pub async fn delete_task(&self, id: Uuid, scope: Option<Uuid>) -> Result<bool> {
        let rows = sqlx::query(
            "DELETE FROM tasks WHERE id = $1 AND ($2::uuid IS NULL OR assigned_to = $2)",
        )
        .bind(id)
        .bind(scope)
        .execute(self.pool.get_pool())
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    // ============ NOTES ============

    pub async fn list_notes(
        &self,
        search: Option<&str>,
        status: Option<ProgressStatus>,
    ) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"SELECT
                   n.id, n.title, n.content, n.status, n.lead_id,
                   l.company AS lead_company, n.created_by,
                   s.name AS created_by_name, n.created_at, n.updated_at
               FROM notes n
               LEFT JOIN leads l ON l.id = n.lead_id
               LEFT JOIN sales_team s ON s.id = n.created_by
               WHERE ($1::text IS NULL
                      OR n.title ILIKE '%' || $1 || '%'
                      OR n.content ILIKE '%' || $1 || '%'
                      OR l.company ILIKE '%' || $1 || '%')
                 AND ($2::text IS NULL OR n.status = $2)
               ORDER BY n.created_at DESC"#,
        )
        .bind(search)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool.get_pool())
        .await?;
        Ok(notes)
    }

    /// Per-status tab counts for the notes view.
    pub async fn note_status_counts(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM notes GROUP BY status",
        )
        .fetch_all(self.pool.get_pool())
        .await?;
        Ok(rows)
    }

    pub async fn create_note(&self, new: NewNote) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO notes (title, content, status, lead_id, created_by)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id"#,
        )
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.status.as_str())
        .bind(new.lead_id)
        .bind(new.created_by)
        .fetch_one(self.pool.get_pool())
        .await?;
        Ok(id)
    }

    /// Status change scoped to the author (None = admin, unrestricted).
    pub async fn update_note_status(
        &self,
        id: Uuid,
        status: ProgressStatus,
        scope: Option<Uuid>,
    ) -> Result<bool> {
        let rows = sqlx::query(
            r#"UPDATE notes SET status = $2, updated_at = NOW()
               WHERE id = $1 AND ($3::uuid IS NULL OR created_by = $3)"#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(scope)
        .execute(self.pool.get_pool())
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    pub async fn delete_note(&self, id: Uuid, scope: Option<Uuid>) -> Result<bool> {
        let rows = sqlx::query(
            "DELETE FROM notes WHERE id = $1 AND ($2::uuid IS NULL OR created_by = $2)",
        )
        .bind(id)
        .bind(scope)
        .execute(self.pool.get_pool())
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    // ============ SALES TEAM ============

    pub async fn list_team(&self) -> Result<Vec<SalesPerson>> {
        let team = sqlx::query_as::<_, SalesPerson>(
            "SELECT * FROM sales_team ORDER BY name ASC",
        )
        .fetch_all(self.pool.get_pool())
        .await?;
        Ok(team)
    }

    pub async fn list_active_team(&self) -> Result<Vec<SalesPerson>> {
        let team = sqlx::query_as::<_, SalesPerson>(
            "SELECT * FROM sales_team WHERE status = 'Active' ORDER BY name ASC",
        )
        .fetch_all(self.pool.get_pool())
        .await?;
        Ok(team)
    }

    pub async fn find_member_by_email(&self, email: &str) -> Result<Option<SalesPerson>> {
        let member = sqlx::query_as::<_, SalesPerson>(
            "SELECT * FROM sales_team WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(self.pool.get_pool())
        .await?;
        Ok(member)
    }

    /// Lead and conversion counts per member, computed at read time.
    pub async fn team_stats(&self) -> Result<Vec<TeamMemberStats>> {
        let stats = sqlx::query_as::<_, TeamMemberStats>(
            r#"SELECT
                   s.id AS person_id,
                   COUNT(l.id) AS leads,
                   COUNT(l.id) FILTER (WHERE l.status = 'Converted') AS conversions
               FROM sales_team s
               LEFT JOIN leads l ON l.assigned_to = s.id
               GROUP BY s.id"#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;
        Ok(stats)
    }

    pub async fn create_member(&self, new: NewMember) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO sales_team (person_id, name, email, phone, password_hash, role, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id"#,
        )
        .bind(&new.person_id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.password_hash)
        .bind(new.role)
        .bind(new.status)
        .fetch_one(self.pool.get_pool())
        .await?;
        Ok(id)
    }

    pub async fn update_member(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        phone: Option<&str>,
        status: StaffStatus,
    ) -> Result<bool> {
        let rows = sqlx::query(
            r#"UPDATE sales_team
               SET name = $2, email = $3, phone = $4, status = $5, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(status)
        .execute(self.pool.get_pool())
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    pub async fn update_member_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let rows = sqlx::query(
            "UPDATE sales_team SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool.get_pool())
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    pub async fn delete_member(&self, id: Uuid) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM sales_team WHERE id = $1")
            .bind(id)
            .execute(self.pool.get_pool())
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    pub async fn team_is_empty(&self) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales_team")
            .fetch_one(self.pool.get_pool())
            .await?;
        Ok(count == 0)
    }

    // ============ CLIENTS ============

    pub async fn list_clients(&self, search: Option<&str>) -> Result<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            r#"SELECT * FROM clients
               WHERE ($1::text IS NULL
                      OR company ILIKE '%' || $1 || '%'
                      OR pincode ILIKE '%' || $1 || '%'
                      OR state ILIKE '%' || $1 || '%'
                      OR main_area ILIKE '%' || $1 || '%'
                      OR EXISTS (
                          SELECT 1 FROM unnest(sub_areas) AS area
                          WHERE area ILIKE '%' || $1 || '%'
                      ))
               ORDER BY created_at DESC"#,
        )
        .bind(search)
        .fetch_all(self.pool.get_pool())
        .await?;
        Ok(clients)
    }

    /// Next counter for year-scoped client ids (`CLIENT-YYYY-NNNN`).
    pub async fn next_client_number(&self, year: i32) -> Result<i64> {
        let prefix = format!("CLIENT-{}-%", year);
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients WHERE id LIKE $1")
            .bind(&prefix)
            .fetch_one(self.pool.get_pool())
            .await?;
        Ok(count + 1)
    }

    pub async fn insert_client(&self, id: &str, draft: &ClientDraft) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO clients (id, company, pincode, state, main_area, sub_areas)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(id)
        .bind(&draft.company)
        .bind(&draft.pincode)
        .bind(&draft.state)
        .bind(&draft.main_area)
        .bind(&draft.sub_areas)
        .execute(self.pool.get_pool())
        .await?;
        Ok(())
    }

    pub async fn update_client(&self, id: &str, draft: &ClientDraft) -> Result<bool> {
        let rows = sqlx::query(
            r#"UPDATE clients
               SET company = $2, pincode = $3, state = $4, main_area = $5,
                   sub_areas = $6, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&draft.company)
        .bind(&draft.pincode)
        .bind(&draft.state)
        .bind(&draft.main_area)
        .bind(&draft.sub_areas)
        .execute(self.pool.get_pool())
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    pub async fn update_client_sub_areas(&self, id: &str, sub_areas: &[String]) -> Result<bool> {
        let rows = sqlx::query(
            "UPDATE clients SET sub_areas = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(sub_areas)
        .execute(self.pool.get_pool())
        .await?
        .rows_affected();
        Ok(rows > 0)
    }

    pub async fn delete_client(&self, id: &str) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(self.pool.get_pool())
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}
