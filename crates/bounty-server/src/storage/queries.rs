//! Database queries for the settings row, bounties and task templates.

use bounty_core::db::{to_json_column, unix_timestamp};
use bounty_core::model::{AppMeta, Bounty, TaskTemplate};

use super::db::{Database, DatabaseError};
use super::models::{AppMetaRow, BountyRow, TaskTemplateRow};

impl Database {
    // =========================================================================
    // Settings row
    // =========================================================================

    /// Load the singleton settings row, if it has been created.
    pub async fn load_meta(&self) -> Result<Option<AppMeta>, DatabaseError> {
        sqlx::query_as::<_, AppMetaRow>("SELECT * FROM app_meta WHERE id = 1")
            .fetch_optional(self.pool())
            .await?
            .map(AppMeta::try_from)
            .transpose()
    }

    /// Create or replace the singleton settings row.
    pub async fn save_meta(&self, meta: &AppMeta) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO app_meta (id, role, default_role, current_worker_id, owner_financials,
                pending_payouts, task_reminders, worker_financial_summary, worker_transactions,
                ui, updated_at)
             VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                role = excluded.role,
                default_role = excluded.default_role,
                current_worker_id = excluded.current_worker_id,
                owner_financials = excluded.owner_financials,
                pending_payouts = excluded.pending_payouts,
                task_reminders = excluded.task_reminders,
                worker_financial_summary = excluded.worker_financial_summary,
                worker_transactions = excluded.worker_transactions,
                ui = excluded.ui,
                updated_at = excluded.updated_at",
        )
        .bind(meta.role.as_str())
        .bind(meta.default_role.map(|r| r.as_str()))
        .bind(&meta.current_worker_id)
        .bind(to_json_column(&meta.owner_financials)?)
        .bind(to_json_column(&meta.pending_payouts)?)
        .bind(to_json_column(&meta.task_reminders)?)
        .bind(to_json_column(&meta.worker_financial_summary)?)
        .bind(to_json_column(&meta.worker_transactions)?)
        .bind(to_json_column(&meta.ui)?)
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    // =========================================================================
    // Bounty queries
    // =========================================================================

    /// List bounties in board order.
    pub async fn list_bounties(&self) -> Result<Vec<Bounty>, DatabaseError> {
        sqlx::query_as::<_, BountyRow>("SELECT * FROM bounties ORDER BY order_index ASC, id ASC")
            .fetch_all(self.pool())
            .await?
            .into_iter()
            .map(Bounty::try_from)
            .collect()
    }

    /// Get a bounty by ID.
    pub async fn get_bounty(&self, id: &str) -> Result<Bounty, DatabaseError> {
        let row = sqlx::query_as::<_, BountyRow>("SELECT * FROM bounties WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Bounty {id}")))?;
        Bounty::try_from(row)
    }

    /// Insert a new bounty.
    pub async fn insert_bounty(&self, bounty: &Bounty) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO bounties (id, title, property_id, owner_lane, price, kind, description,
                is_new, boosted, worker_status, accepted_by_worker_id, timer_seconds_remaining,
                proof_photos_uploaded, tenant_bridge_enabled, recursive_scheduling_enabled,
                recurrence_cadence, deadline_at, image_urls, order_index)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&bounty.id)
        .bind(&bounty.title)
        .bind(&bounty.property_id)
        .bind(bounty.owner_lane.as_str())
        .bind(bounty.price)
        .bind(&bounty.kind)
        .bind(&bounty.description)
        .bind(i64::from(bounty.is_new))
        .bind(i64::from(bounty.boosted))
        .bind(bounty.worker_status.as_str())
        .bind(&bounty.accepted_by_worker_id)
        .bind(i64::from(bounty.timer_seconds_remaining))
        .bind(i64::from(bounty.proof_photos_uploaded))
        .bind(i64::from(bounty.tenant_bridge_enabled))
        .bind(i64::from(bounty.recursive_scheduling_enabled))
        .bind(bounty.recurrence_cadence.map(|c| c.as_str()))
        .bind(bounty.deadline_at.map(|d| d.to_rfc3339()))
        .bind(to_json_column(&bounty.image_urls)?)
        .bind(bounty.order_index)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Write every mutable field of an existing bounty.
    pub async fn update_bounty(&self, bounty: &Bounty) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE bounties SET title = ?, property_id = ?, owner_lane = ?, price = ?, kind = ?,
                description = ?, is_new = ?, boosted = ?, worker_status = ?,
                accepted_by_worker_id = ?, timer_seconds_remaining = ?,
                proof_photos_uploaded = ?, tenant_bridge_enabled = ?,
                recursive_scheduling_enabled = ?, recurrence_cadence = ?, deadline_at = ?,
                image_urls = ?, order_index = ?
             WHERE id = ?",
        )
        .bind(&bounty.title)
        .bind(&bounty.property_id)
        .bind(bounty.owner_lane.as_str())
        .bind(bounty.price)
        .bind(&bounty.kind)
        .bind(&bounty.description)
        .bind(i64::from(bounty.is_new))
        .bind(i64::from(bounty.boosted))
        .bind(bounty.worker_status.as_str())
        .bind(&bounty.accepted_by_worker_id)
        .bind(i64::from(bounty.timer_seconds_remaining))
        .bind(i64::from(bounty.proof_photos_uploaded))
        .bind(i64::from(bounty.tenant_bridge_enabled))
        .bind(i64::from(bounty.recursive_scheduling_enabled))
        .bind(bounty.recurrence_cadence.map(|c| c.as_str()))
        .bind(bounty.deadline_at.map(|d| d.to_rfc3339()))
        .bind(to_json_column(&bounty.image_urls)?)
        .bind(bounty.order_index)
        .bind(&bounty.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Bounty {}", bounty.id)));
        }
        Ok(())
    }

    /// Delete a bounty. Returns whether a row was removed.
    pub async fn delete_bounty(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM bounties WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Task template queries
    // =========================================================================

    /// List task templates in display order.
    pub async fn list_task_templates(&self) -> Result<Vec<TaskTemplate>, DatabaseError> {
        let rows = sqlx::query_as::<_, TaskTemplateRow>(
            "SELECT * FROM task_templates ORDER BY order_index ASC, id ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(TaskTemplate::from).collect())
    }

    /// Insert a task template.
    pub async fn insert_task_template(&self, template: &TaskTemplate) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO task_templates (id, label, title, description, price, order_index)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&template.id)
        .bind(&template.label)
        .bind(&template.title)
        .bind(&template.description)
        .bind(template.price)
        .bind(template.order_index)
        .execute(self.pool())
        .await?;

        Ok(())
    }
}
