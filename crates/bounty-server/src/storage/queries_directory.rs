//! Database queries for workers, properties and the trusted-worker directory.

use bounty_core::db::unix_timestamp;
use bounty_core::model::{GlobalTrustedWorker, SignedInUser, Worker};

use super::db::{Database, DatabaseError};
use super::models::{
    GlobalTrustedWorkerRow, PropertyRow, SignedInUserRow, TrustedLinkRow, WorkerRow,
};
use crate::store::{PropertyRecord, TrustedLink};

impl Database {
    // =========================================================================
    // Worker queries
    // =========================================================================

    pub async fn list_workers(&self) -> Result<Vec<Worker>, DatabaseError> {
        let rows =
            sqlx::query_as::<_, WorkerRow>("SELECT * FROM workers ORDER BY order_index ASC, id ASC")
                .fetch_all(self.pool())
                .await?;

        Ok(rows.into_iter().map(Worker::from).collect())
    }

    pub async fn insert_worker(&self, worker: &Worker) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO workers (id, name, initials, email, reputation, order_index)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&worker.id)
        .bind(&worker.name)
        .bind(&worker.initials)
        .bind(&worker.email)
        .bind(worker.reputation)
        .bind(worker.order_index)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    // =========================================================================
    // Property queries
    // =========================================================================

    pub async fn list_properties(&self) -> Result<Vec<PropertyRecord>, DatabaseError> {
        let rows = sqlx::query_as::<_, PropertyRow>(
            "SELECT * FROM properties ORDER BY order_index ASC, id ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(PropertyRecord::from).collect())
    }

    /// Get a property by ID.
    pub async fn get_property(&self, id: &str) -> Result<PropertyRecord, DatabaseError> {
        sqlx::query_as::<_, PropertyRow>("SELECT * FROM properties WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .map(PropertyRecord::from)
            .ok_or_else(|| DatabaseError::NotFound(format!("Property {id}")))
    }

    pub async fn insert_property(&self, property: &PropertyRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO properties (id, address, city, zip_code, gate_code, instructions, image,
                lat, lng, order_index)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&property.id)
        .bind(&property.address)
        .bind(&property.city)
        .bind(&property.zip_code)
        .bind(&property.gate_code)
        .bind(&property.instructions)
        .bind(&property.image)
        .bind(property.location.map(|l| l.lat))
        .bind(property.location.map(|l| l.lng))
        .bind(property.order_index)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn update_property(&self, property: &PropertyRecord) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE properties SET address = ?, city = ?, zip_code = ?, gate_code = ?,
                instructions = ?, image = ?, lat = ?, lng = ?, order_index = ?
             WHERE id = ?",
        )
        .bind(&property.address)
        .bind(&property.city)
        .bind(&property.zip_code)
        .bind(&property.gate_code)
        .bind(&property.instructions)
        .bind(&property.image)
        .bind(property.location.map(|l| l.lat))
        .bind(property.location.map(|l| l.lng))
        .bind(property.order_index)
        .bind(&property.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Property {}", property.id)));
        }
        Ok(())
    }

    // =========================================================================
    // Trusted-worker link queries
    // =========================================================================

    pub async fn list_trusted_links(&self) -> Result<Vec<TrustedLink>, DatabaseError> {
        let rows = sqlx::query_as::<_, TrustedLinkRow>(
            "SELECT * FROM property_trusted_workers ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TrustedLink {
                property_id: row.property_id,
                worker_id: row.worker_id,
            })
            .collect())
    }

    /// Worker IDs trusted at one property, in link order.
    pub async fn trusted_worker_ids(&self, property_id: &str) -> Result<Vec<String>, DatabaseError> {
        let ids: Vec<(String,)> = sqlx::query_as(
            "SELECT worker_id FROM property_trusted_workers WHERE property_id = ?
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(property_id)
        .fetch_all(self.pool())
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Link a worker to a property. Linking twice is a no-op.
    pub async fn link_trusted_worker(
        &self,
        property_id: &str,
        worker_id: &str,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT OR IGNORE INTO property_trusted_workers (property_id, worker_id, created_at)
             VALUES (?, ?, ?)",
        )
        .bind(property_id)
        .bind(worker_id)
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    // =========================================================================
    // Global trusted worker queries
    // =========================================================================

    pub async fn list_global_trusted_workers(
        &self,
    ) -> Result<Vec<GlobalTrustedWorker>, DatabaseError> {
        let rows = sqlx::query_as::<_, GlobalTrustedWorkerRow>(
            "SELECT * FROM global_trusted_workers ORDER BY order_index ASC, id ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(GlobalTrustedWorker::from).collect())
    }

    pub async fn insert_global_trusted_worker(
        &self,
        worker: &GlobalTrustedWorker,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO global_trusted_workers (id, name, email, initials, order_index)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&worker.id)
        .bind(&worker.name)
        .bind(&worker.email)
        .bind(&worker.initials)
        .bind(worker.order_index)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn delete_global_trusted_worker(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM global_trusted_workers WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Signed-in user queries
    // =========================================================================

    /// Signed-in users, most recently seen first.
    pub async fn list_signed_in_users(&self) -> Result<Vec<SignedInUser>, DatabaseError> {
        let rows = sqlx::query_as::<_, SignedInUserRow>(
            "SELECT * FROM signed_in_users ORDER BY updated_at DESC, email ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(SignedInUser::from).collect())
    }

    /// Insert or rename a signed-in user keyed by email.
    ///
    /// An `updated_at` of zero is replaced with the current time.
    pub async fn upsert_signed_in_user(&self, user: &SignedInUser) -> Result<(), DatabaseError> {
        let updated_at = if user.updated_at == 0 {
            unix_timestamp()
        } else {
            user.updated_at
        };

        sqlx::query(
            "INSERT INTO signed_in_users (email, name, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET name = excluded.name, updated_at = excluded.updated_at",
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(updated_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Cheap round trip used by health checks.
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }
}
