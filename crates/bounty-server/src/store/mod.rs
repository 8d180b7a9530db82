//! Storage abstraction for the marketplace.
//!
//! `Store` is a plain record mapper: one method per entity per read/write
//! path and no business rules. Lifecycle decisions live in
//! [`bounty_core::lifecycle`] and are applied by the service layer.
//!
//! Two backends implement it: [`crate::storage::Database`] (`SQLite`) and
//! [`MemoryStore`].

mod memory;
mod sqlite;

use async_trait::async_trait;

use bounty_core::db::DatabaseError;
use bounty_core::model::{
    AppMeta, Bounty, GeoPoint, GlobalTrustedWorker, Property, SignedInUser, TaskTemplate,
    TrustedWorkerRef, Worker,
};

pub use memory::MemoryStore;

/// A property row without its derived trusted-worker list.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub id: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub gate_code: String,
    pub instructions: String,
    pub image: String,
    pub location: Option<GeoPoint>,
    pub order_index: i64,
}

impl PropertyRecord {
    /// Attach the trusted workers resolved for this property.
    pub fn into_property(self, whitelisted_workers: Vec<TrustedWorkerRef>) -> Property {
        Property {
            id: self.id,
            address: self.address,
            city: self.city,
            zip_code: self.zip_code,
            gate_code: self.gate_code,
            instructions: self.instructions,
            image: self.image,
            whitelisted_workers,
            location: self.location,
        }
    }
}

/// Join row between a property and a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedLink {
    pub property_id: String,
    pub worker_id: String,
}

/// Persistence operations used by the marketplace service.
///
/// List methods return rows in ascending `order_index`, except signed-in
/// users which come most recently updated first. Single-row lookups fail
/// with [`DatabaseError::NotFound`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by `/health`.
    async fn ping(&self) -> Result<(), DatabaseError>;

    // Settings row
    async fn load_meta(&self) -> Result<Option<AppMeta>, DatabaseError>;
    async fn save_meta(&self, meta: &AppMeta) -> Result<(), DatabaseError>;

    // Workers
    async fn list_workers(&self) -> Result<Vec<Worker>, DatabaseError>;
    async fn insert_worker(&self, worker: &Worker) -> Result<(), DatabaseError>;

    // Properties and their trusted workers
    async fn list_properties(&self) -> Result<Vec<PropertyRecord>, DatabaseError>;
    async fn get_property(&self, id: &str) -> Result<PropertyRecord, DatabaseError>;
    async fn insert_property(&self, property: &PropertyRecord) -> Result<(), DatabaseError>;
    async fn update_property(&self, property: &PropertyRecord) -> Result<(), DatabaseError>;
    async fn list_trusted_links(&self) -> Result<Vec<TrustedLink>, DatabaseError>;
    async fn trusted_worker_ids(&self, property_id: &str) -> Result<Vec<String>, DatabaseError>;
    async fn link_trusted_worker(
        &self,
        property_id: &str,
        worker_id: &str,
    ) -> Result<(), DatabaseError>;

    // Bounties
    async fn list_bounties(&self) -> Result<Vec<Bounty>, DatabaseError>;
    async fn get_bounty(&self, id: &str) -> Result<Bounty, DatabaseError>;
    async fn insert_bounty(&self, bounty: &Bounty) -> Result<(), DatabaseError>;
    async fn update_bounty(&self, bounty: &Bounty) -> Result<(), DatabaseError>;
    /// Returns whether a row was removed.
    async fn delete_bounty(&self, id: &str) -> Result<bool, DatabaseError>;

    // Task templates
    async fn list_task_templates(&self) -> Result<Vec<TaskTemplate>, DatabaseError>;
    async fn insert_task_template(&self, template: &TaskTemplate) -> Result<(), DatabaseError>;

    // Global trusted workers
    async fn list_global_trusted_workers(&self)
    -> Result<Vec<GlobalTrustedWorker>, DatabaseError>;
    async fn insert_global_trusted_worker(
        &self,
        worker: &GlobalTrustedWorker,
    ) -> Result<(), DatabaseError>;
    async fn delete_global_trusted_worker(&self, id: &str) -> Result<bool, DatabaseError>;

    // Signed-in users
    async fn list_signed_in_users(&self) -> Result<Vec<SignedInUser>, DatabaseError>;
    async fn upsert_signed_in_user(&self, user: &SignedInUser) -> Result<(), DatabaseError>;
}

/// Order index that puts a new row above every existing one.
pub fn top_order_index(existing: impl IntoIterator<Item = i64>) -> i64 {
    existing.into_iter().min().map_or(0, |min| min - 1)
}

/// Order index that puts a new row below every existing one.
pub fn bottom_order_index(existing: impl IntoIterator<Item = i64>) -> i64 {
    existing.into_iter().max().map_or(0, |max| max + 1)
}
