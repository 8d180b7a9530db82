//! `Store` implementation backed by the `SQLite` database.

use async_trait::async_trait;

use bounty_core::db::DatabaseError;
use bounty_core::model::{AppMeta, Bounty, GlobalTrustedWorker, SignedInUser, TaskTemplate, Worker};

use super::{PropertyRecord, Store, TrustedLink};
use crate::storage::Database;

#[async_trait]
impl Store for Database {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Self::ping(self).await
    }

    async fn load_meta(&self) -> Result<Option<AppMeta>, DatabaseError> {
        Self::load_meta(self).await
    }

    async fn save_meta(&self, meta: &AppMeta) -> Result<(), DatabaseError> {
        Self::save_meta(self, meta).await
    }

    async fn list_workers(&self) -> Result<Vec<Worker>, DatabaseError> {
        Self::list_workers(self).await
    }

    async fn insert_worker(&self, worker: &Worker) -> Result<(), DatabaseError> {
        Self::insert_worker(self, worker).await
    }

    async fn list_properties(&self) -> Result<Vec<PropertyRecord>, DatabaseError> {
        Self::list_properties(self).await
    }

    async fn get_property(&self, id: &str) -> Result<PropertyRecord, DatabaseError> {
        Self::get_property(self, id).await
    }

    async fn insert_property(&self, property: &PropertyRecord) -> Result<(), DatabaseError> {
        Self::insert_property(self, property).await
    }

    async fn update_property(&self, property: &PropertyRecord) -> Result<(), DatabaseError> {
        Self::update_property(self, property).await
    }

    async fn list_trusted_links(&self) -> Result<Vec<TrustedLink>, DatabaseError> {
        Self::list_trusted_links(self).await
    }

    async fn trusted_worker_ids(&self, property_id: &str) -> Result<Vec<String>, DatabaseError> {
        Self::trusted_worker_ids(self, property_id).await
    }

    async fn link_trusted_worker(
        &self,
        property_id: &str,
        worker_id: &str,
    ) -> Result<(), DatabaseError> {
        Self::link_trusted_worker(self, property_id, worker_id).await
    }

    async fn list_bounties(&self) -> Result<Vec<Bounty>, DatabaseError> {
        Self::list_bounties(self).await
    }

    async fn get_bounty(&self, id: &str) -> Result<Bounty, DatabaseError> {
        Self::get_bounty(self, id).await
    }

    async fn insert_bounty(&self, bounty: &Bounty) -> Result<(), DatabaseError> {
        Self::insert_bounty(self, bounty).await
    }

    async fn update_bounty(&self, bounty: &Bounty) -> Result<(), DatabaseError> {
        Self::update_bounty(self, bounty).await
    }

    async fn delete_bounty(&self, id: &str) -> Result<bool, DatabaseError> {
        Self::delete_bounty(self, id).await
    }

    async fn list_task_templates(&self) -> Result<Vec<TaskTemplate>, DatabaseError> {
        Self::list_task_templates(self).await
    }

    async fn insert_task_template(&self, template: &TaskTemplate) -> Result<(), DatabaseError> {
        Self::insert_task_template(self, template).await
    }

    async fn list_global_trusted_workers(
        &self,
    ) -> Result<Vec<GlobalTrustedWorker>, DatabaseError> {
        Self::list_global_trusted_workers(self).await
    }

    async fn insert_global_trusted_worker(
        &self,
        worker: &GlobalTrustedWorker,
    ) -> Result<(), DatabaseError> {
        Self::insert_global_trusted_worker(self, worker).await
    }

    async fn delete_global_trusted_worker(&self, id: &str) -> Result<bool, DatabaseError> {
        Self::delete_global_trusted_worker(self, id).await
    }

    async fn list_signed_in_users(&self) -> Result<Vec<SignedInUser>, DatabaseError> {
        Self::list_signed_in_users(self).await
    }

    async fn upsert_signed_in_user(&self, user: &SignedInUser) -> Result<(), DatabaseError> {
        Self::upsert_signed_in_user(self, user).await
    }
}
