//! Marketplace service.
//!
//! Applies the lifecycle rules from [`bounty_core::lifecycle`] through a
//! [`Store`]. Every mutation takes the service write lock, so within one
//! process a tick never interleaves with a lane move or an accept. Across
//! processes sharing a database the last write still wins.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use bounty_core::db::{DatabaseError, unix_timestamp};
use bounty_core::directory::{email_key, to_person};
use bounty_core::lifecycle;
use bounty_core::model::{
    AddTrustedWorkerInput, AppMeta, Bounty, CreateBountyInput, CreatePropertyInput,
    CreateTaskTemplateInput, GlobalTrustedWorker, Lane, PersonBasicInfo, Property, Role,
    SignedInUser, Snapshot, TaskTemplate, TrustedWorkerRef, UiSettings, UpdatePropertyInput,
    Worker, new_id,
};

use crate::store::{PropertyRecord, Store, bottom_order_index, top_order_index};

/// Gate code stored when the owner leaves it blank.
pub const NO_GATE: &str = "No gate";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(DatabaseError),
}

impl From<DatabaseError> for ServiceError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(what),
            other => Self::Storage(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct MarketplaceService {
    store: Arc<dyn Store>,
    ui: UiSettings,
    write_lock: Mutex<()>,
}

impl MarketplaceService {
    pub fn new(store: Arc<dyn Store>, ui: UiSettings) -> Self {
        Self {
            store,
            ui,
            write_lock: Mutex::new(()),
        }
    }

    /// Window a worker has after accepting before the no-show timer runs out.
    pub const fn no_show_timer_seconds(&self) -> u32 {
        self.ui.no_show_timer_seconds
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    // =========================================================================
    // Snapshot and settings
    // =========================================================================

    /// Load the settings row for a reader.
    ///
    /// Creating the row or back-filling `default_role` is a write, so it
    /// happens under the write lock against a fresh read.
    async fn ensure_meta(&self) -> ServiceResult<AppMeta> {
        if let Some(meta) = self.store.load_meta().await?
            && meta.default_role.is_some()
        {
            return Ok(meta);
        }
        let _guard = self.write_lock.lock().await;
        self.ensure_meta_locked().await
    }

    /// Load the settings row, creating it or back-filling `default_role`.
    /// Callers must hold the write lock.
    async fn ensure_meta_locked(&self) -> ServiceResult<AppMeta> {
        match self.store.load_meta().await? {
            Some(mut meta) => {
                if meta.default_role.is_none() {
                    meta.default_role = Some(Role::default());
                    self.store.save_meta(&meta).await?;
                    debug!("Back-filled default role");
                }
                Ok(meta)
            }
            None => {
                let meta = AppMeta::with_ui(self.ui.clone());
                self.store.save_meta(&meta).await?;
                info!("Created settings row");
                Ok(meta)
            }
        }
    }

    /// The full state document.
    pub async fn snapshot(&self) -> ServiceResult<Snapshot> {
        let meta = self.ensure_meta().await?;
        let workers = self.store.list_workers().await?;
        let properties = self.store.list_properties().await?;
        let links = self.store.list_trusted_links().await?;
        let bounties = self.store.list_bounties().await?;
        let task_templates = self.store.list_task_templates().await?;
        let signed_in = self.store.list_signed_in_users().await?;
        let global = self.store.list_global_trusted_workers().await?;

        let workers_by_id: HashMap<&str, &Worker> =
            workers.iter().map(|w| (w.id.as_str(), w)).collect();
        let mut trusted_by_property: HashMap<String, Vec<TrustedWorkerRef>> = HashMap::new();
        for link in links {
            // Links to deleted workers are skipped.
            if let Some(worker) = workers_by_id.get(link.worker_id.as_str()) {
                trusted_by_property
                    .entry(link.property_id)
                    .or_default()
                    .push(trusted_ref(worker));
            }
        }

        let properties = properties
            .into_iter()
            .map(|record| {
                let trusted = trusted_by_property.remove(&record.id).unwrap_or_default();
                record.into_property(trusted)
            })
            .collect();

        Ok(Snapshot {
            role: meta.role,
            default_role: meta.default_role_or_owner(),
            current_worker_id: meta.current_worker_id,
            signed_in_users: signed_in.iter().map(signed_in_person).collect(),
            global_trusted_workers: global.iter().map(global_person).collect(),
            workers,
            properties,
            bounties,
            task_templates,
            owner_financials: meta.owner_financials,
            pending_payouts: meta.pending_payouts,
            task_reminders: meta.task_reminders,
            worker_financial_summary: meta.worker_financial_summary,
            worker_transactions: meta.worker_transactions,
            ui: meta.ui,
        })
    }

    pub async fn set_role(&self, role: Role) -> ServiceResult<Role> {
        let _guard = self.write_lock.lock().await;
        let mut meta = self.ensure_meta_locked().await?;
        meta.role = role;
        self.store.save_meta(&meta).await?;
        info!(%role, "Role changed");
        Ok(role)
    }

    pub async fn set_default_role(&self, role: Role) -> ServiceResult<Role> {
        let _guard = self.write_lock.lock().await;
        let mut meta = self.ensure_meta_locked().await?;
        meta.default_role = Some(role);
        self.store.save_meta(&meta).await?;
        info!(%role, "Default role changed");
        Ok(role)
    }

    // =========================================================================
    // Directory
    // =========================================================================

    /// Record a sign-in. Blank emails are ignored and return `None`.
    pub async fn upsert_signed_in_user(
        &self,
        name: &str,
        email: &str,
    ) -> ServiceResult<Option<PersonBasicInfo>> {
        let email = email_key(email);
        if email.is_empty() {
            return Ok(None);
        }
        let name = match name.trim() {
            "" => email.clone(),
            n => n.to_string(),
        };

        let _guard = self.write_lock.lock().await;
        let user = SignedInUser {
            email,
            name,
            updated_at: unix_timestamp(),
        };
        self.store.upsert_signed_in_user(&user).await?;
        debug!(email = %user.email, "Signed-in user recorded");
        Ok(Some(signed_in_person(&user)))
    }

    async fn global_directory(&self) -> ServiceResult<Vec<PersonBasicInfo>> {
        let rows = self.store.list_global_trusted_workers().await?;
        Ok(rows.iter().map(global_person).collect())
    }

    /// Add workers to the global trusted list, skipping known emails.
    ///
    /// Returns the whole list afterwards. Each new entry goes on top.
    pub async fn add_global_trusted_workers(
        &self,
        inputs: Vec<AddTrustedWorkerInput>,
    ) -> ServiceResult<Vec<PersonBasicInfo>> {
        let _guard = self.write_lock.lock().await;
        let existing = self.store.list_global_trusted_workers().await?;
        let mut known: HashSet<String> = existing.iter().map(|w| email_key(&w.email)).collect();
        let mut next_index = top_order_index(existing.iter().map(|w| w.order_index));

        let mut added = 0usize;
        for input in inputs {
            let key = email_key(&input.email);
            if key.is_empty() || !known.insert(key.clone()) {
                continue;
            }
            let person = to_person("", &input.name, &key, Some(input.initials.as_str()));
            let worker = GlobalTrustedWorker {
                id: new_id("gtw"),
                name: person.name,
                email: person.email,
                initials: person.initials,
                order_index: next_index,
            };
            self.store.insert_global_trusted_worker(&worker).await?;
            next_index -= 1;
            added += 1;
        }

        info!(added, "Global trusted workers added");
        self.global_directory().await
    }

    /// Remove one global trusted worker. Unknown IDs are ignored.
    pub async fn remove_global_trusted_worker(
        &self,
        id: &str,
    ) -> ServiceResult<Vec<PersonBasicInfo>> {
        let _guard = self.write_lock.lock().await;
        let removed = self.store.delete_global_trusted_worker(id).await?;
        debug!(id, removed, "Global trusted worker removal");
        self.global_directory().await
    }

    // =========================================================================
    // Properties
    // =========================================================================

    async fn property_with_trusted(&self, record: PropertyRecord) -> ServiceResult<Property> {
        let ids = self.store.trusted_worker_ids(&record.id).await?;
        let workers = self.store.list_workers().await?;
        let trusted = ids
            .iter()
            .filter_map(|id| workers.iter().find(|w| &w.id == id))
            .map(trusted_ref)
            .collect();
        Ok(record.into_property(trusted))
    }

    pub async fn add_property(&self, input: CreatePropertyInput) -> ServiceResult<Property> {
        let _guard = self.write_lock.lock().await;
        let existing = self.store.list_properties().await?;
        let gate_code = match input.gate_code.trim() {
            "" => NO_GATE.to_string(),
            code => code.to_string(),
        };

        let record = PropertyRecord {
            id: new_id("p"),
            address: input.address,
            city: input.city,
            zip_code: input.zip_code,
            gate_code,
            instructions: input.instructions,
            image: self.ui.property_placeholder_image.clone(),
            location: input.location,
            order_index: top_order_index(existing.iter().map(|p| p.order_index)),
        };
        self.store.insert_property(&record).await?;
        info!(property_id = %record.id, "Property added");
        Ok(record.into_property(Vec::new()))
    }

    pub async fn update_property(
        &self,
        id: &str,
        input: UpdatePropertyInput,
    ) -> ServiceResult<Property> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.store.get_property(id).await?;
        record.address = input.address;
        record.city = input.city;
        record.zip_code = input.zip_code;
        record.gate_code = input.gate_code;
        self.store.update_property(&record).await?;
        self.property_with_trusted(record).await
    }

    pub async fn update_property_instructions(
        &self,
        id: &str,
        instructions: String,
    ) -> ServiceResult<Property> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.store.get_property(id).await?;
        record.instructions = instructions;
        self.store.update_property(&record).await?;
        self.property_with_trusted(record).await
    }

    /// Trust workers at one property.
    ///
    /// Emails already trusted there are skipped. An existing worker with the
    /// same email is linked instead of creating a second worker row.
    pub async fn add_trusted_workers(
        &self,
        property_id: &str,
        inputs: Vec<AddTrustedWorkerInput>,
    ) -> ServiceResult<Property> {
        let _guard = self.write_lock.lock().await;
        let record = self.store.get_property(property_id).await?;
        let mut workers = self.store.list_workers().await?;
        let trusted_ids: HashSet<String> = self
            .store
            .trusted_worker_ids(property_id)
            .await?
            .into_iter()
            .collect();
        let mut trusted_emails: HashSet<String> = workers
            .iter()
            .filter(|w| trusted_ids.contains(&w.id))
            .map(|w| email_key(&w.email))
            .collect();
        let mut next_index = bottom_order_index(workers.iter().map(|w| w.order_index));

        for input in inputs {
            let key = email_key(&input.email);
            if key.is_empty() || !trusted_emails.insert(key.clone()) {
                continue;
            }

            let worker_id = if let Some(known) = workers.iter().find(|w| email_key(&w.email) == key)
            {
                known.id.clone()
            } else {
                let person = to_person("", &input.name, &key, Some(input.initials.as_str()));
                let worker = Worker {
                    id: new_id("tw"),
                    name: person.name,
                    initials: person.initials,
                    email: person.email,
                    reputation: 0,
                    order_index: next_index,
                };
                next_index += 1;
                self.store.insert_worker(&worker).await?;
                let id = worker.id.clone();
                workers.push(worker);
                id
            };

            self.store.link_trusted_worker(property_id, &worker_id).await?;
            debug!(property_id, worker_id = %worker_id, "Trusted worker linked");
        }

        self.property_with_trusted(record).await
    }

    // =========================================================================
    // Bounties
    // =========================================================================

    pub async fn list_bounties(&self) -> ServiceResult<Vec<Bounty>> {
        Ok(self.store.list_bounties().await?)
    }

    pub async fn get_bounty(&self, id: &str) -> ServiceResult<Bounty> {
        Ok(self.store.get_bounty(id).await?)
    }

    /// Post a new bounty at the top of the backlog.
    pub async fn create_bounty(&self, input: CreateBountyInput) -> ServiceResult<Bounty> {
        if input.price < 0 {
            return Err(ServiceError::Validation(format!(
                "price must not be negative (got {})",
                input.price
            )));
        }

        let _guard = self.write_lock.lock().await;
        match self.store.get_property(&input.property_id).await {
            Ok(_) => {}
            Err(DatabaseError::NotFound(_)) => {
                return Err(ServiceError::Validation(format!(
                    "unknown property {}",
                    input.property_id
                )));
            }
            Err(e) => return Err(e.into()),
        }

        let existing = self.store.list_bounties().await?;
        let order_index = top_order_index(existing.iter().map(|b| b.order_index));
        let bounty = lifecycle::new_bounty(
            new_id("bounty"),
            input,
            self.no_show_timer_seconds(),
            order_index,
        );
        self.store.insert_bounty(&bounty).await?;
        info!(bounty_id = %bounty.id, property_id = %bounty.property_id, price = bounty.price, "Bounty created");
        Ok(bounty)
    }

    pub async fn add_task_template(
        &self,
        input: CreateTaskTemplateInput,
    ) -> ServiceResult<TaskTemplate> {
        if input.price < 0 {
            return Err(ServiceError::Validation(format!(
                "price must not be negative (got {})",
                input.price
            )));
        }

        let _guard = self.write_lock.lock().await;
        let existing = self.store.list_task_templates().await?;
        let template = TaskTemplate {
            id: new_id("template"),
            label: input.label,
            title: input.title,
            description: input.description,
            price: input.price,
            order_index: top_order_index(existing.iter().map(|t| t.order_index)),
        };
        self.store.insert_task_template(&template).await?;
        info!(template_id = %template.id, "Task template added");
        Ok(template)
    }

    /// Load one bounty under the write lock, apply `transition` and save
    /// it when the transition reports a change.
    async fn transition_bounty(
        &self,
        id: &str,
        transition: impl FnOnce(&mut Bounty) -> bool + Send,
    ) -> ServiceResult<Bounty> {
        let _guard = self.write_lock.lock().await;
        let mut bounty = self.store.get_bounty(id).await?;
        if transition(&mut bounty) {
            self.store.update_bounty(&bounty).await?;
        }
        Ok(bounty)
    }

    /// Boost or unboost. Claimed bounties come back unchanged.
    pub async fn toggle_bounty_boost(&self, id: &str) -> ServiceResult<Bounty> {
        let bounty = self.transition_bounty(id, lifecycle::toggle_boost).await?;
        debug!(bounty_id = id, boosted = bounty.boosted, price = bounty.price, "Boost toggled");
        Ok(bounty)
    }

    /// Remove a bounty. Deleting an unknown ID is not an error.
    pub async fn delete_bounty(&self, id: &str) -> ServiceResult<String> {
        let _guard = self.write_lock.lock().await;
        let removed = self.store.delete_bounty(id).await?;
        info!(bounty_id = id, removed, "Bounty deleted");
        Ok(id.to_string())
    }

    pub async fn accept_bounty(&self, id: &str, worker_id: &str) -> ServiceResult<Bounty> {
        let worker_id = worker_id.trim();
        if worker_id.is_empty() {
            return Err(ServiceError::Validation("workerId is required".to_string()));
        }
        let window = self.no_show_timer_seconds();
        let bounty = self
            .transition_bounty(id, |b| {
                lifecycle::accept(b, worker_id, window);
                true
            })
            .await?;
        info!(bounty_id = id, worker_id, "Bounty accepted");
        Ok(bounty)
    }

    pub async fn upload_bounty_proof_photo(&self, id: &str) -> ServiceResult<Bounty> {
        self.transition_bounty(id, |b| {
            lifecycle::upload_proof_photo(b);
            true
        })
        .await
    }

    pub async fn submit_bounty_work(&self, id: &str) -> ServiceResult<Bounty> {
        let bounty = self
            .transition_bounty(id, |b| {
                lifecycle::submit_work(b);
                true
            })
            .await?;
        info!(bounty_id = id, "Bounty submitted for review");
        Ok(bounty)
    }

    pub async fn reset_bounty_to_available(&self, id: &str) -> ServiceResult<Bounty> {
        let window = self.no_show_timer_seconds();
        let bounty = self
            .transition_bounty(id, |b| {
                lifecycle::reset_to_available(b, window);
                true
            })
            .await?;
        info!(bounty_id = id, "Bounty reset to available");
        Ok(bounty)
    }

    pub async fn move_bounty_lane(&self, id: &str, lane: Lane) -> ServiceResult<Bounty> {
        let bounty = self
            .transition_bounty(id, |b| {
                lifecycle::move_lane(b, lane);
                true
            })
            .await?;
        debug!(bounty_id = id, %lane, "Bounty moved");
        Ok(bounty)
    }

    /// Count down every running no-show timer and return all bounties.
    pub async fn tick_accepted_bounties(&self, seconds: u32) -> ServiceResult<Vec<Bounty>> {
        let _guard = self.write_lock.lock().await;
        let mut bounties = self.store.list_bounties().await?;
        let mut ticked = 0usize;
        for bounty in &mut bounties {
            if lifecycle::tick(bounty, seconds) {
                self.store.update_bounty(bounty).await?;
                ticked += 1;
            }
        }
        if ticked > 0 {
            debug!(seconds, ticked, "Ticked accepted bounties");
        }
        Ok(bounties)
    }
}

fn trusted_ref(worker: &Worker) -> TrustedWorkerRef {
    TrustedWorkerRef {
        id: worker.id.clone(),
        name: worker.name.clone(),
        initials: worker.initials.clone(),
    }
}

fn signed_in_person(user: &SignedInUser) -> PersonBasicInfo {
    to_person(&user.email, &user.name, &user.email, None)
}

fn global_person(worker: &GlobalTrustedWorker) -> PersonBasicInfo {
    to_person(&worker.id, &worker.name, &worker.email, Some(worker.initials.as_str()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "service_tests.rs"]
mod tests;
