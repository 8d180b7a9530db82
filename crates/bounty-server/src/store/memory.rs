//! In-memory store used for demos and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;

use bounty_core::db::{DatabaseError, unix_timestamp};
use bounty_core::model::{AppMeta, Bounty, GlobalTrustedWorker, SignedInUser, TaskTemplate, Worker};

use super::{PropertyRecord, Store, TrustedLink};

#[derive(Default)]
struct Tables {
    meta: Option<AppMeta>,
    workers: Vec<Worker>,
    properties: Vec<PropertyRecord>,
    trusted_links: Vec<TrustedLink>,
    bounties: Vec<Bounty>,
    task_templates: Vec<TaskTemplate>,
    global_trusted_workers: Vec<GlobalTrustedWorker>,
    signed_in_users: Vec<SignedInUser>,
}

/// Process-local store. Everything is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_order<T: Clone>(rows: &[T], key: impl Fn(&T) -> i64) -> Vec<T> {
    let mut out = rows.to_vec();
    out.sort_by_key(key);
    out
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn load_meta(&self) -> Result<Option<AppMeta>, DatabaseError> {
        Ok(self.tables.read().await.meta.clone())
    }

    async fn save_meta(&self, meta: &AppMeta) -> Result<(), DatabaseError> {
        self.tables.write().await.meta = Some(meta.clone());
        Ok(())
    }

    async fn list_workers(&self) -> Result<Vec<Worker>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(sorted_by_order(&tables.workers, |w| w.order_index))
    }

    async fn insert_worker(&self, worker: &Worker) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.workers.iter().any(|w| w.id == worker.id) {
            return Err(DatabaseError::Query(format!("Worker {} already exists", worker.id)));
        }
        tables.workers.push(worker.clone());
        Ok(())
    }

    async fn list_properties(&self) -> Result<Vec<PropertyRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(sorted_by_order(&tables.properties, |p| p.order_index))
    }

    async fn get_property(&self, id: &str) -> Result<PropertyRecord, DatabaseError> {
        self.tables
            .read()
            .await
            .properties
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("Property {id}")))
    }

    async fn insert_property(&self, property: &PropertyRecord) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.properties.iter().any(|p| p.id == property.id) {
            return Err(DatabaseError::Query(format!("Property {} already exists", property.id)));
        }
        tables.properties.push(property.clone());
        Ok(())
    }

    async fn update_property(&self, property: &PropertyRecord) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .properties
            .iter_mut()
            .find(|p| p.id == property.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Property {}", property.id)))?;
        *slot = property.clone();
        Ok(())
    }

    async fn list_trusted_links(&self) -> Result<Vec<TrustedLink>, DatabaseError> {
        Ok(self.tables.read().await.trusted_links.clone())
    }

    async fn trusted_worker_ids(&self, property_id: &str) -> Result<Vec<String>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .trusted_links
            .iter()
            .filter(|link| link.property_id == property_id)
            .map(|link| link.worker_id.clone())
            .collect())
    }

    async fn link_trusted_worker(
        &self,
        property_id: &str,
        worker_id: &str,
    ) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .trusted_links
            .iter()
            .any(|l| l.property_id == property_id && l.worker_id == worker_id);
        if !exists {
            tables.trusted_links.push(TrustedLink {
                property_id: property_id.to_string(),
                worker_id: worker_id.to_string(),
            });
        }
        Ok(())
    }

    async fn list_bounties(&self) -> Result<Vec<Bounty>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(sorted_by_order(&tables.bounties, |b| b.order_index))
    }

    async fn get_bounty(&self, id: &str) -> Result<Bounty, DatabaseError> {
        self.tables
            .read()
            .await
            .bounties
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("Bounty {id}")))
    }

    async fn insert_bounty(&self, bounty: &Bounty) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.bounties.iter().any(|b| b.id == bounty.id) {
            return Err(DatabaseError::Query(format!("Bounty {} already exists", bounty.id)));
        }
        tables.bounties.push(bounty.clone());
        Ok(())
    }

    async fn update_bounty(&self, bounty: &Bounty) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .bounties
            .iter_mut()
            .find(|b| b.id == bounty.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Bounty {}", bounty.id)))?;
        *slot = bounty.clone();
        Ok(())
    }

    async fn delete_bounty(&self, id: &str) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.bounties.len();
        tables.bounties.retain(|b| b.id != id);
        Ok(tables.bounties.len() < before)
    }

    async fn list_task_templates(&self) -> Result<Vec<TaskTemplate>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(sorted_by_order(&tables.task_templates, |t| t.order_index))
    }

    async fn insert_task_template(&self, template: &TaskTemplate) -> Result<(), DatabaseError> {
        self.tables.write().await.task_templates.push(template.clone());
        Ok(())
    }

    async fn list_global_trusted_workers(
        &self,
    ) -> Result<Vec<GlobalTrustedWorker>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(sorted_by_order(&tables.global_trusted_workers, |w| w.order_index))
    }

    async fn insert_global_trusted_worker(
        &self,
        worker: &GlobalTrustedWorker,
    ) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables
            .global_trusted_workers
            .iter()
            .any(|w| w.email == worker.email)
        {
            return Err(DatabaseError::Query(format!(
                "Global trusted worker {} already exists",
                worker.email
            )));
        }
        tables.global_trusted_workers.push(worker.clone());
        Ok(())
    }

    async fn delete_global_trusted_worker(&self, id: &str) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.global_trusted_workers.len();
        tables.global_trusted_workers.retain(|w| w.id != id);
        Ok(tables.global_trusted_workers.len() < before)
    }

    async fn list_signed_in_users(&self) -> Result<Vec<SignedInUser>, DatabaseError> {
        let mut users = self.tables.read().await.signed_in_users.clone();
        users.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(users)
    }

    async fn upsert_signed_in_user(&self, user: &SignedInUser) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let updated_at = if user.updated_at == 0 {
            unix_timestamp()
        } else {
            user.updated_at
        };
        let row = SignedInUser {
            updated_at,
            ..user.clone()
        };
        match tables.signed_in_users.iter_mut().find(|u| u.email == user.email) {
            Some(existing) => *existing = row,
            None => tables.signed_in_users.push(row),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str, order_index: i64) -> TaskTemplate {
        TaskTemplate {
            id: id.into(),
            label: id.into(),
            title: "Title".into(),
            description: String::new(),
            price: 10,
            order_index,
        }
    }

    #[tokio::test]
    async fn lists_follow_order_index() {
        let store = MemoryStore::new();
        store.insert_task_template(&template("a", 0)).await.unwrap();
        store.insert_task_template(&template("b", -1)).await.unwrap();
        let ids: Vec<_> = store
            .list_task_templates()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn missing_bounty_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get_bounty("nope").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
        assert!(!store.delete_bounty("nope").await.unwrap());
    }

    #[tokio::test]
    async fn signed_in_users_upsert_by_email() {
        let store = MemoryStore::new();
        let user = SignedInUser {
            email: "sam@x.io".into(),
            name: "Sam".into(),
            updated_at: 10,
        };
        store.upsert_signed_in_user(&user).await.unwrap();
        store
            .upsert_signed_in_user(&SignedInUser {
                name: "Samuel".into(),
                updated_at: 20,
                ..user
            })
            .await
            .unwrap();
        let users = store.list_signed_in_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Samuel");
    }

    #[tokio::test]
    async fn links_are_not_duplicated() {
        let store = MemoryStore::new();
        store.link_trusted_worker("p1", "w1").await.unwrap();
        store.link_trusted_worker("p1", "w1").await.unwrap();
        assert_eq!(store.trusted_worker_ids("p1").await.unwrap(), vec!["w1"]);
    }
}
