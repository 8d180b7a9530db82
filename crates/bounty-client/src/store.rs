//! Client-side state store.
//!
//! Holds the last snapshot fetched from the server and folds server
//! responses into it, so the dashboard does not refetch `/api/state`
//! after every mutation.

use tracing::debug;

use bounty_core::model::{Bounty, PersonBasicInfo, Property, Role, Snapshot, TaskTemplate};

use crate::api::{ApiClient, ClientError};

/// A change to apply to the local snapshot.
#[derive(Debug, Clone)]
pub enum Action {
    Hydrate(Snapshot),
    SetRole(Role),
    SetDefaultRole(Role),
    SetGlobalTrustedWorkers(Vec<PersonBasicInfo>),
    /// Prepend a new property.
    AddProperty(Property),
    /// Replace a property in place. Unknown IDs are ignored.
    UpsertProperty(Property),
    /// Replace a bounty in place, or prepend it when new.
    UpsertBounty(Bounty),
    RemoveBounty(String),
    SetBounties(Vec<Bounty>),
    AddTaskTemplate(TaskTemplate),
}

#[derive(Debug, Default)]
pub struct ClientStore {
    snapshot: Option<Snapshot>,
}

impl ClientStore {
    pub const fn new() -> Self {
        Self { snapshot: None }
    }

    pub const fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub const fn is_hydrated(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Apply one action. Everything except `Hydrate` is dropped until the
    /// store has a snapshot; returns whether the action was applied.
    pub fn dispatch(&mut self, action: Action) -> bool {
        match (&mut self.snapshot, action) {
            (slot, Action::Hydrate(snapshot)) => *slot = Some(snapshot),
            (None, action) => {
                debug!(?action, "Dropping action before hydration");
                return false;
            }
            (Some(state), action) => apply(state, action),
        }
        true
    }

    /// Fetch the snapshot, settle the role and hydrate.
    ///
    /// See [`hydration_role`] for how the role is chosen. When it differs
    /// from what the server has, the server is told first.
    pub async fn load(api: &ApiClient, saved_role: Option<Role>) -> Result<Self, ClientError> {
        let mut snapshot = api.state().await?;
        if let Some(role) = hydration_role(&snapshot, saved_role) {
            snapshot.role = api.set_role(role).await?;
        }
        let mut store = Self::new();
        store.dispatch(Action::Hydrate(snapshot));
        Ok(store)
    }
}

fn apply(state: &mut Snapshot, action: Action) {
    match action {
        Action::Hydrate(snapshot) => *state = snapshot,
        Action::SetRole(role) => state.role = role,
        Action::SetDefaultRole(role) => state.default_role = role,
        Action::SetGlobalTrustedWorkers(workers) => state.global_trusted_workers = workers,
        Action::AddProperty(property) => state.properties.insert(0, property),
        Action::UpsertProperty(property) => {
            if let Some(slot) = state.properties.iter_mut().find(|p| p.id == property.id) {
                *slot = property;
            }
        }
        Action::UpsertBounty(bounty) => {
            if let Some(slot) = state.bounties.iter_mut().find(|b| b.id == bounty.id) {
                *slot = bounty;
            } else {
                state.bounties.insert(0, bounty);
            }
        }
        Action::RemoveBounty(id) => state.bounties.retain(|b| b.id != id),
        Action::SetBounties(bounties) => state.bounties = bounties,
        Action::AddTaskTemplate(template) => state.task_templates.insert(0, template),
    }
}

/// Role to push to the server when hydrating, if any.
///
/// A saved preference always wins. Without one, the session role is reset
/// to the default role when the two differ.
pub fn hydration_role(snapshot: &Snapshot, saved_role: Option<Role>) -> Option<Role> {
    saved_role.or_else(|| (snapshot.role != snapshot.default_role).then_some(snapshot.default_role))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bounty_core::lifecycle;
    use bounty_core::model::{
        AppMeta, CreateBountyInput, OwnerFinancialSummary, UiSettings, WorkerFinancialSummary,
    };

    fn snapshot(role: Role, default_role: Role) -> Snapshot {
        let meta = AppMeta::with_ui(UiSettings::default());
        Snapshot {
            role,
            default_role,
            current_worker_id: meta.current_worker_id,
            workers: vec![],
            signed_in_users: vec![],
            global_trusted_workers: vec![],
            properties: vec![],
            bounties: vec![],
            task_templates: vec![],
            owner_financials: OwnerFinancialSummary::default(),
            pending_payouts: vec![],
            task_reminders: vec![],
            worker_financial_summary: WorkerFinancialSummary::default(),
            worker_transactions: vec![],
            ui: meta.ui,
        }
    }

    fn bounty(id: &str, price: i64) -> Bounty {
        let input = CreateBountyInput {
            property_id: "p1".into(),
            title: format!("Job {id}"),
            description: String::new(),
            price,
            kind: "General".into(),
            tenant_bridge_enabled: true,
            recursive_scheduling_enabled: false,
            recurrence_cadence: None,
            deadline_at: None,
            image_urls: vec![],
        };
        lifecycle::new_bounty(id.into(), input, 1800, 0)
    }

    fn property(id: &str, address: &str) -> Property {
        Property {
            id: id.into(),
            address: address.into(),
            city: "Austin, TX".into(),
            zip_code: "78701".into(),
            gate_code: "No gate".into(),
            instructions: String::new(),
            image: String::new(),
            whitelisted_workers: vec![],
            location: None,
        }
    }

    #[test]
    fn actions_before_hydration_are_ignored() {
        let mut store = ClientStore::new();
        assert!(!store.dispatch(Action::SetRole(Role::Worker)));
        assert!(!store.dispatch(Action::UpsertBounty(bounty("b1", 10))));
        assert!(store.snapshot().is_none());

        assert!(store.dispatch(Action::Hydrate(snapshot(Role::Owner, Role::Owner))));
        assert!(store.is_hydrated());
        assert!(store.snapshot().unwrap().bounties.is_empty());
    }

    #[test]
    fn upsert_bounty_replaces_or_prepends() {
        let mut store = ClientStore::new();
        store.dispatch(Action::Hydrate(snapshot(Role::Owner, Role::Owner)));
        store.dispatch(Action::UpsertBounty(bounty("b1", 10)));
        store.dispatch(Action::UpsertBounty(bounty("b2", 20)));
        store.dispatch(Action::UpsertBounty(bounty("b1", 15)));

        let bounties = &store.snapshot().unwrap().bounties;
        assert_eq!(bounties.len(), 2);
        assert_eq!(bounties[0].id, "b2");
        assert_eq!(bounties[1].price, 15);

        store.dispatch(Action::RemoveBounty("b2".into()));
        store.dispatch(Action::RemoveBounty("missing".into()));
        assert_eq!(store.snapshot().unwrap().bounties.len(), 1);
    }

    #[test]
    fn properties_prepend_and_upsert_in_place() {
        let mut store = ClientStore::new();
        store.dispatch(Action::Hydrate(snapshot(Role::Owner, Role::Owner)));
        store.dispatch(Action::AddProperty(property("p1", "1 Elm")));
        store.dispatch(Action::AddProperty(property("p2", "2 Oak")));
        store.dispatch(Action::UpsertProperty(property("p1", "1 Elm St")));
        store.dispatch(Action::UpsertProperty(property("p9", "Nowhere")));

        let properties = &store.snapshot().unwrap().properties;
        let addresses: Vec<_> = properties.iter().map(|p| p.address.as_str()).collect();
        assert_eq!(addresses, vec!["2 Oak", "1 Elm St"]);
    }

    #[test]
    fn roles_and_lists_are_replaced() {
        let mut store = ClientStore::new();
        store.dispatch(Action::Hydrate(snapshot(Role::Owner, Role::Owner)));
        store.dispatch(Action::SetRole(Role::Worker));
        store.dispatch(Action::SetDefaultRole(Role::Worker));
        store.dispatch(Action::SetBounties(vec![bounty("b3", 5)]));
        store.dispatch(Action::AddTaskTemplate(TaskTemplate {
            id: "t1".into(),
            label: "Lawn".into(),
            title: "Mow".into(),
            description: String::new(),
            price: 40,
            order_index: 0,
        }));

        let state = store.snapshot().unwrap();
        assert_eq!(state.role, Role::Worker);
        assert_eq!(state.default_role, Role::Worker);
        assert_eq!(state.bounties.len(), 1);
        assert_eq!(state.task_templates[0].id, "t1");
    }

    #[test]
    fn saved_role_wins_on_hydration() {
        let snap = snapshot(Role::Owner, Role::Owner);
        assert_eq!(hydration_role(&snap, Some(Role::Worker)), Some(Role::Worker));
        assert_eq!(hydration_role(&snap, Some(Role::Owner)), Some(Role::Owner));
    }

    #[test]
    fn role_resets_to_default_without_preference() {
        let snap = snapshot(Role::Worker, Role::Owner);
        assert_eq!(hydration_role(&snap, None), Some(Role::Owner));

        let settled = snapshot(Role::Worker, Role::Worker);
        assert_eq!(hydration_role(&settled, None), None);
    }
}
