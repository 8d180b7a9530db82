//! The full state document served by `GET /api/state`.

use serde::{Deserialize, Serialize};

use super::bounty::{Bounty, WorkerStatus};
use super::meta::{
    OwnerFinancialSummary, PendingPayout, TaskReminder, UiSettings, WorkerFinancialSummary,
    WorkerTransaction,
};
use super::people::{PersonBasicInfo, Role, TaskTemplate, Worker};
use super::property::Property;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub role: Role,
    pub default_role: Role,
    pub current_worker_id: String,
    pub workers: Vec<Worker>,
    pub signed_in_users: Vec<PersonBasicInfo>,
    pub global_trusted_workers: Vec<PersonBasicInfo>,
    pub properties: Vec<Property>,
    pub bounties: Vec<Bounty>,
    pub task_templates: Vec<TaskTemplate>,
    pub owner_financials: OwnerFinancialSummary,
    pub pending_payouts: Vec<PendingPayout>,
    pub task_reminders: Vec<TaskReminder>,
    pub worker_financial_summary: WorkerFinancialSummary,
    pub worker_transactions: Vec<WorkerTransaction>,
    pub ui: UiSettings,
}

impl Snapshot {
    pub fn bounty(&self, id: &str) -> Option<&Bounty> {
        self.bounties.iter().find(|b| b.id == id)
    }

    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn worker(&self, id: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    /// Address of a property, or a placeholder when it is gone.
    pub fn property_label(&self, property_id: &str) -> &str {
        self.property(property_id)
            .map_or("Unknown Property", |p| p.address.as_str())
    }

    /// Whether any accepted bounty still has time on its no-show timer.
    pub fn has_running_timers(&self) -> bool {
        self.bounties
            .iter()
            .any(|b| b.worker_status == WorkerStatus::Accepted && b.timer_seconds_remaining > 0)
    }
}
