//! The process-wide settings row and its precomputed summaries.

use serde::{Deserialize, Serialize};

use super::people::Role;

/// Presentation defaults shared with clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSettings {
    pub default_city: String,
    pub property_placeholder_image: String,
    pub map_preview_image: String,
    /// Window a worker has to show up after accepting.
    pub no_show_timer_seconds: u32,
    pub auto_repost_days: u32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            default_city: "Austin, TX".to_string(),
            property_placeholder_image: "/images/property-placeholder.jpg".to_string(),
            map_preview_image: "/images/map-preview.png".to_string(),
            no_show_timer_seconds: 30 * 60,
            auto_repost_days: 7,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerFinancialSummary {
    pub total_spent_ytd: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerFinancialSummary {
    pub total_earnings: i64,
    pub pending_payouts: i64,
    pub jobs_completed: i64,
    pub earnings_delta_text: String,
    pub pending_jobs_text: String,
    pub jobs_completed_delta_text: String,
}

/// A payout the owner still owes. Not linked back to the bounty row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayout {
    pub id: String,
    pub worker_id: String,
    pub worker: String,
    pub email: String,
    pub task: String,
    pub amount: i64,
    pub property: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    #[default]
    Default,
    Secondary,
    Destructive,
    Outline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReminder {
    pub id: String,
    pub title: String,
    pub properties_label: String,
    pub badge_label: String,
    pub badge_variant: BadgeVariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerTransaction {
    pub id: String,
    pub bounty_id: String,
    pub title: String,
    pub property_label: String,
    pub completed_on: String,
    pub amount: i64,
}

/// Singleton settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMeta {
    pub role: Role,
    pub default_role: Option<Role>,
    pub current_worker_id: String,
    pub owner_financials: OwnerFinancialSummary,
    pub pending_payouts: Vec<PendingPayout>,
    pub task_reminders: Vec<TaskReminder>,
    pub worker_financial_summary: WorkerFinancialSummary,
    pub worker_transactions: Vec<WorkerTransaction>,
    pub ui: UiSettings,
}

impl AppMeta {
    /// Fresh settings row with empty summaries.
    pub fn with_ui(ui: UiSettings) -> Self {
        Self {
            role: Role::Owner,
            default_role: Some(Role::Owner),
            current_worker_id: "w1".to_string(),
            owner_financials: OwnerFinancialSummary::default(),
            pending_payouts: Vec::new(),
            task_reminders: Vec::new(),
            worker_financial_summary: WorkerFinancialSummary::default(),
            worker_transactions: Vec::new(),
            ui,
        }
    }

    pub fn default_role_or_owner(&self) -> Role {
        self.default_role.unwrap_or_default()
    }
}
