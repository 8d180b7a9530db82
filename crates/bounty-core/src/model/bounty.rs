//! Bounty records, lanes and worker statuses.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Owner-facing kanban column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Backlog,
    Active,
    InProgress,
    Review,
    #[serde(alias = "pending_payment")]
    PendingPayout,
}

impl Lane {
    /// All lanes in board order.
    pub const ALL: [Self; 5] = [
        Self::Backlog,
        Self::Active,
        Self::InProgress,
        Self::Review,
        Self::PendingPayout,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::PendingPayout => "pending_payout",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Active => "Active",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::PendingPayout => "Pending Payout",
        }
    }

    /// Position on the board, starting at 0 for backlog.
    pub const fn index(&self) -> usize {
        match self {
            Self::Backlog => 0,
            Self::Active => 1,
            Self::InProgress => 2,
            Self::Review => 3,
            Self::PendingPayout => 4,
        }
    }

    /// True when `to` is exactly one column to the right.
    pub const fn is_adjacent_forward(&self, to: Self) -> bool {
        to.index() == self.index() + 1
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lane {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(Self::Backlog),
            "active" => Ok(Self::Active),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "pending_payout" | "pending_payment" => Ok(Self::PendingPayout),
            other => Err(Error::Validation(format!("unknown lane: {other}"))),
        }
    }
}

/// Worker-facing bounty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Available,
    Accepted,
    PendingApproval,
}

impl WorkerStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Accepted => "accepted",
            Self::PendingApproval => "pending_approval",
        }
    }

    /// Short label shown on task cards.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Available => "Open",
            Self::Accepted => "Assigned",
            Self::PendingApproval => "Submitted",
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "accepted" => Ok(Self::Accepted),
            "pending_approval" => Ok(Self::PendingApproval),
            other => Err(Error::Validation(format!("unknown worker status: {other}"))),
        }
    }
}

/// How often a recurring bounty is reposted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceCadence {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurrenceCadence {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for RecurrenceCadence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(Error::Validation(format!("unknown cadence: {other}"))),
        }
    }
}

/// A paid task tied to a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounty {
    pub id: String,
    pub title: String,
    pub property_id: String,
    pub owner_lane: Lane,
    pub price: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub is_new: bool,
    pub boosted: bool,
    pub worker_status: WorkerStatus,
    pub accepted_by_worker_id: Option<String>,
    pub timer_seconds_remaining: u32,
    pub proof_photos_uploaded: u32,
    pub tenant_bridge_enabled: bool,
    pub recursive_scheduling_enabled: bool,
    pub recurrence_cadence: Option<RecurrenceCadence>,
    pub deadline_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// List position; lower sorts first.
    #[serde(skip)]
    pub order_index: i64,
}

fn default_kind() -> String {
    "General".to_string()
}

const fn default_true() -> bool {
    true
}

/// Body of `POST /api/bounties`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBountyInput {
    pub property_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_true")]
    pub tenant_bridge_enabled: bool,
    #[serde(default)]
    pub recursive_scheduling_enabled: bool,
    #[serde(default)]
    pub recurrence_cadence: Option<RecurrenceCadence>,
    #[serde(default)]
    pub deadline_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}
