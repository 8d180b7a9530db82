//! Row types for Bounty storage and their conversion to domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bounty_core::db::{DatabaseError, from_json_column};
use bounty_core::model::{
    AppMeta, Bounty, GeoPoint, GlobalTrustedWorker, Lane, RecurrenceCadence, Role, SignedInUser,
    TaskTemplate, Worker, WorkerStatus,
};

use crate::store::PropertyRecord;

fn bad_column(column: &str, err: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::Query(format!("invalid {column}: {err}"))
}

fn to_u32(column: &str, value: i64) -> Result<u32, DatabaseError> {
    u32::try_from(value).map_err(|e| bad_column(column, e))
}

/// Settings row (`app_meta`, always id 1).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppMetaRow {
    pub id: i64,
    pub role: String,
    pub default_role: Option<String>,
    pub current_worker_id: String,
    pub owner_financials: String,
    pub pending_payouts: String,
    pub task_reminders: String,
    pub worker_financial_summary: String,
    pub worker_transactions: String,
    pub ui: String,
    pub updated_at: i64,
}

impl TryFrom<AppMetaRow> for AppMeta {
    type Error = DatabaseError;

    fn try_from(row: AppMetaRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role: row.role.parse::<Role>().map_err(|e| bad_column("role", e))?,
            default_role: row
                .default_role
                .as_deref()
                .map(str::parse::<Role>)
                .transpose()
                .map_err(|e| bad_column("default_role", e))?,
            current_worker_id: row.current_worker_id,
            owner_financials: from_json_column(&row.owner_financials)?,
            pending_payouts: from_json_column(&row.pending_payouts)?,
            task_reminders: from_json_column(&row.task_reminders)?,
            worker_financial_summary: from_json_column(&row.worker_financial_summary)?,
            worker_transactions: from_json_column(&row.worker_transactions)?,
            ui: from_json_column(&row.ui)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkerRow {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub email: String,
    pub reputation: i64,
    pub order_index: i64,
}

impl From<WorkerRow> for Worker {
    fn from(row: WorkerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            initials: row.initials,
            email: row.email,
            reputation: row.reputation,
            order_index: row.order_index,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PropertyRow {
    pub id: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub gate_code: String,
    pub instructions: String,
    pub image: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub order_index: i64,
}

impl From<PropertyRow> for PropertyRecord {
    fn from(row: PropertyRow) -> Self {
        // A location needs both coordinates.
        let location = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };
        Self {
            id: row.id,
            address: row.address,
            city: row.city,
            zip_code: row.zip_code,
            gate_code: row.gate_code,
            instructions: row.instructions,
            image: row.image,
            location,
            order_index: row.order_index,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrustedLinkRow {
    pub property_id: String,
    pub worker_id: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BountyRow {
    pub id: String,
    pub title: String,
    pub property_id: String,
    pub owner_lane: String,
    pub price: i64,
    pub kind: String,
    pub description: String,
    pub is_new: i64,
    pub boosted: i64,
    pub worker_status: String,
    pub accepted_by_worker_id: Option<String>,
    pub timer_seconds_remaining: i64,
    pub proof_photos_uploaded: i64,
    pub tenant_bridge_enabled: i64,
    pub recursive_scheduling_enabled: i64,
    pub recurrence_cadence: Option<String>,
    pub deadline_at: Option<String>,
    pub image_urls: String,
    pub order_index: i64,
}

impl TryFrom<BountyRow> for Bounty {
    type Error = DatabaseError;

    fn try_from(row: BountyRow) -> Result<Self, Self::Error> {
        let deadline_at = row
            .deadline_at
            .as_deref()
            .map(|raw| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
            .transpose()
            .map_err(|e| bad_column("deadline_at", e))?;

        Ok(Self {
            owner_lane: row
                .owner_lane
                .parse::<Lane>()
                .map_err(|e| bad_column("owner_lane", e))?,
            worker_status: row
                .worker_status
                .parse::<WorkerStatus>()
                .map_err(|e| bad_column("worker_status", e))?,
            recurrence_cadence: row
                .recurrence_cadence
                .as_deref()
                .map(str::parse::<RecurrenceCadence>)
                .transpose()
                .map_err(|e| bad_column("recurrence_cadence", e))?,
            timer_seconds_remaining: to_u32(
                "timer_seconds_remaining",
                row.timer_seconds_remaining,
            )?,
            proof_photos_uploaded: to_u32("proof_photos_uploaded", row.proof_photos_uploaded)?,
            image_urls: from_json_column(&row.image_urls)?,
            deadline_at,
            id: row.id,
            title: row.title,
            property_id: row.property_id,
            price: row.price,
            kind: row.kind,
            description: row.description,
            is_new: row.is_new != 0,
            boosted: row.boosted != 0,
            accepted_by_worker_id: row.accepted_by_worker_id,
            tenant_bridge_enabled: row.tenant_bridge_enabled != 0,
            recursive_scheduling_enabled: row.recursive_scheduling_enabled != 0,
            order_index: row.order_index,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskTemplateRow {
    pub id: String,
    pub label: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub order_index: i64,
}

impl From<TaskTemplateRow> for TaskTemplate {
    fn from(row: TaskTemplateRow) -> Self {
        Self {
            id: row.id,
            label: row.label,
            title: row.title,
            description: row.description,
            price: row.price,
            order_index: row.order_index,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GlobalTrustedWorkerRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub initials: String,
    pub order_index: i64,
}

impl From<GlobalTrustedWorkerRow> for GlobalTrustedWorker {
    fn from(row: GlobalTrustedWorkerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            initials: row.initials,
            order_index: row.order_index,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SignedInUserRow {
    pub email: String,
    pub name: String,
    pub updated_at: i64,
}

impl From<SignedInUserRow> for SignedInUser {
    fn from(row: SignedInUserRow) -> Self {
        Self {
            email: row.email,
            name: row.name,
            updated_at: row.updated_at,
        }
    }
}
