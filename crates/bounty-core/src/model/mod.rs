//! Marketplace domain model.
//!
//! Every wire type serialises as camelCase JSON. Internal list positions
//! (`order_index`) never leave the process.

mod bounty;
mod meta;
mod people;
mod property;
mod snapshot;

pub use bounty::{Bounty, CreateBountyInput, Lane, RecurrenceCadence, WorkerStatus};
pub use meta::{
    AppMeta, BadgeVariant, OwnerFinancialSummary, PendingPayout, TaskReminder, UiSettings,
    WorkerFinancialSummary, WorkerTransaction,
};
pub use people::{
    AddTrustedWorkerInput, CreateTaskTemplateInput, GlobalTrustedWorker, PersonBasicInfo, Role,
    SignedInUser, TaskTemplate, Worker,
};
pub use property::{CreatePropertyInput, GeoPoint, Property, TrustedWorkerRef, UpdatePropertyInput};
pub use snapshot::Snapshot;

/// Generate a prefixed unique identifier, e.g. `bounty-5f0c…`.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}
