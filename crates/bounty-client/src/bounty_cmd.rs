//! Board and bounty subcommands.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use tokio::sync::Mutex;

use bounty_core::model::{Bounty, CreateBountyInput, Lane, RecurrenceCadence};

use crate::api::ApiClient;
use crate::board::{LaneMove, bounty_line, format_timer, render_board};
use crate::config::ClientConfig;
use crate::poller::TickPoller;
use crate::store::{Action, ClientStore};

/// Bounty subcommand actions.
#[derive(Subcommand, Debug)]
pub enum BountyAction {
    /// Post a new bounty
    Create {
        /// Property ID
        #[arg(short, long)]
        property: String,
        /// Short title
        #[arg(short, long)]
        title: String,
        /// Price in whole dollars
        #[arg(long)]
        price: i64,
        /// Free-text category
        #[arg(long = "type", default_value = "General")]
        kind: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Repeat on a cadence (daily, weekly, biweekly, monthly)
        #[arg(long)]
        recurrence: Option<RecurrenceCadence>,
        /// Deadline as RFC 3339, e.g. 2026-03-01T17:00:00Z
        #[arg(long)]
        deadline: Option<DateTime<Utc>>,
        /// Disable the tenant bridge
        #[arg(long)]
        no_tenant_bridge: bool,
        /// Image URL (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,
    },
    /// Boost or unboost an open bounty
    Boost { id: String },
    /// Accept a bounty as a worker
    Accept {
        id: String,
        /// Worker ID (defaults to the configured or current worker)
        #[arg(short, long)]
        worker: Option<String>,
    },
    /// Record a proof photo
    Photo { id: String },
    /// Submit work for review
    Submit { id: String },
    /// Put an accepted bounty back on the board
    Reset { id: String },
    /// Move a bounty to another lane
    Lane {
        id: String,
        lane: Lane,
        /// Allow skipping lanes or moving backwards
        #[arg(long)]
        force: bool,
    },
    /// Delete a bounty
    Delete { id: String },
    /// Count down accepted bounties
    Tick {
        #[arg(default_value_t = 1)]
        seconds: u32,
    },
}

/// Print the state document as JSON.
pub async fn state(api: &ApiClient, config: &ClientConfig) -> anyhow::Result<()> {
    let store = ClientStore::load(api, config.role).await?;
    let mut out = io::stdout();
    if let Some(snapshot) = store.snapshot() {
        writeln!(out, "{}", serde_json::to_string_pretty(snapshot)?)?;
    }
    Ok(())
}

/// Print the board once.
pub async fn board(api: &ApiClient, config: &ClientConfig) -> anyhow::Result<()> {
    let store = ClientStore::load(api, config.role).await?;
    let mut out = io::stdout();
    if let Some(snapshot) = store.snapshot() {
        write!(out, "{}", render_board(snapshot))?;
    }
    Ok(())
}

/// Redraw the board every second while the poller counts timers down.
pub async fn watch(api: &ApiClient, config: &ClientConfig) -> anyhow::Result<()> {
    let store = Arc::new(Mutex::new(ClientStore::load(api, config.role).await?));
    let poller = TickPoller::new(api.clone(), Arc::clone(&store)).spawn();

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    let mut out = io::stdout();
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let guard = store.lock().await;
                if let Some(snapshot) = guard.snapshot() {
                    // Clear screen and home the cursor.
                    write!(out, "\x1b[2J\x1b[H{}", render_board(snapshot))?;
                    out.flush()?;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.abort();
    Ok(())
}

/// Execute a bounty subcommand.
pub async fn run(api: &ApiClient, config: &ClientConfig, action: BountyAction) -> anyhow::Result<()> {
    let mut store = ClientStore::load(api, config.role).await?;
    let mut out = io::stdout();

    match action {
        BountyAction::Create {
            property,
            title,
            price,
            kind,
            description,
            recurrence,
            deadline,
            no_tenant_bridge,
            images,
        } => {
            let input = CreateBountyInput {
                property_id: property,
                title,
                description,
                price,
                kind,
                tenant_bridge_enabled: !no_tenant_bridge,
                recursive_scheduling_enabled: recurrence.is_some(),
                recurrence_cadence: recurrence,
                deadline_at: deadline,
                image_urls: images,
            };
            let bounty = api.create_bounty(&input).await?;
            show(&mut out, &mut store, "Created", bounty)?;
        }
        BountyAction::Boost { id } => {
            let bounty = api.toggle_boost(&id).await?;
            let verb = if bounty.boosted { "Boosted" } else { "Unboosted" };
            show(&mut out, &mut store, verb, bounty)?;
        }
        BountyAction::Accept { id, worker } => {
            let worker_id = worker
                .or_else(|| config.current_worker_id.clone())
                .or_else(|| store.snapshot().map(|s| s.current_worker_id.clone()))
                .unwrap_or_default();
            let bounty = api.accept_bounty(&id, &worker_id).await?;
            let timer = format_timer(bounty.timer_seconds_remaining);
            show(&mut out, &mut store, "Accepted", bounty)?;
            writeln!(out, "No-show timer: {timer}")?;
        }
        BountyAction::Photo { id } => {
            let bounty = api.upload_proof_photo(&id).await?;
            writeln!(
                out,
                "Proof photos: {}/{}",
                bounty.proof_photos_uploaded,
                bounty_core::lifecycle::REQUIRED_PROOF_PHOTOS
            )?;
            store.dispatch(Action::UpsertBounty(bounty));
        }
        BountyAction::Submit { id } => {
            let bounty = api.submit_work(&id).await?;
            show(&mut out, &mut store, "Submitted", bounty)?;
        }
        BountyAction::Reset { id } => {
            let bounty = api.reset_bounty(&id).await?;
            show(&mut out, &mut store, "Reset", bounty)?;
        }
        BountyAction::Lane { id, lane, force } => {
            let current = match store.snapshot().and_then(|s| s.bounty(&id)) {
                Some(b) => b.owner_lane,
                None => api.get_bounty(&id).await?.owner_lane,
            };
            let kind = LaneMove::classify(current, lane);
            if kind.needs_confirmation() && !force {
                bail!(
                    "Moving {id} from {} to {} is not a single step forward; pass --force",
                    current.label(),
                    lane.label()
                );
            }
            let bounty = api.move_lane(&id, lane).await?;
            show(&mut out, &mut store, "Moved", bounty)?;
        }
        BountyAction::Delete { id } => {
            let id = api.delete_bounty(&id).await?;
            store.dispatch(Action::RemoveBounty(id.clone()));
            writeln!(out, "Deleted {id}")?;
        }
        BountyAction::Tick { seconds } => {
            let bounties = api.tick(seconds).await?;
            store.dispatch(Action::SetBounties(bounties));
            if let Some(snapshot) = store.snapshot() {
                for bounty in snapshot.bounties.iter().filter(|b| b.accepted_by_worker_id.is_some()) {
                    writeln!(out, "{}", bounty_line(snapshot, bounty))?;
                }
            }
        }
    }
    Ok(())
}

/// Fold a returned bounty into the store and print its card.
fn show(
    out: &mut impl Write,
    store: &mut ClientStore,
    verb: &str,
    bounty: Bounty,
) -> anyhow::Result<()> {
    let id = bounty.id.clone();
    store.dispatch(Action::UpsertBounty(bounty));
    if let Some(snapshot) = store.snapshot() {
        if let Some(bounty) = snapshot.bounty(&id) {
            writeln!(out, "{verb}: {}", bounty_line(snapshot, bounty))?;
        }
    }
    Ok(())
}
