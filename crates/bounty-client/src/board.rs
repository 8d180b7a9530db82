//! Text rendering of the owner board and bounty cards.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use bounty_core::model::{Bounty, Lane, Snapshot, WorkerStatus};

/// How a lane move relates to board order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneMove {
    /// Same lane.
    Stay,
    /// One column to the right.
    Forward,
    /// Two or more columns to the right.
    Skip,
    Backward,
}

impl LaneMove {
    pub const fn classify(from: Lane, to: Lane) -> Self {
        if from.index() == to.index() {
            Self::Stay
        } else if from.is_adjacent_forward(to) {
            Self::Forward
        } else if to.index() > from.index() {
            Self::Skip
        } else {
            Self::Backward
        }
    }

    /// Moves the CLI asks `--force` for.
    pub const fn needs_confirmation(self) -> bool {
        matches!(self, Self::Skip | Self::Backward)
    }
}

/// `MM:SS`, minutes unbounded.
pub fn format_timer(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Short deadline warning: overdue, or due within a day. Hours round up.
pub fn deadline_hint(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    const HOUR_MS: u64 = 60 * 60 * 1000;
    let diff_ms = (deadline - now).num_milliseconds();
    let hours = diff_ms.unsigned_abs().div_ceil(HOUR_MS);
    if diff_ms <= 0 {
        Some(format!("overdue {hours}h"))
    } else if diff_ms.unsigned_abs() <= 24 * HOUR_MS {
        Some(format!("due in {hours}h"))
    } else {
        None
    }
}

/// Bounties grouped per lane, in board order. Empty lanes are kept.
pub fn group_by_lane(bounties: &[Bounty]) -> Vec<(Lane, Vec<&Bounty>)> {
    Lane::ALL
        .iter()
        .map(|&lane| {
            let cards = bounties.iter().filter(|b| b.owner_lane == lane).collect();
            (lane, cards)
        })
        .collect()
}

/// One-line card: id, title, price, status, any deadline warning and any
/// running timer.
pub fn bounty_line(snapshot: &Snapshot, bounty: &Bounty) -> String {
    let mut line = format!(
        "{}  {}  ${}{}  [{}]  {}",
        bounty.id,
        bounty.title,
        bounty.price,
        if bounty.boosted { " (boosted)" } else { "" },
        bounty.worker_status.label(),
        snapshot.property_label(&bounty.property_id),
    );
    if let Some(hint) = bounty
        .deadline_at
        .and_then(|deadline| deadline_hint(deadline, Utc::now()))
    {
        let _ = write!(line, "  ({hint})");
    }
    if bounty.worker_status == WorkerStatus::Accepted {
        let who = bounty
            .accepted_by_worker_id
            .as_deref()
            .and_then(|id| snapshot.worker(id).map(|w| w.name.as_str()).or(Some(id)))
            .unwrap_or("?");
        let _ = write!(
            line,
            "  {who}  {}",
            format_timer(bounty.timer_seconds_remaining)
        );
    }
    line
}

/// The whole board as text, one section per lane.
pub fn render_board(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    for (lane, cards) in group_by_lane(&snapshot.bounties) {
        let _ = writeln!(out, "== {} ({}) ==", lane.label(), cards.len());
        for bounty in cards {
            let _ = writeln!(out, "  {}", bounty_line(snapshot, bounty));
        }
    }
    out
}
