//! Bounty lifecycle transitions.
//!
//! Every state change a bounty can go through lives here as a plain
//! function over `&mut Bounty`. Storage backends never touch lane, status,
//! price or timer fields themselves; they load a record, run one of these
//! functions and write the record back.
//!
//! The functions mirror the marketplace rules as they are, including the
//! loose ones: accepting does not check the previous status, submitting
//! does not require the proofs to be uploaded, and lane moves are not
//! checked for adjacency.

use crate::model::{Bounty, CreateBountyInput, Lane, WorkerStatus};

/// Price factor applied when an owner boosts an unclaimed bounty.
pub const BOOST_MULTIPLIER: f64 = 1.5;

/// Proof photos expected per job (before and after).
pub const REQUIRED_PROOF_PHOTOS: u32 = 2;

/// Build a new bounty in the backlog, open to workers.
pub fn new_bounty(
    id: String,
    input: CreateBountyInput,
    no_show_timer_seconds: u32,
    order_index: i64,
) -> Bounty {
    Bounty {
        id,
        title: input.title,
        property_id: input.property_id,
        owner_lane: Lane::Backlog,
        price: input.price,
        kind: input.kind,
        description: input.description,
        is_new: true,
        boosted: false,
        worker_status: WorkerStatus::Available,
        accepted_by_worker_id: None,
        timer_seconds_remaining: no_show_timer_seconds,
        proof_photos_uploaded: 0,
        tenant_bridge_enabled: input.tenant_bridge_enabled,
        recursive_scheduling_enabled: input.recursive_scheduling_enabled,
        recurrence_cadence: input.recurrence_cadence,
        deadline_at: input.deadline_at,
        image_urls: input.image_urls,
        order_index,
    }
}

/// `Math.round` semantics: halves round towards positive infinity.
#[allow(clippy::cast_possible_truncation)]
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Flip the boost flag and scale the price.
///
/// Only unclaimed bounties can be boosted or unboosted; for any other
/// status this is a no-op and returns `false`. The price is rounded after
/// every toggle, so repeated toggles can drift it.
#[allow(clippy::cast_precision_loss)]
pub fn toggle_boost(bounty: &mut Bounty) -> bool {
    if bounty.worker_status != WorkerStatus::Available {
        return false;
    }

    if bounty.boosted {
        bounty.boosted = false;
        bounty.price = round_half_up(bounty.price as f64 / BOOST_MULTIPLIER);
    } else {
        bounty.boosted = true;
        bounty.price = round_half_up(bounty.price as f64 * BOOST_MULTIPLIER);
    }
    true
}

/// Assign the bounty to a worker and restart the no-show timer.
///
/// Overwrites any previous assignee.
pub fn accept(bounty: &mut Bounty, worker_id: &str, no_show_timer_seconds: u32) {
    bounty.worker_status = WorkerStatus::Accepted;
    bounty.owner_lane = Lane::InProgress;
    bounty.accepted_by_worker_id = Some(worker_id.to_string());
    bounty.timer_seconds_remaining = no_show_timer_seconds;
    bounty.proof_photos_uploaded = 0;
    bounty.is_new = false;
}

/// Record one more proof photo, capped at [`REQUIRED_PROOF_PHOTOS`].
pub fn upload_proof_photo(bounty: &mut Bounty) {
    bounty.proof_photos_uploaded = (bounty.proof_photos_uploaded + 1).min(REQUIRED_PROOF_PHOTOS);
}

/// Hand the work to the owner for review.
pub fn submit_work(bounty: &mut Bounty) {
    bounty.worker_status = WorkerStatus::PendingApproval;
    bounty.owner_lane = Lane::Review;
    bounty.timer_seconds_remaining = 0;
    bounty.proof_photos_uploaded = bounty.proof_photos_uploaded.max(REQUIRED_PROOF_PHOTOS);
}

/// Undo an acceptance and put the bounty back on the active board.
pub fn reset_to_available(bounty: &mut Bounty, no_show_timer_seconds: u32) {
    bounty.worker_status = WorkerStatus::Available;
    bounty.owner_lane = Lane::Active;
    bounty.accepted_by_worker_id = None;
    bounty.timer_seconds_remaining = no_show_timer_seconds;
    bounty.proof_photos_uploaded = 0;
}

/// Owner-driven kanban move to any lane.
pub fn move_lane(bounty: &mut Bounty, lane: Lane) {
    bounty.owner_lane = lane;
}

/// Count down the no-show timer of an accepted bounty.
///
/// Returns `true` when the timer moved and the bounty needs saving.
/// Bounties that are not accepted, or whose timer already hit zero, are
/// left alone, as is every bounty on a zero-second tick.
pub fn tick(bounty: &mut Bounty, seconds: u32) -> bool {
    if seconds == 0
        || bounty.worker_status != WorkerStatus::Accepted
        || bounty.timer_seconds_remaining == 0
    {
        return false;
    }
    bounty.timer_seconds_remaining = bounty.timer_seconds_remaining.saturating_sub(seconds);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u32 = 1800;

    fn bounty(price: i64) -> Bounty {
        let input = CreateBountyInput {
            property_id: "p1".into(),
            title: "Replace air filter".into(),
            description: String::new(),
            price,
            kind: "Maintenance".into(),
            tenant_bridge_enabled: true,
            recursive_scheduling_enabled: false,
            recurrence_cadence: None,
            deadline_at: None,
            image_urls: vec![],
        };
        new_bounty("b1".into(), input, WINDOW, 0)
    }

    #[test]
    fn new_bounty_starts_in_backlog() {
        let b = bounty(20);
        assert_eq!(b.owner_lane, Lane::Backlog);
        assert_eq!(b.worker_status, WorkerStatus::Available);
        assert_eq!(b.timer_seconds_remaining, WINDOW);
        assert_eq!(b.proof_photos_uploaded, 0);
        assert!(b.is_new);
        assert!(!b.boosted);
        assert!(b.accepted_by_worker_id.is_none());
    }

    #[test]
    fn boost_round_trips_exact_prices() {
        let mut b = bounty(10);
        assert!(toggle_boost(&mut b));
        assert_eq!(b.price, 15);
        assert!(b.boosted);
        assert!(toggle_boost(&mut b));
        assert_eq!(b.price, 10);
        assert!(!b.boosted);
    }

    #[test]
    fn boost_rounds_half_up() {
        let mut b = bounty(11);
        toggle_boost(&mut b);
        assert_eq!(b.price, 17); // 16.5
        toggle_boost(&mut b);
        assert_eq!(b.price, 11); // 11.33
    }

    #[test]
    fn unboost_then_boost_can_drift() {
        let mut b = bounty(4);
        b.boosted = true;
        toggle_boost(&mut b);
        assert_eq!(b.price, 3); // 2.67
        toggle_boost(&mut b);
        assert_eq!(b.price, 5); // 4.5
    }

    #[test]
    fn boost_ignored_once_claimed() {
        let mut b = bounty(20);
        accept(&mut b, "w1", WINDOW);
        assert!(!toggle_boost(&mut b));
        assert_eq!(b.price, 20);
        assert!(!b.boosted);
    }

    #[test]
    fn accept_overwrites_previous_assignee() {
        let mut b = bounty(20);
        accept(&mut b, "w1", WINDOW);
        tick(&mut b, 100);
        upload_proof_photo(&mut b);
        accept(&mut b, "w2", WINDOW);
        assert_eq!(b.accepted_by_worker_id.as_deref(), Some("w2"));
        assert_eq!(b.timer_seconds_remaining, WINDOW);
        assert_eq!(b.proof_photos_uploaded, 0);
        assert!(!b.is_new);
    }

    #[test]
    fn accept_then_reset_lands_in_active() {
        let mut b = bounty(20);
        accept(&mut b, "w1", WINDOW);
        reset_to_available(&mut b, WINDOW);
        assert_eq!(b.worker_status, WorkerStatus::Available);
        assert_eq!(b.owner_lane, Lane::Active);
        assert!(b.accepted_by_worker_id.is_none());
        assert_eq!(b.timer_seconds_remaining, WINDOW);
        assert_eq!(b.proof_photos_uploaded, 0);
    }

    #[test]
    fn proof_photos_cap_at_two() {
        let mut b = bounty(20);
        for _ in 0..5 {
            upload_proof_photo(&mut b);
        }
        assert_eq!(b.proof_photos_uploaded, REQUIRED_PROOF_PHOTOS);
    }

    #[test]
    fn submit_zeroes_timer_and_fills_proofs() {
        let mut b = bounty(20);
        accept(&mut b, "w1", WINDOW);
        assert_eq!(b.timer_seconds_remaining, WINDOW);
        submit_work(&mut b);
        assert_eq!(b.timer_seconds_remaining, 0);
        assert_eq!(b.proof_photos_uploaded, 2);
        assert_eq!(b.owner_lane, Lane::Review);
        assert_eq!(b.worker_status, WorkerStatus::PendingApproval);
    }

    #[test]
    fn tick_only_touches_accepted_bounties() {
        let mut open = bounty(20);
        assert!(!tick(&mut open, 5));
        assert_eq!(open.timer_seconds_remaining, WINDOW);

        let mut taken = bounty(20);
        accept(&mut taken, "w1", 10);
        assert!(tick(&mut taken, 3));
        assert_eq!(taken.timer_seconds_remaining, 7);
        assert!(tick(&mut taken, 100));
        assert_eq!(taken.timer_seconds_remaining, 0);
        assert!(!tick(&mut taken, 1));
        assert_eq!(taken.timer_seconds_remaining, 0);
    }

    #[test]
    fn zero_second_tick_changes_nothing() {
        let mut taken = bounty(20);
        accept(&mut taken, "w1", 10);
        assert!(!tick(&mut taken, 0));
        assert_eq!(taken.timer_seconds_remaining, 10);
    }

    #[test]
    fn timer_never_increases_while_accepted() {
        let mut b = bounty(20);
        accept(&mut b, "w1", 50);
        let mut last = b.timer_seconds_remaining;
        for step in [1, 7, 0, 13, 2, 40, 1] {
            tick(&mut b, step);
            assert!(b.timer_seconds_remaining <= last);
            last = b.timer_seconds_remaining;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn lane_moves_are_unchecked() {
        let mut b = bounty(20);
        move_lane(&mut b, Lane::PendingPayout);
        assert_eq!(b.owner_lane, Lane::PendingPayout);
        assert_eq!(b.worker_status, WorkerStatus::Available);
        move_lane(&mut b, Lane::Backlog);
        assert_eq!(b.owner_lane, Lane::Backlog);
    }

    #[test]
    fn full_job_scenario() {
        let mut b = bounty(20);
        toggle_boost(&mut b);
        assert_eq!(b.price, 30);
        accept(&mut b, "w1", WINDOW);
        assert_eq!(b.owner_lane, Lane::InProgress);
        assert_eq!(b.worker_status, WorkerStatus::Accepted);
        upload_proof_photo(&mut b);
        upload_proof_photo(&mut b);
        assert_eq!(b.proof_photos_uploaded, 2);
        submit_work(&mut b);
        assert_eq!(b.owner_lane, Lane::Review);
        assert_eq!(b.worker_status, WorkerStatus::PendingApproval);
        assert_eq!(b.timer_seconds_remaining, 0);
    }
}
