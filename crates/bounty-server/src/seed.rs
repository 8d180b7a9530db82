//! Demo dataset for local runs.

use tracing::info;

use bounty_core::db::DatabaseError;
use bounty_core::lifecycle;
use bounty_core::model::{
    AppMeta, BadgeVariant, CreateBountyInput, GeoPoint, Lane, OwnerFinancialSummary,
    PendingPayout, RecurrenceCadence, TaskReminder, TaskTemplate, UiSettings, Worker,
    WorkerFinancialSummary, WorkerTransaction,
};

use crate::store::{PropertyRecord, Store};

fn worker(
    id: &str,
    name: &str,
    initials: &str,
    email: &str,
    reputation: i64,
    order_index: i64,
) -> Worker {
    Worker {
        id: id.into(),
        name: name.into(),
        initials: initials.into(),
        email: email.into(),
        reputation,
        order_index,
    }
}

#[allow(clippy::too_many_arguments)]
fn property(
    id: &str,
    address: &str,
    zip_code: &str,
    gate_code: &str,
    instructions: &str,
    location: GeoPoint,
    order_index: i64,
    ui: &UiSettings,
) -> PropertyRecord {
    PropertyRecord {
        id: id.into(),
        address: address.into(),
        city: ui.default_city.clone(),
        zip_code: zip_code.into(),
        gate_code: gate_code.into(),
        instructions: instructions.into(),
        image: ui.property_placeholder_image.clone(),
        location: Some(location),
        order_index,
    }
}

fn bounty_input(property_id: &str, title: &str, kind: &str, price: i64) -> CreateBountyInput {
    CreateBountyInput {
        property_id: property_id.into(),
        title: title.into(),
        description: String::new(),
        price,
        kind: kind.into(),
        tenant_bridge_enabled: true,
        recursive_scheduling_enabled: false,
        recurrence_cadence: None,
        deadline_at: None,
        image_urls: Vec::new(),
    }
}

fn seeded_meta(ui: UiSettings) -> AppMeta {
    let mut meta = AppMeta::with_ui(ui);
    meta.owner_financials = OwnerFinancialSummary {
        total_spent_ytd: 4_820,
    };
    meta.pending_payouts = vec![PendingPayout {
        id: "payout-1".into(),
        worker_id: "w2".into(),
        worker: "Maria Lopez".into(),
        email: "maria@example.com".into(),
        task: "Fix leaking faucet".into(),
        amount: 85,
        property: "1208 Barton Springs Rd".into(),
    }];
    meta.task_reminders = vec![TaskReminder {
        id: "reminder-1".into(),
        title: "HVAC filter swap".into(),
        properties_label: "2 properties".into(),
        badge_label: "Due soon".into(),
        badge_variant: BadgeVariant::Destructive,
    }];
    meta.worker_financial_summary = WorkerFinancialSummary {
        total_earnings: 1_240,
        pending_payouts: 85,
        jobs_completed: 14,
        earnings_delta_text: "+12% this month".into(),
        pending_jobs_text: "1 job awaiting approval".into(),
        jobs_completed_delta_text: "+3 this week".into(),
    };
    meta.worker_transactions = vec![WorkerTransaction {
        id: "tx-1".into(),
        bounty_id: "bounty-seed-5".into(),
        title: "Pressure wash driveway".into(),
        property_label: "4512 Duval St".into(),
        completed_on: "2026-01-12".into(),
        amount: 120,
    }];
    meta
}

/// Load the demo dataset when the store has no bounties and no properties.
///
/// Returns `false` when the store already holds data.
pub async fn seed_demo_data(store: &dyn Store, ui: &UiSettings) -> Result<bool, DatabaseError> {
    if !store.list_properties().await?.is_empty() || !store.list_bounties().await?.is_empty() {
        return Ok(false);
    }

    let workers = [
        worker("w1", "Jordan Reed", "JR", "jordan@example.com", 98, 0),
        worker("w2", "Maria Lopez", "ML", "maria@example.com", 95, 1),
        worker("w3", "Sam Patel", "SP", "sam@example.com", 91, 2),
    ];
    for w in &workers {
        store.insert_worker(w).await?;
    }

    let properties = [
        property(
            "p1",
            "1208 Barton Springs Rd",
            "78704",
            "#4821",
            "Lockbox on the side gate.",
            GeoPoint {
                lat: 30.2620,
                lng: -97.7610,
            },
            0,
            ui,
        ),
        property(
            "p2",
            "4512 Duval St",
            "78751",
            "No gate",
            "Tenant works from home, knock first.",
            GeoPoint {
                lat: 30.3118,
                lng: -97.7254,
            },
            1,
            ui,
        ),
    ];
    for p in &properties {
        store.insert_property(p).await?;
    }
    for (property_id, worker_id) in [("p1", "w1"), ("p1", "w2"), ("p2", "w3")] {
        store.link_trusted_worker(property_id, worker_id).await?;
    }

    let window = ui.no_show_timer_seconds;
    let mut bounties = Vec::new();

    let mut filter = bounty_input("p1", "Replace HVAC filter", "Maintenance", 45);
    filter.recursive_scheduling_enabled = true;
    filter.recurrence_cadence = Some(RecurrenceCadence::Monthly);
    bounties.push(lifecycle::new_bounty("bounty-seed-1".into(), filter, window, 0));

    let mut gutters = lifecycle::new_bounty(
        "bounty-seed-2".into(),
        bounty_input("p2", "Clean gutters", "Exterior", 120),
        window,
        1,
    );
    lifecycle::toggle_boost(&mut gutters);
    lifecycle::move_lane(&mut gutters, Lane::Active);
    bounties.push(gutters);

    let mut faucet = lifecycle::new_bounty(
        "bounty-seed-3".into(),
        bounty_input("p1", "Fix leaking faucet", "Plumbing", 85),
        window,
        2,
    );
    lifecycle::accept(&mut faucet, "w1", window);
    bounties.push(faucet);

    let mut smoke = lifecycle::new_bounty(
        "bounty-seed-4".into(),
        bounty_input("p2", "Test smoke detectors", "Safety", 60),
        window,
        3,
    );
    lifecycle::accept(&mut smoke, "w3", window);
    lifecycle::upload_proof_photo(&mut smoke);
    lifecycle::upload_proof_photo(&mut smoke);
    lifecycle::submit_work(&mut smoke);
    bounties.push(smoke);

    let mut driveway = lifecycle::new_bounty(
        "bounty-seed-5".into(),
        bounty_input("p2", "Pressure wash driveway", "Exterior", 120),
        window,
        4,
    );
    lifecycle::accept(&mut driveway, "w2", window);
    lifecycle::submit_work(&mut driveway);
    lifecycle::move_lane(&mut driveway, Lane::PendingPayout);
    bounties.push(driveway);

    for b in &bounties {
        store.insert_bounty(b).await?;
    }

    let templates = [
        ("HVAC filter", "Replace HVAC filter", "Standard 20x25x1 filter.", 45),
        ("Lawn", "Mow and edge lawn", "Front and back yard.", 60),
        ("Turnover clean", "Move-out deep clean", "Kitchen, baths and floors.", 220),
    ];
    for (index, (label, title, description, price)) in (0_i64..).zip(templates) {
        store
            .insert_task_template(&TaskTemplate {
                id: format!("template-seed-{}", index + 1),
                label: label.into(),
                title: title.into(),
                description: description.into(),
                price,
                order_index: index,
            })
            .await?;
    }

    if store.load_meta().await?.is_none() {
        store.save_meta(&seeded_meta(ui.clone())).await?;
    }

    info!(
        workers = workers.len(),
        properties = properties.len(),
        bounties = bounties.len(),
        "Demo data seeded"
    );
    Ok(true)
}
