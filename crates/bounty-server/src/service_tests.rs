//! Tests for `MarketplaceService`.

use std::sync::Arc;

use bounty_core::model::{
    AddTrustedWorkerInput, AppMeta, CreateBountyInput, CreatePropertyInput,
    CreateTaskTemplateInput, Lane, Role, UiSettings, UpdatePropertyInput, WorkerStatus,
};

use super::{MarketplaceService, NO_GATE, ServiceError};
use crate::storage::Database;
use crate::store::{MemoryStore, Store};

const WINDOW: u32 = 1800;

fn memory_service() -> MarketplaceService {
    MarketplaceService::new(Arc::new(MemoryStore::new()), UiSettings::default())
}

async fn sqlite_service() -> MarketplaceService {
    let db = Database::open_in_memory().await.unwrap();
    MarketplaceService::new(Arc::new(db), UiSettings::default())
}

async fn add_property(service: &MarketplaceService) -> String {
    service
        .add_property(CreatePropertyInput {
            address: "12 Oak St".into(),
            city: "Austin, TX".into(),
            zip_code: "78701".into(),
            gate_code: String::new(),
            instructions: String::new(),
            location: None,
        })
        .await
        .unwrap()
        .id
}

fn bounty_input(property_id: &str, price: i64) -> CreateBountyInput {
    CreateBountyInput {
        property_id: property_id.into(),
        title: "Replace air filter".into(),
        description: String::new(),
        price,
        kind: "Maintenance".into(),
        tenant_bridge_enabled: true,
        recursive_scheduling_enabled: false,
        recurrence_cadence: None,
        deadline_at: None,
        image_urls: vec![],
    }
}

fn trusted(email: &str, name: &str) -> AddTrustedWorkerInput {
    AddTrustedWorkerInput {
        email: email.into(),
        name: name.into(),
        initials: String::new(),
    }
}

// --- Full job ---

async fn run_full_job(service: &MarketplaceService) {
    let property_id = add_property(service).await;
    let bounty = service
        .create_bounty(bounty_input(&property_id, 20))
        .await
        .unwrap();
    assert_eq!(bounty.owner_lane, Lane::Backlog);
    assert_eq!(bounty.timer_seconds_remaining, WINDOW);

    let bounty = service.toggle_bounty_boost(&bounty.id).await.unwrap();
    assert_eq!(bounty.price, 30);

    let bounty = service.accept_bounty(&bounty.id, "w1").await.unwrap();
    assert_eq!(bounty.owner_lane, Lane::InProgress);
    assert_eq!(bounty.worker_status, WorkerStatus::Accepted);

    service.upload_bounty_proof_photo(&bounty.id).await.unwrap();
    let bounty = service.upload_bounty_proof_photo(&bounty.id).await.unwrap();
    assert_eq!(bounty.proof_photos_uploaded, 2);

    let bounty = service.submit_bounty_work(&bounty.id).await.unwrap();
    assert_eq!(bounty.owner_lane, Lane::Review);
    assert_eq!(bounty.worker_status, WorkerStatus::PendingApproval);
    assert_eq!(bounty.timer_seconds_remaining, 0);

    // Persisted, not just returned.
    assert_eq!(service.get_bounty(&bounty.id).await.unwrap(), bounty);
}

#[tokio::test]
async fn full_job_in_memory() {
    run_full_job(&memory_service()).await;
}

#[tokio::test]
async fn full_job_in_sqlite() {
    run_full_job(&sqlite_service().await).await;
}

// --- Bounty lifecycle ---

#[tokio::test]
async fn create_rejects_negative_price_and_unknown_property() {
    let service = memory_service();
    let property_id = add_property(&service).await;

    let err = service
        .create_bounty(bounty_input(&property_id, -1))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = service
        .create_bounty(bounty_input("p-missing", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    assert!(service.list_bounties().await.unwrap().is_empty());
}

#[tokio::test]
async fn new_bounties_go_on_top() {
    let service = memory_service();
    let property_id = add_property(&service).await;
    let first = service
        .create_bounty(bounty_input(&property_id, 10))
        .await
        .unwrap();
    let second = service
        .create_bounty(bounty_input(&property_id, 10))
        .await
        .unwrap();

    let ids: Vec<_> = service
        .list_bounties()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn boost_is_noop_once_accepted() {
    let service = memory_service();
    let property_id = add_property(&service).await;
    let bounty = service
        .create_bounty(bounty_input(&property_id, 11))
        .await
        .unwrap();

    let boosted = service.toggle_bounty_boost(&bounty.id).await.unwrap();
    assert_eq!(boosted.price, 17);

    service.accept_bounty(&bounty.id, "w1").await.unwrap();
    let after = service.toggle_bounty_boost(&bounty.id).await.unwrap();
    assert_eq!(after.price, 17);
    assert!(after.boosted);
}

#[tokio::test]
async fn accept_then_reset_returns_to_active() {
    let service = memory_service();
    let property_id = add_property(&service).await;
    let bounty = service
        .create_bounty(bounty_input(&property_id, 10))
        .await
        .unwrap();

    service.accept_bounty(&bounty.id, "w1").await.unwrap();
    let reset = service.reset_bounty_to_available(&bounty.id).await.unwrap();
    assert_eq!(reset.worker_status, WorkerStatus::Available);
    assert_eq!(reset.owner_lane, Lane::Active);
    assert!(reset.accepted_by_worker_id.is_none());
}

#[tokio::test]
async fn accept_requires_worker_id() {
    let service = memory_service();
    let property_id = add_property(&service).await;
    let bounty = service
        .create_bounty(bounty_input(&property_id, 10))
        .await
        .unwrap();
    let err = service.accept_bounty(&bounty.id, "  ").await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn unknown_bounty_is_not_found() {
    let service = memory_service();
    for result in [
        service.toggle_bounty_boost("nope").await,
        service.accept_bounty("nope", "w1").await,
        service.submit_bounty_work("nope").await,
        service.move_bounty_lane("nope", Lane::Review).await,
    ] {
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}

#[tokio::test]
async fn lane_moves_can_skip_columns() {
    let service = memory_service();
    let property_id = add_property(&service).await;
    let bounty = service
        .create_bounty(bounty_input(&property_id, 10))
        .await
        .unwrap();
    let moved = service
        .move_bounty_lane(&bounty.id, Lane::PendingPayout)
        .await
        .unwrap();
    assert_eq!(moved.owner_lane, Lane::PendingPayout);
}

#[tokio::test]
async fn delete_is_unconditional() {
    let service = memory_service();
    let property_id = add_property(&service).await;
    let bounty = service
        .create_bounty(bounty_input(&property_id, 10))
        .await
        .unwrap();
    assert_eq!(service.delete_bounty(&bounty.id).await.unwrap(), bounty.id);
    assert_eq!(service.delete_bounty(&bounty.id).await.unwrap(), bounty.id);
    assert!(service.list_bounties().await.unwrap().is_empty());
}

#[tokio::test]
async fn tick_counts_down_accepted_only() {
    let service = sqlite_service().await;
    let property_id = add_property(&service).await;
    let open = service
        .create_bounty(bounty_input(&property_id, 10))
        .await
        .unwrap();
    let taken = service
        .create_bounty(bounty_input(&property_id, 10))
        .await
        .unwrap();
    service.accept_bounty(&taken.id, "w1").await.unwrap();

    let bounties = service.tick_accepted_bounties(5).await.unwrap();
    let find = |id: &str| bounties.iter().find(|b| b.id == id).unwrap().clone();
    assert_eq!(find(&open.id).timer_seconds_remaining, WINDOW);
    assert_eq!(find(&taken.id).timer_seconds_remaining, WINDOW - 5);

    service.tick_accepted_bounties(WINDOW * 2).await.unwrap();
    let stored = service.get_bounty(&taken.id).await.unwrap();
    assert_eq!(stored.timer_seconds_remaining, 0);
}

#[tokio::test]
async fn concurrent_ticks_are_serialised() {
    let service = Arc::new(memory_service());
    let property_id = add_property(&service).await;
    let bounty = service
        .create_bounty(bounty_input(&property_id, 10))
        .await
        .unwrap();
    service.accept_bounty(&bounty.id, "w1").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service.tick_accepted_bounties(1).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = service.get_bounty(&bounty.id).await.unwrap();
    assert_eq!(stored.timer_seconds_remaining, WINDOW - 20);
}

#[tokio::test]
async fn snapshot_backfill_waits_for_writers() {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(MarketplaceService::new(store.clone(), UiSettings::default()));
    let mut legacy = AppMeta::with_ui(UiSettings::default());
    legacy.default_role = None;
    store.save_meta(&legacy).await.unwrap();

    // A writer holds the lock while the reader needs a back-fill.
    let guard = service.write_lock.lock().await;
    let reader = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.snapshot().await.unwrap() })
    };
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!reader.is_finished());

    let mut changed = store.load_meta().await.unwrap().unwrap();
    changed.role = Role::Worker;
    store.save_meta(&changed).await.unwrap();
    drop(guard);

    let snapshot = reader.await.unwrap();
    assert_eq!(snapshot.role, Role::Worker);
    let stored = store.load_meta().await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Worker);
    assert_eq!(stored.default_role, Some(Role::Owner));
}

#[tokio::test]
async fn snapshot_does_not_undo_concurrent_role_change() {
    let service = Arc::new(memory_service());
    service.snapshot().await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            if i == 10 {
                service.set_role(Role::Worker).await.unwrap();
            } else {
                service.snapshot().await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(service.snapshot().await.unwrap().role, Role::Worker);
}

// --- Properties ---

#[tokio::test]
async fn new_property_defaults() {
    let service = memory_service();
    let property = service
        .add_property(CreatePropertyInput {
            address: "1 Elm".into(),
            city: "Austin, TX".into(),
            zip_code: "78702".into(),
            gate_code: "  ".into(),
            instructions: "Ring twice".into(),
            location: None,
        })
        .await
        .unwrap();
    assert_eq!(property.gate_code, NO_GATE);
    assert_eq!(property.image, UiSettings::default().property_placeholder_image);
    assert!(property.whitelisted_workers.is_empty());
}

#[tokio::test]
async fn update_property_keeps_trusted_workers() {
    let service = sqlite_service().await;
    let property_id = add_property(&service).await;
    service
        .add_trusted_workers(&property_id, vec![trusted("sam@x.io", "Sam")])
        .await
        .unwrap();

    let updated = service
        .update_property(
            &property_id,
            UpdatePropertyInput {
                address: "14 Oak St".into(),
                city: "Austin, TX".into(),
                zip_code: "78701".into(),
                gate_code: "4321".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.address, "14 Oak St");
    assert_eq!(updated.gate_code, "4321");
    assert_eq!(updated.whitelisted_workers.len(), 1);

    let updated = service
        .update_property_instructions(&property_id, "Key in lockbox".into())
        .await
        .unwrap();
    assert_eq!(updated.instructions, "Key in lockbox");
    assert_eq!(updated.whitelisted_workers[0].name, "Sam");
}

#[tokio::test]
async fn update_unknown_property_is_not_found() {
    let service = memory_service();
    let err = service
        .update_property_instructions("p-missing", String::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn trusted_worker_add_dedupes_by_email() {
    let service = memory_service();
    let property_id = add_property(&service).await;

    let property = service
        .add_trusted_workers(
            &property_id,
            vec![trusted("Sam@X.io", "Sam"), trusted("sam@x.io", "Samuel")],
        )
        .await
        .unwrap();
    assert_eq!(property.whitelisted_workers.len(), 1);

    let property = service
        .add_trusted_workers(&property_id, vec![trusted("SAM@x.IO", "Other")])
        .await
        .unwrap();
    assert_eq!(property.whitelisted_workers.len(), 1);
    assert_eq!(property.whitelisted_workers[0].initials, "SA");
}

#[tokio::test]
async fn trusted_worker_reuses_existing_worker_row() {
    let service = sqlite_service().await;
    let first = add_property(&service).await;
    let second = add_property(&service).await;

    service
        .add_trusted_workers(&first, vec![trusted("lee@x.io", "Lee")])
        .await
        .unwrap();
    let property = service
        .add_trusted_workers(&second, vec![trusted("LEE@x.io", "")])
        .await
        .unwrap();

    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.workers.len(), 1);
    assert_eq!(property.whitelisted_workers[0].id, snapshot.workers[0].id);
    assert_eq!(property.whitelisted_workers[0].name, "Lee");
}

#[tokio::test]
async fn add_trusted_to_unknown_property_is_not_found() {
    let service = memory_service();
    let err = service
        .add_trusted_workers("p-missing", vec![trusted("a@x.io", "A")])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

// --- Directory ---

#[tokio::test]
async fn global_trusted_workers_dedupe_and_normalise() {
    let service = sqlite_service().await;
    let list = service
        .add_global_trusted_workers(vec![
            AddTrustedWorkerInput {
                email: " Pat@Example.com ".into(),
                name: String::new(),
                initials: "xyz".into(),
            },
            trusted("pat@example.com", "Pat"),
            trusted("", "Nobody"),
            trusted("lee@example.com", "Lee"),
        ])
        .await
        .unwrap();

    assert_eq!(list.len(), 2);
    // Newest on top.
    assert_eq!(list[0].email, "lee@example.com");
    assert_eq!(list[1].email, "pat@example.com");
    assert_eq!(list[1].name, "pat@example.com");
    assert_eq!(list[1].initials, "XY");

    let again = service
        .add_global_trusted_workers(vec![trusted("LEE@example.com", "Lee")])
        .await
        .unwrap();
    assert_eq!(again.len(), 2);

    let after = service
        .remove_global_trusted_worker(&list[0].id)
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(
        service
            .remove_global_trusted_worker("gtw-missing")
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn signed_in_users_show_in_snapshot() {
    let service = memory_service();
    assert!(
        service
            .upsert_signed_in_user("Ann", "  ")
            .await
            .unwrap()
            .is_none()
    );
    let person = service
        .upsert_signed_in_user("", "Ann@Example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(person.id, "ann@example.com");
    assert_eq!(person.name, "ann@example.com");

    service
        .upsert_signed_in_user("Ann Lee", "ann@example.com")
        .await
        .unwrap();
    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.signed_in_users.len(), 1);
    assert_eq!(snapshot.signed_in_users[0].name, "Ann Lee");
    assert_eq!(snapshot.signed_in_users[0].initials, "AN");
}

// --- Settings ---

#[tokio::test]
async fn snapshot_creates_settings_row() {
    let store = Arc::new(MemoryStore::new());
    let service = MarketplaceService::new(store.clone(), UiSettings::default());
    assert!(store.load_meta().await.unwrap().is_none());

    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.role, Role::Owner);
    assert_eq!(snapshot.default_role, Role::Owner);
    assert_eq!(snapshot.ui.no_show_timer_seconds, WINDOW);
    assert!(store.load_meta().await.unwrap().is_some());
}

#[tokio::test]
async fn missing_default_role_is_backfilled() {
    let store = Arc::new(MemoryStore::new());
    let mut meta = AppMeta::with_ui(UiSettings::default());
    meta.default_role = None;
    meta.role = Role::Worker;
    store.save_meta(&meta).await.unwrap();

    let service = MarketplaceService::new(store.clone(), UiSettings::default());
    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.role, Role::Worker);
    assert_eq!(snapshot.default_role, Role::Owner);
    assert_eq!(
        store.load_meta().await.unwrap().unwrap().default_role,
        Some(Role::Owner)
    );
}

#[tokio::test]
async fn roles_persist() {
    let service = sqlite_service().await;
    assert_eq!(service.set_role(Role::Worker).await.unwrap(), Role::Worker);
    assert_eq!(
        service.set_default_role(Role::Worker).await.unwrap(),
        Role::Worker
    );
    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.role, Role::Worker);
    assert_eq!(snapshot.default_role, Role::Worker);
}

#[tokio::test]
async fn configured_window_drives_timers() {
    let ui = UiSettings {
        no_show_timer_seconds: 90,
        ..UiSettings::default()
    };
    let service = MarketplaceService::new(Arc::new(MemoryStore::new()), ui);
    let property_id = add_property(&service).await;
    let bounty = service
        .create_bounty(bounty_input(&property_id, 10))
        .await
        .unwrap();
    assert_eq!(bounty.timer_seconds_remaining, 90);
    let bounty = service.accept_bounty(&bounty.id, "w1").await.unwrap();
    assert_eq!(bounty.timer_seconds_remaining, 90);
}

#[tokio::test]
async fn task_templates_go_on_top() {
    let service = memory_service();
    let make = |label: &str| CreateTaskTemplateInput {
        label: label.into(),
        title: "Title".into(),
        description: String::new(),
        price: 25,
    };
    service.add_task_template(make("first")).await.unwrap();
    service.add_task_template(make("second")).await.unwrap();
    let err = service
        .add_task_template(CreateTaskTemplateInput {
            price: -5,
            ..make("bad")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let labels: Vec<_> = service
        .snapshot()
        .await
        .unwrap()
        .task_templates
        .into_iter()
        .map(|t| t.label)
        .collect();
    assert_eq!(labels, vec!["second", "first"]);
}
