#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::future::IntoFuture;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Mutex;

use bounty_client::api::{ApiClient, ClientError};
use bounty_client::poller::TickPoller;
use bounty_client::store::{Action, ClientStore};
use bounty_core::model::{
    AddTrustedWorkerInput, CreateBountyInput, CreatePropertyInput, Lane, Role, UiSettings,
    WorkerStatus,
};
use bounty_server::routes::{AppState, build_router};
use bounty_server::service::MarketplaceService;
use bounty_server::store::MemoryStore;

/// Serve a fresh in-memory marketplace on an ephemeral port.
async fn spawn_server() -> ApiClient {
    let service = Arc::new(MarketplaceService::new(
        Arc::new(MemoryStore::new()),
        UiSettings::default(),
    ));
    let app = build_router(AppState { service }, &["*".to_string()]);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(axum::serve(listener, app).into_future());
    ApiClient::new(&format!("http://{addr}")).unwrap()
}

async fn post_job(api: &ApiClient) -> (String, String) {
    let property = api
        .add_property(&CreatePropertyInput {
            address: "12 Oak St".into(),
            city: "Austin, TX".into(),
            zip_code: "78702".into(),
            gate_code: String::new(),
            instructions: String::new(),
            location: None,
        })
        .await
        .unwrap();
    let bounty = api
        .create_bounty(&CreateBountyInput {
            property_id: property.id.clone(),
            title: "Fix fence".into(),
            description: "Two loose boards".into(),
            price: 80,
            kind: "Repair".into(),
            tenant_bridge_enabled: true,
            recursive_scheduling_enabled: false,
            recurrence_cadence: None,
            deadline_at: None,
            image_urls: vec![],
        })
        .await
        .unwrap();
    (property.id, bounty.id)
}

#[tokio::test]
async fn health_reports_ok() {
    let api = spawn_server().await;
    let health = api.health().await.unwrap();
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn job_lifecycle_through_client() {
    let api = spawn_server().await;
    let (property_id, id) = post_job(&api).await;

    let mut store = ClientStore::load(&api, None).await.unwrap();
    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.properties[0].id, property_id);
    assert_eq!(snapshot.properties[0].gate_code, "No gate");
    assert_eq!(snapshot.bounties[0].id, id);

    let boosted = api.toggle_boost(&id).await.unwrap();
    assert!(boosted.boosted);
    assert_eq!(boosted.price, 120);

    let accepted = api.accept_bounty(&id, "w1").await.unwrap();
    assert_eq!(accepted.worker_status, WorkerStatus::Accepted);
    assert_eq!(accepted.owner_lane, Lane::InProgress);
    assert_eq!(accepted.timer_seconds_remaining, 1800);
    assert!(store.dispatch(Action::UpsertBounty(accepted)));

    api.upload_proof_photo(&id).await.unwrap();
    api.upload_proof_photo(&id).await.unwrap();
    let capped = api.upload_proof_photo(&id).await.unwrap();
    assert_eq!(capped.proof_photos_uploaded, 2);

    let submitted = api.submit_work(&id).await.unwrap();
    assert_eq!(submitted.worker_status, WorkerStatus::Submitted);
    assert_eq!(submitted.owner_lane, Lane::Review);

    let paid = api.move_lane(&id, Lane::PendingPayout).await.unwrap();
    assert_eq!(paid.owner_lane, Lane::PendingPayout);

    assert_eq!(api.delete_bounty(&id).await.unwrap(), id);
    store.dispatch(Action::RemoveBounty(id.clone()));
    assert!(store.snapshot().unwrap().bounties.is_empty());
    assert_eq!(api.get_bounty(&id).await.unwrap_err().status(), Some(404));
}

#[tokio::test]
async fn poller_ticks_only_while_a_timer_runs() {
    let api = spawn_server().await;
    let (_, id) = post_job(&api).await;
    let store = Arc::new(Mutex::new(ClientStore::load(&api, None).await.unwrap()));
    let poller = TickPoller::new(api.clone(), Arc::clone(&store));

    assert!(!poller.poll_once().await.unwrap());

    let accepted = api.accept_bounty(&id, "w2").await.unwrap();
    store.lock().await.dispatch(Action::UpsertBounty(accepted));
    assert!(poller.poll_once().await.unwrap());
    assert!(poller.poll_once().await.unwrap());

    let remaining = api.get_bounty(&id).await.unwrap().timer_seconds_remaining;
    assert_eq!(remaining, 1798);
    let local = store.lock().await.snapshot().unwrap().bounties[0].timer_seconds_remaining;
    assert_eq!(local, 1798);

    let reset = api.reset_bounty(&id).await.unwrap();
    assert_eq!(reset.timer_seconds_remaining, 1800);
    store.lock().await.dispatch(Action::UpsertBounty(reset));
    assert!(!poller.poll_once().await.unwrap());
}

#[tokio::test]
async fn hydration_resets_unsaved_role_to_default() {
    let api = spawn_server().await;
    assert_eq!(api.set_role(Role::Worker).await.unwrap(), Role::Worker);

    let store = ClientStore::load(&api, None).await.unwrap();
    assert_eq!(store.snapshot().unwrap().role, Role::Owner);
    assert_eq!(api.state().await.unwrap().role, Role::Owner);

    let store = ClientStore::load(&api, Some(Role::Worker)).await.unwrap();
    assert_eq!(store.snapshot().unwrap().role, Role::Worker);
    assert_eq!(api.state().await.unwrap().role, Role::Worker);

    api.set_default_role(Role::Worker).await.unwrap();
    let store = ClientStore::load(&api, None).await.unwrap();
    assert_eq!(store.snapshot().unwrap().default_role, Role::Worker);
    assert_eq!(store.snapshot().unwrap().role, Role::Worker);
}

#[tokio::test]
async fn api_errors_carry_status_and_message() {
    let api = spawn_server().await;

    let err = api.toggle_boost("missing").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }), "{err}");

    let err = api
        .create_bounty(&CreateBountyInput {
            property_id: "nowhere".into(),
            title: "Ghost".into(),
            description: String::new(),
            price: 10,
            kind: "General".into(),
            tenant_bridge_enabled: true,
            recursive_scheduling_enabled: false,
            recurrence_cadence: None,
            deadline_at: None,
            image_urls: vec![],
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    match err {
        ClientError::Api { message, .. } => assert!(message.contains("nowhere"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn directory_calls_dedupe_by_email() {
    let api = spawn_server().await;
    let draft = AddTrustedWorkerInput {
        email: "Sam@Example.com".into(),
        name: "Sam".into(),
        initials: "SA".into(),
    };

    let list = api
        .add_global_trusted_workers(std::slice::from_ref(&draft))
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    let list = api.add_global_trusted_workers(&[draft]).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].email, "sam@example.com");

    let list = api.remove_global_trusted_worker(&list[0].id).await.unwrap();
    assert!(list.is_empty());

    let person = api.sign_in("Ann", "ann@x.io").await.unwrap().unwrap();
    assert_eq!(person.email, "ann@x.io");
    assert!(api.sign_in("Nobody", "  ").await.unwrap().is_none());
    assert_eq!(api.state().await.unwrap().signed_in_users.len(), 1);
}
