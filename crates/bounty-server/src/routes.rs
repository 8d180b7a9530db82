//! HTTP surface of the marketplace.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use bounty_core::model::{
    AddTrustedWorkerInput, Bounty, CreateBountyInput, CreatePropertyInput,
    CreateTaskTemplateInput, Lane, PersonBasicInfo, Property, Role, Snapshot, TaskTemplate,
    UpdatePropertyInput,
};

use crate::service::{MarketplaceService, ServiceError};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MarketplaceService>,
}

/// Error body returned by every failing handler.
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Storage(e) => {
                error!(error = %e, "Storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// --- Request bodies ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcceptBody {
    #[serde(default)]
    worker_id: String,
}

#[derive(Deserialize)]
struct LaneBody {
    lane: Lane,
}

#[derive(Deserialize, Default)]
struct TickBody {
    seconds: Option<u32>,
}

#[derive(Deserialize)]
struct InstructionsBody {
    #[serde(default)]
    instructions: String,
}

#[derive(Deserialize)]
struct WorkersBody {
    #[serde(default)]
    workers: Vec<AddTrustedWorkerInput>,
}

#[derive(Deserialize)]
struct RoleBody {
    role: Role,
}

#[derive(Deserialize)]
struct SignInBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

/// Build the router with tracing and CORS layers.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/state", get(state_snapshot))
        // Bounties
        .route("/api/bounties", get(list_bounties).post(create_bounty))
        .route("/api/bounties/tick", post(tick))
        .route("/api/bounties/{id}", get(get_bounty).delete(delete_bounty))
        .route("/api/bounties/{id}/accept", post(accept_bounty))
        .route("/api/bounties/{id}/boost", patch(toggle_boost))
        .route("/api/bounties/{id}/lane", patch(move_lane))
        .route("/api/bounties/{id}/submit", post(submit_work))
        .route("/api/bounties/{id}/proof-photo", post(upload_proof_photo))
        .route("/api/bounties/{id}/reset", post(reset_bounty))
        // Properties
        .route("/api/properties", post(add_property))
        .route("/api/properties/{id}", patch(update_property))
        .route(
            "/api/properties/{id}/instructions",
            patch(update_instructions),
        )
        .route(
            "/api/properties/{id}/trusted-workers",
            post(add_trusted_workers),
        )
        // Directory and settings
        .route("/api/global-trusted-workers", post(add_global_trusted))
        .route(
            "/api/global-trusted-workers/{id}",
            delete(remove_global_trusted),
        )
        .route("/api/signed-in-users", post(sign_in))
        .route("/api/role", post(set_role))
        .route("/api/settings/default-role", patch(set_default_role))
        .route("/api/task-templates", post(add_task_template))
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured origins. `*` allows any origin.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(tower_http::cors::Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// `GET /health`
async fn health(State(state): State<AppState>) -> Response {
    match state.service.store().ping().await {
        Ok(()) => Json(json!({ "status": "ok", "store": "ok" })).into_response(),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "store": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// `GET /api/state`
async fn state_snapshot(State(state): State<AppState>) -> ApiResult<Snapshot> {
    Ok(Json(state.service.snapshot().await?))
}

// =========================================================================
// Bounty handlers
// =========================================================================

async fn list_bounties(State(state): State<AppState>) -> ApiResult<Vec<Bounty>> {
    Ok(Json(state.service.list_bounties().await?))
}

async fn create_bounty(
    State(state): State<AppState>,
    Json(input): Json<CreateBountyInput>,
) -> ApiResult<Bounty> {
    Ok(Json(state.service.create_bounty(input).await?))
}

async fn get_bounty(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Bounty> {
    Ok(Json(state.service.get_bounty(&id).await?))
}

async fn delete_bounty(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let id = state.service.delete_bounty(&id).await?;
    Ok(Json(json!({ "id": id })))
}

async fn accept_bounty(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AcceptBody>,
) -> ApiResult<Bounty> {
    Ok(Json(state.service.accept_bounty(&id, &body.worker_id).await?))
}

async fn toggle_boost(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Bounty> {
    Ok(Json(state.service.toggle_bounty_boost(&id).await?))
}

async fn move_lane(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<LaneBody>,
) -> ApiResult<Bounty> {
    Ok(Json(state.service.move_bounty_lane(&id, body.lane).await?))
}

async fn submit_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Bounty> {
    Ok(Json(state.service.submit_bounty_work(&id).await?))
}

async fn upload_proof_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Bounty> {
    Ok(Json(state.service.upload_bounty_proof_photo(&id).await?))
}

async fn reset_bounty(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Bounty> {
    Ok(Json(state.service.reset_bounty_to_available(&id).await?))
}

/// `POST /api/bounties/tick`. The body is optional; `seconds` defaults to 1.
async fn tick(State(state): State<AppState>, body: Bytes) -> ApiResult<Vec<Bounty>> {
    let body: TickBody = if body.iter().all(u8::is_ascii_whitespace) {
        TickBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ServiceError::Validation(format!("invalid tick body: {e}")))?
    };
    let seconds = body.seconds.unwrap_or(1);
    Ok(Json(state.service.tick_accepted_bounties(seconds).await?))
}

// =========================================================================
// Property handlers
// =========================================================================

async fn add_property(
    State(state): State<AppState>,
    Json(input): Json<CreatePropertyInput>,
) -> ApiResult<Property> {
    Ok(Json(state.service.add_property(input).await?))
}

async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePropertyInput>,
) -> ApiResult<Property> {
    Ok(Json(state.service.update_property(&id, input).await?))
}

async fn update_instructions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<InstructionsBody>,
) -> ApiResult<Property> {
    Ok(Json(
        state
            .service
            .update_property_instructions(&id, body.instructions)
            .await?,
    ))
}

async fn add_trusted_workers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<WorkersBody>,
) -> ApiResult<Property> {
    Ok(Json(
        state.service.add_trusted_workers(&id, body.workers).await?,
    ))
}

// =========================================================================
// Directory and settings handlers
// =========================================================================

async fn add_global_trusted(
    State(state): State<AppState>,
    Json(body): Json<WorkersBody>,
) -> ApiResult<Vec<PersonBasicInfo>> {
    Ok(Json(
        state.service.add_global_trusted_workers(body.workers).await?,
    ))
}

async fn remove_global_trusted(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<PersonBasicInfo>> {
    Ok(Json(state.service.remove_global_trusted_worker(&id).await?))
}

/// `POST /api/signed-in-users`. Returns `null` for a blank email.
async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInBody>,
) -> ApiResult<Option<PersonBasicInfo>> {
    Ok(Json(
        state
            .service
            .upsert_signed_in_user(&body.name, &body.email)
            .await?,
    ))
}

async fn set_role(State(state): State<AppState>, Json(body): Json<RoleBody>) -> ApiResult<Role> {
    Ok(Json(state.service.set_role(body.role).await?))
}

async fn set_default_role(
    State(state): State<AppState>,
    Json(body): Json<RoleBody>,
) -> ApiResult<Role> {
    Ok(Json(state.service.set_default_role(body.role).await?))
}

async fn add_task_template(
    State(state): State<AppState>,
    Json(input): Json<CreateTaskTemplateInput>,
) -> ApiResult<TaskTemplate> {
    Ok(Json(state.service.add_task_template(input).await?))
}
