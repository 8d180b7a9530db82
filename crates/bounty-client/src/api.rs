//! Typed HTTP client for the Bounty server.
//!
//! One method per endpoint. Non-success responses become
//! [`ClientError::Api`] carrying the server's `{"error": ...}` message.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use bounty_core::model::{
    AddTrustedWorkerInput, Bounty, CreateBountyInput, CreatePropertyInput,
    CreateTaskTemplateInput, Lane, PersonBasicInfo, Property, Role, Snapshot, TaskTemplate,
    UpdatePropertyInput,
};

/// Bounty API client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bounty API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Bounty REST API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for a server such as `http://127.0.0.1:8080`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ClientError::Config("server URL is empty".into()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "server URL must start with http:// or https:// (got {base_url})"
            )));
        }

        // reqwest is built with rustls-no-provider; Err means one is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .user_agent(concat!("bounty-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into [`ClientError::Api`].
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .filter(|m| !m.is_empty())
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        debug!(path, "GET");
        let resp = self.http.get(self.url(path)).send().await?;
        Ok(Self::check_status(resp).await?.json().await?)
    }

    async fn send<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        debug!(%method, path, "Request");
        let mut req = self.http.request(method, self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        Ok(Self::check_status(resp).await?.json().await?)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(reqwest::Method::POST, path, Some(body)).await
    }

    async fn patch<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(reqwest::Method::PATCH, path, Some(body)).await
    }

    /// Request with no body.
    async fn call<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<T, ClientError> {
        self.send::<Value, T>(method, path, None).await
    }

    // =========================================================================
    // State
    // =========================================================================

    /// `GET /health`
    pub async fn health(&self) -> Result<Value, ClientError> {
        self.get("/health").await
    }

    pub async fn state(&self) -> Result<Snapshot, ClientError> {
        self.get("/api/state").await
    }

    // =========================================================================
    // Bounties
    // =========================================================================

    pub async fn list_bounties(&self) -> Result<Vec<Bounty>, ClientError> {
        self.get("/api/bounties").await
    }

    pub async fn get_bounty(&self, id: &str) -> Result<Bounty, ClientError> {
        self.get(&format!("/api/bounties/{id}")).await
    }

    pub async fn create_bounty(&self, input: &CreateBountyInput) -> Result<Bounty, ClientError> {
        self.post("/api/bounties", input).await
    }

    pub async fn toggle_boost(&self, id: &str) -> Result<Bounty, ClientError> {
        self.call(reqwest::Method::PATCH, &format!("/api/bounties/{id}/boost"))
            .await
    }

    pub async fn accept_bounty(&self, id: &str, worker_id: &str) -> Result<Bounty, ClientError> {
        self.post(
            &format!("/api/bounties/{id}/accept"),
            &json!({ "workerId": worker_id }),
        )
        .await
    }

    pub async fn upload_proof_photo(&self, id: &str) -> Result<Bounty, ClientError> {
        self.call(reqwest::Method::POST, &format!("/api/bounties/{id}/proof-photo"))
            .await
    }

    pub async fn submit_work(&self, id: &str) -> Result<Bounty, ClientError> {
        self.call(reqwest::Method::POST, &format!("/api/bounties/{id}/submit"))
            .await
    }

    pub async fn reset_bounty(&self, id: &str) -> Result<Bounty, ClientError> {
        self.call(reqwest::Method::POST, &format!("/api/bounties/{id}/reset"))
            .await
    }

    pub async fn move_lane(&self, id: &str, lane: Lane) -> Result<Bounty, ClientError> {
        self.patch(&format!("/api/bounties/{id}/lane"), &json!({ "lane": lane }))
            .await
    }

    /// Returns the deleted ID.
    pub async fn delete_bounty(&self, id: &str) -> Result<String, ClientError> {
        let body: Value = self
            .call(reqwest::Method::DELETE, &format!("/api/bounties/{id}"))
            .await?;
        Ok(body
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(id)
            .to_string())
    }

    /// Count down accepted bounties and return the full list.
    pub async fn tick(&self, seconds: u32) -> Result<Vec<Bounty>, ClientError> {
        self.post("/api/bounties/tick", &json!({ "seconds": seconds }))
            .await
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub async fn add_property(&self, input: &CreatePropertyInput) -> Result<Property, ClientError> {
        self.post("/api/properties", input).await
    }

    pub async fn update_property(
        &self,
        id: &str,
        input: &UpdatePropertyInput,
    ) -> Result<Property, ClientError> {
        self.patch(&format!("/api/properties/{id}"), input).await
    }

    pub async fn update_instructions(
        &self,
        id: &str,
        instructions: &str,
    ) -> Result<Property, ClientError> {
        self.patch(
            &format!("/api/properties/{id}/instructions"),
            &json!({ "instructions": instructions }),
        )
        .await
    }

    pub async fn add_trusted_workers(
        &self,
        property_id: &str,
        workers: &[AddTrustedWorkerInput],
    ) -> Result<Property, ClientError> {
        self.post(
            &format!("/api/properties/{property_id}/trusted-workers"),
            &json!({ "workers": workers }),
        )
        .await
    }

    // =========================================================================
    // Directory and settings
    // =========================================================================

    pub async fn add_global_trusted_workers(
        &self,
        workers: &[AddTrustedWorkerInput],
    ) -> Result<Vec<PersonBasicInfo>, ClientError> {
        self.post("/api/global-trusted-workers", &json!({ "workers": workers }))
            .await
    }

    pub async fn remove_global_trusted_worker(
        &self,
        id: &str,
    ) -> Result<Vec<PersonBasicInfo>, ClientError> {
        self.call(
            reqwest::Method::DELETE,
            &format!("/api/global-trusted-workers/{id}"),
        )
        .await
    }

    /// Record a sign-in. The server returns `null` for a blank email.
    pub async fn sign_in(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Option<PersonBasicInfo>, ClientError> {
        self.post(
            "/api/signed-in-users",
            &json!({ "name": name, "email": email }),
        )
        .await
    }

    pub async fn set_role(&self, role: Role) -> Result<Role, ClientError> {
        self.post("/api/role", &json!({ "role": role })).await
    }

    pub async fn set_default_role(&self, role: Role) -> Result<Role, ClientError> {
        self.patch("/api/settings/default-role", &json!({ "role": role }))
            .await
    }

    pub async fn add_task_template(
        &self,
        input: &CreateTaskTemplateInput,
    ) -> Result<TaskTemplate, ClientError> {
        self.post("/api/task-templates", input).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_url_is_config_error() {
        let err = ApiClient::new("  ").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn url_needs_scheme() {
        let err = ApiClient::new("localhost:8080").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ApiClient::new("http://127.0.0.1:8080/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8080");
        assert_eq!(client.url("/api/state"), "http://127.0.0.1:8080/api/state");
    }

    #[test]
    fn api_error_exposes_status() {
        let err = ClientError::Api {
            status: 404,
            message: "Not found: Bounty x".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Bounty API error (404): Not found: Bounty x");
        assert_eq!(ClientError::Config("x".into()).status(), None);
    }
}
