//! vSphere VI/JSON API client with session-based authentication.
//!
//! Communicates with vCenter / ESXi via
//! `https://{host}:{port}/sdk/vim25/{release}/...`. Managed-object
//! properties are read with `GET /{type}/{id}/{property}`, which is all the
//! inventory walk needs.

use crate::client::{fetch_property_as, InventoryClient};
use crate::error::{VmwareError, VmwareErrorKind, VmwareResult};
use crate::types::{DatacenterFolders, ManagedObjectReference, ServiceContent, VsphereConfig};

use log::info;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

const SESSION_HEADER: &str = "vmware-api-session-id";

/// vSphere VI/JSON API client.
pub struct VsphereClient {
    client: Client,
    base_url: String,
    session_id: Option<String>,
    content: Option<ServiceContent>,
    config: VsphereConfig,
}

impl VsphereClient {
    /// Build a new client from config (does NOT create a session yet).
    pub fn new(config: &VsphereConfig) -> VmwareResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VmwareError::connection(format!("Failed to build HTTP client: {e}")))?;

        let base_url = format!(
            "https://{}:{}/sdk/vim25/{}",
            config.host, config.port, config.api_release
        );

        Ok(Self {
            client,
            base_url,
            session_id: None,
            content: None,
            config: config.clone(),
        })
    }

    /// Base URL for API calls.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether we have an active session.
    pub fn is_connected(&self) -> bool {
        self.session_id.is_some()
    }

    /// Current session ID (if any).
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Current config.
    pub fn config(&self) -> &VsphereConfig {
        &self.config
    }

    // ── Session management ──────────────────────────────────────────

    /// Retrieve the service content and log in through the session manager.
    pub async fn login(&mut self) -> VmwareResult<String> {
        let url = format!(
            "{}/ServiceInstance/ServiceInstance/RetrieveServiceContent",
            self.base_url
        );
        let resp = self.client.post(&url).send().await?;
        let resp = Self::check_status(resp).await?;
        let content: ServiceContent = serde_json::from_value(Self::parse_response(resp).await?)
            .map_err(|e| VmwareError::parse(format!("Unexpected service content: {e}")))?;

        let url = format!(
            "{}/SessionManager/{}/Login",
            self.base_url, content.session_manager.value
        );
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "userName": self.config.username,
                "password": self.config.password,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VmwareError::auth(format!("Login failed ({status}): {body}")));
        }

        let session_id = resp
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| VmwareError::auth("Login response carried no session token"))?;

        info!("Logged in to {} as {}", self.config.host, self.config.username);
        self.session_id = Some(session_id.clone());
        self.content = Some(content);
        Ok(session_id)
    }

    /// End the current session. Failures are ignored; local state is cleared.
    pub async fn logout(&mut self) -> VmwareResult<()> {
        if let (Some(sid), Some(content)) = (&self.session_id, &self.content) {
            let url = format!(
                "{}/SessionManager/{}/Logout",
                self.base_url, content.session_manager.value
            );
            let _ = self
                .client
                .post(&url)
                .header(SESSION_HEADER, sid.as_str())
                .send()
                .await;
        }
        self.session_id = None;
        self.content = None;
        Ok(())
    }

    // ── HTTP helpers ────────────────────────────────────────────────

    fn require_session(&self) -> VmwareResult<&str> {
        self.session_id
            .as_deref()
            .ok_or_else(|| VmwareError::auth("Not logged in — no active session"))
    }

    /// GET a single property of a managed object.
    pub async fn get_property(
        &self,
        object: &ManagedObjectReference,
        property: &str,
    ) -> VmwareResult<Value> {
        let sid = self.require_session()?;
        let url = format!(
            "{}/{}/{}/{}",
            self.base_url, object.type_tag, object.value, property
        );
        let resp = self
            .client
            .get(&url)
            .header(SESSION_HEADER, sid)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        Self::parse_response(resp).await
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn check_status(resp: Response) -> VmwareResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => Err(VmwareError::auth(format!("Session expired or invalid: {body}"))),
            StatusCode::FORBIDDEN => Err(VmwareError::new(
                VmwareErrorKind::AccessDenied,
                format!("Access denied: {body}"),
            )),
            StatusCode::NOT_FOUND => Err(VmwareError::not_found(format!("Resource not found: {body}"))),
            _ => Err(VmwareError::api(code, format!("API error {code}: {body}"))),
        }
    }

    async fn parse_response(resp: Response) -> VmwareResult<Value> {
        let text = resp.text().await.map_err(|e| {
            VmwareError::parse(format!("Failed to read response body: {e}"))
        })?;
        parse_body(&text)
    }
}

/// Unset properties come back as an empty body.
fn parse_body(text: &str) -> VmwareResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| {
        let end = text.char_indices().nth(500).map_or(text.len(), |(i, _)| i);
        VmwareError::parse(format!("JSON parse error: {e} — body: {}", &text[..end]))
    })
}

#[async_trait::async_trait]
impl InventoryClient for VsphereClient {
    fn root_folder(&self) -> VmwareResult<ManagedObjectReference> {
        self.content
            .as_ref()
            .map(|c| c.root_folder.clone())
            .ok_or_else(|| VmwareError::connection("Not connected to vSphere. Call login first."))
    }

    async fn children(
        &self,
        folder: &ManagedObjectReference,
    ) -> VmwareResult<Vec<ManagedObjectReference>> {
        let refs: Option<Vec<ManagedObjectReference>> =
            fetch_property_as(self, folder, "childEntity").await?;
        Ok(refs.unwrap_or_default())
    }

    async fn datacenter_folders(
        &self,
        datacenter: &ManagedObjectReference,
    ) -> VmwareResult<DatacenterFolders> {
        Ok(DatacenterFolders {
            vm_folder: fetch_property_as(self, datacenter, "vmFolder").await?,
            host_folder: fetch_property_as(self, datacenter, "hostFolder").await?,
            datastore_folder: fetch_property_as(self, datacenter, "datastoreFolder").await?,
            network_folder: fetch_property_as(self, datacenter, "networkFolder").await?,
        })
    }

    async fn fetch_property(
        &self,
        object: &ManagedObjectReference,
        property: &str,
    ) -> VmwareResult<Value> {
        self.get_property(object, property).await
    }
}
