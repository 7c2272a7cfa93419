//! Aggregate service façade for the inventory crate.
//!
//! `InventoryService` owns the `VsphereClient` and exposes the inventory
//! operations over it. Hosts embedding the crate keep it behind
//! `InventoryServiceState = Arc<Mutex<InventoryService>>`.

use crate::collector::{build_inventory_map, InventoryMap};
use crate::error::{VmwareError, VmwareResult};
use crate::resolver::{HostSystem, VirtualMachine};
use crate::search::{find_host_by_name, find_vm_by_name};
use crate::types::{VsphereConfig, VsphereSession};
use crate::vsphere::VsphereClient;

use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe handle shared between callers.
pub type InventoryServiceState = Arc<Mutex<InventoryService>>;

/// Top-level service wrapping a vSphere connection.
pub struct InventoryService {
    client: Option<VsphereClient>,
    config: Option<VsphereConfig>,
    session: Option<VsphereSession>,
}

impl Default for InventoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryService {
    /// Create a new (disconnected) service.
    pub fn new() -> Self {
        Self {
            client: None,
            config: None,
            session: None,
        }
    }

    /// New disconnected service behind the shared-state wrapper.
    pub fn new_state() -> InventoryServiceState {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Whether we have an active vSphere session.
    pub fn is_connected(&self) -> bool {
        self.client
            .as_ref()
            .map(|c| c.is_connected())
            .unwrap_or(false)
    }

    fn require_client(&self) -> VmwareResult<&VsphereClient> {
        self.client
            .as_ref()
            .filter(|c| c.is_connected())
            .ok_or_else(|| {
                VmwareError::connection("Not connected to vSphere. Call connect first.")
            })
    }

    // ── Connection ──────────────────────────────────────────────────

    /// Connect to a vCenter / ESXi host.
    pub async fn connect(&mut self, config: VsphereConfig) -> VmwareResult<String> {
        let mut client = VsphereClient::new(&config)?;
        let session_id = client.login().await?;
        self.session = Some(VsphereSession {
            host: config.host.clone(),
            username: config.username.clone(),
            session_id: session_id.clone(),
            connected_at: chrono::Utc::now().to_rfc3339(),
        });
        self.config = Some(config);
        self.client = Some(client);
        Ok(session_id)
    }

    /// Disconnect from vSphere.
    pub async fn disconnect(&mut self) -> VmwareResult<()> {
        if let Some(ref mut client) = self.client {
            let _ = client.logout().await;
            info!("Disconnected from {}", client.config().host);
        }
        self.client = None;
        self.config = None;
        self.session = None;
        Ok(())
    }

    /// Get current config (without password).
    pub fn get_config(&self) -> Option<VsphereConfigSafe> {
        self.config.as_ref().map(|c| VsphereConfigSafe {
            host: c.host.clone(),
            port: c.port,
            username: c.username.clone(),
            insecure: c.insecure,
        })
    }

    pub fn session(&self) -> Option<&VsphereSession> {
        self.session.as_ref()
    }

    // ── Inventory ───────────────────────────────────────────────────

    pub async fn inventory_map(&self) -> VmwareResult<InventoryMap> {
        let c = self.require_client()?;
        build_inventory_map(c).await
    }

    pub async fn find_vm_by_name(&self, name: &str) -> VmwareResult<Option<VirtualMachine>> {
        let c = self.require_client()?;
        find_vm_by_name(c, name).await
    }

    pub async fn find_host_by_name(&self, name: &str) -> VmwareResult<Option<HostSystem>> {
        let c = self.require_client()?;
        find_host_by_name(c, name).await
    }
}

/// Config without the password, safe to display.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VsphereConfigSafe {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub insecure: bool,
}
