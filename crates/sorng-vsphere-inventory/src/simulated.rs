//! In-memory inventory for tests and offline demos.
//!
//! Serves a tree built through [`SimulatedInventory::add`] and
//! [`SimulatedInventory::add_datacenter`], records every collaborator call in
//! order, and can be told to fail a given call.

use crate::client::InventoryClient;
use crate::error::{VmwareError, VmwareResult};
use crate::types::{DatacenterFolders, ManagedObjectReference};

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// A collaborator call as seen by the simulated inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCall {
    Children(ManagedObjectReference),
    DatacenterFolders(ManagedObjectReference),
    Property(ManagedObjectReference, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCallKind {
    Children,
    DatacenterFolders,
    Property,
}

impl SimCall {
    pub fn kind(&self) -> SimCallKind {
        match self {
            SimCall::Children(_) => SimCallKind::Children,
            SimCall::DatacenterFolders(_) => SimCallKind::DatacenterFolders,
            SimCall::Property(..) => SimCallKind::Property,
        }
    }

    pub fn target(&self) -> &ManagedObjectReference {
        match self {
            SimCall::Children(r) | SimCall::DatacenterFolders(r) | SimCall::Property(r, _) => r,
        }
    }
}

#[derive(Debug, Default)]
struct SimNode {
    name: String,
    children: Vec<ManagedObjectReference>,
    folders: Option<DatacenterFolders>,
}

struct Fault {
    kind: SimCallKind,
    nth: usize,
    error: VmwareError,
}

pub struct SimulatedInventory {
    root: ManagedObjectReference,
    nodes: HashMap<ManagedObjectReference, SimNode>,
    faults: Vec<Fault>,
    calls: Mutex<Vec<SimCall>>,
}

impl Default for SimulatedInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedInventory {
    /// An inventory holding only an empty root folder (`group-d1`).
    pub fn new() -> Self {
        let root = ManagedObjectReference::new("Folder", "group-d1");
        let mut nodes = HashMap::new();
        nodes.insert(
            root.clone(),
            SimNode {
                name: "Datacenters".to_string(),
                ..SimNode::default()
            },
        );
        Self {
            root,
            nodes,
            faults: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn root(&self) -> ManagedObjectReference {
        self.root.clone()
    }

    /// Add an object as the last child of `parent`. The tag is not checked,
    /// so unknown types can be planted.
    pub fn add(
        &mut self,
        parent: &ManagedObjectReference,
        tag: &str,
        id: &str,
        name: &str,
    ) -> ManagedObjectReference {
        let moref = ManagedObjectReference::new(tag, id);
        self.nodes.insert(
            moref.clone(),
            SimNode {
                name: name.to_string(),
                ..SimNode::default()
            },
        );
        self.nodes
            .entry(parent.clone())
            .or_default()
            .children
            .push(moref.clone());
        moref
    }

    /// Add a datacenter plus its four folders (`{id}-vm`, `{id}-host`,
    /// `{id}-datastore`, `{id}-network`).
    pub fn add_datacenter(
        &mut self,
        parent: &ManagedObjectReference,
        id: &str,
        name: &str,
    ) -> DatacenterFolders {
        let dc = self.add(parent, "Datacenter", id, name);
        let mut folder = |suffix: &str| {
            let moref = ManagedObjectReference::new("Folder", format!("{id}-{suffix}"));
            self.nodes.insert(
                moref.clone(),
                SimNode {
                    name: suffix.to_string(),
                    ..SimNode::default()
                },
            );
            moref
        };
        let folders = DatacenterFolders {
            vm_folder: folder("vm"),
            host_folder: folder("host"),
            datastore_folder: folder("datastore"),
            network_folder: folder("network"),
        };
        if let Some(node) = self.nodes.get_mut(&dc) {
            node.folders = Some(folders.clone());
        }
        folders
    }

    /// Make the `nth` (1-based) call of `kind` fail with `error`.
    pub fn fail_on(&mut self, kind: SimCallKind, nth: usize, error: VmwareError) {
        self.faults.push(Fault { kind, nth, error });
    }

    /// Every call made so far, in order.
    pub async fn calls(&self) -> Vec<SimCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: SimCall) -> VmwareResult<()> {
        let kind = call.kind();
        let mut calls = self.calls.lock().await;
        calls.push(call);
        let nth = calls.iter().filter(|c| c.kind() == kind).count();
        match self.faults.iter().find(|f| f.kind == kind && f.nth == nth) {
            Some(fault) => Err(fault.error.clone()),
            None => Ok(()),
        }
    }

    fn node(&self, moref: &ManagedObjectReference) -> VmwareResult<&SimNode> {
        self.nodes
            .get(moref)
            .ok_or_else(|| VmwareError::not_found(format!("No such object {moref}")))
    }
}

#[async_trait::async_trait]
impl InventoryClient for SimulatedInventory {
    fn root_folder(&self) -> VmwareResult<ManagedObjectReference> {
        Ok(self.root.clone())
    }

    async fn children(
        &self,
        folder: &ManagedObjectReference,
    ) -> VmwareResult<Vec<ManagedObjectReference>> {
        self.record(SimCall::Children(folder.clone())).await?;
        Ok(self.node(folder)?.children.clone())
    }

    async fn datacenter_folders(
        &self,
        datacenter: &ManagedObjectReference,
    ) -> VmwareResult<DatacenterFolders> {
        self.record(SimCall::DatacenterFolders(datacenter.clone())).await?;
        self.node(datacenter)?
            .folders
            .clone()
            .ok_or_else(|| VmwareError::not_found(format!("{datacenter} has no folders")))
    }

    async fn fetch_property(
        &self,
        object: &ManagedObjectReference,
        property: &str,
    ) -> VmwareResult<Value> {
        self.record(SimCall::Property(object.clone(), property.to_string()))
            .await?;
        let node = self.node(object)?;
        let value = match property {
            "name" => Value::String(node.name.clone()),
            "childEntity" | "host" | "portgroup" if !node.children.is_empty() => {
                serde_json::to_value(&node.children)?
            }
            "vmFolder" | "hostFolder" | "datastoreFolder" | "networkFolder" => {
                match &node.folders {
                    Some(folders) => {
                        let all = serde_json::to_value(folders)?;
                        all.get(property).cloned().unwrap_or(Value::Null)
                    }
                    None => Value::Null,
                }
            }
            _ => Value::Null,
        };
        Ok(value)
    }
}
