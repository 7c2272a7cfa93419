//! Shared types for vSphere inventory traversal.

use crate::error::{VmwareError, VmwareResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Connection / Config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Top-level configuration for connecting to a vCenter / ESXi host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsphereConfig {
    /// vCenter or ESXi hostname / IP (e.g. "vcenter.lab.local")
    pub host: String,
    /// Port (default 443)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username (e.g. "administrator@vsphere.local")
    pub username: String,
    /// Password
    pub password: String,
    /// Skip TLS certificate verification (self-signed labs)
    #[serde(default)]
    pub insecure: bool,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// VI/JSON API release segment (`/sdk/vim25/{release}/...`)
    #[serde(default = "default_api_release")]
    pub api_release: String,
}

fn default_port() -> u16 { 443 }
fn default_timeout() -> u64 { 30 }
fn default_api_release() -> String { "8.0.1.0".to_string() }

impl Default for VsphereConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            password: String::new(),
            port: 443,
            insecure: false,
            timeout_secs: 30,
            api_release: default_api_release(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tracks an active vSphere API session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsphereSession {
    pub host: String,
    pub username: String,
    pub session_id: String,
    pub connected_at: String,
}

/// The subset of `ServiceContent` needed to log in and start a walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub root_folder: ManagedObjectReference,
    pub session_manager: ManagedObjectReference,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Managed object references
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Opaque `(type, value)` handle into the remote inventory, as reported by
/// the API (e.g. `{"type": "VirtualMachine", "value": "vm-42"}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedObjectReference {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub value: String,
}

impl ManagedObjectReference {
    pub fn new(type_tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ManagedObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_tag, self.value)
    }
}

/// The four fixed sub-folders of a datacenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterFolders {
    pub vm_folder: ManagedObjectReference,
    pub host_folder: ManagedObjectReference,
    pub datastore_folder: ManagedObjectReference,
    pub network_folder: ManagedObjectReference,
}

impl DatacenterFolders {
    /// Folders in walk order: VM, Host, Datastore, Network.
    pub fn in_walk_order(&self) -> [&ManagedObjectReference; 4] {
        [
            &self.vm_folder,
            &self.host_folder,
            &self.datastore_folder,
            &self.network_folder,
        ]
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Type tag taxonomy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Every managed-object type the walker knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Folder,
    Datacenter,
    StoragePod,
    ComputeResource,
    ClusterComputeResource,
    DistributedVirtualSwitch,
    VmwareDistributedVirtualSwitch,
    VirtualMachine,
    VirtualApp,
    HostSystem,
    Network,
    ResourcePool,
    DistributedVirtualPortgroup,
    Datastore,
}

impl TypeTag {
    pub const ALL: [TypeTag; 14] = [
        TypeTag::Folder,
        TypeTag::Datacenter,
        TypeTag::StoragePod,
        TypeTag::ComputeResource,
        TypeTag::ClusterComputeResource,
        TypeTag::DistributedVirtualSwitch,
        TypeTag::VmwareDistributedVirtualSwitch,
        TypeTag::VirtualMachine,
        TypeTag::VirtualApp,
        TypeTag::HostSystem,
        TypeTag::Network,
        TypeTag::ResourcePool,
        TypeTag::DistributedVirtualPortgroup,
        TypeTag::Datastore,
    ];

    /// Wire name of the tag.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Folder => "Folder",
            TypeTag::Datacenter => "Datacenter",
            TypeTag::StoragePod => "StoragePod",
            TypeTag::ComputeResource => "ComputeResource",
            TypeTag::ClusterComputeResource => "ClusterComputeResource",
            TypeTag::DistributedVirtualSwitch => "DistributedVirtualSwitch",
            TypeTag::VmwareDistributedVirtualSwitch => "VmwareDistributedVirtualSwitch",
            TypeTag::VirtualMachine => "VirtualMachine",
            TypeTag::VirtualApp => "VirtualApp",
            TypeTag::HostSystem => "HostSystem",
            TypeTag::Network => "Network",
            TypeTag::ResourcePool => "ResourcePool",
            TypeTag::DistributedVirtualPortgroup => "DistributedVirtualPortgroup",
            TypeTag::Datastore => "Datastore",
        }
    }

    /// How children of this tag are enumerated, or `None` for a leaf.
    pub fn child_rule(self) -> Option<ChildRule> {
        CONTAINER_RULES
            .iter()
            .find(|(tag, _)| *tag == self)
            .map(|(_, rule)| *rule)
    }

    pub fn is_container(self) -> bool {
        self.child_rule().is_some()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = VmwareError;

    fn from_str(s: &str) -> VmwareResult<Self> {
        TypeTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| VmwareError::unknown_type_tag(s))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Container rules
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Strategy for enumerating the children of a container tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRule {
    /// Generic child list of a folder.
    FolderChildren,
    /// The datacenter's VM, Host, Datastore and Network folders.
    DatacenterFolders,
    /// A reference-list property of the object (`childEntity`, `host`, ...).
    ReferenceProperty(&'static str),
}

/// Tags absent from this table are leaves.
pub const CONTAINER_RULES: &[(TypeTag, ChildRule)] = &[
    (TypeTag::Datacenter, ChildRule::DatacenterFolders),
    (TypeTag::Folder, ChildRule::FolderChildren),
    (TypeTag::StoragePod, ChildRule::ReferenceProperty("childEntity")),
    (TypeTag::ComputeResource, ChildRule::ReferenceProperty("host")),
    (TypeTag::ClusterComputeResource, ChildRule::ReferenceProperty("host")),
    (TypeTag::DistributedVirtualSwitch, ChildRule::ReferenceProperty("portgroup")),
    (TypeTag::VmwareDistributedVirtualSwitch, ChildRule::ReferenceProperty("portgroup")),
];
