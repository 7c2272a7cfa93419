//! Reference resolution: turns a raw `(type, value)` reference reported by
//! the API into a typed inventory object.
//!
//! Some managed-object types specialise another one (a storage pod is a
//! folder, a cluster is a compute resource, a vSphere distributed switch is a
//! distributed switch, a vApp is a resource pool). Their wrappers nest the
//! base wrapper, but dispatch always happens on the outer [`TypeTag`].

use crate::error::VmwareResult;
use crate::types::{ManagedObjectReference, TypeTag};

use log::warn;
use serde::{Serialize, Serializer};

/// Anything that carries a managed object reference.
pub trait Reference {
    fn reference(&self) -> &ManagedObjectReference;
}

macro_rules! managed_object {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct $name {
                pub reference: ManagedObjectReference,
            }

            impl Reference for $name {
                fn reference(&self) -> &ManagedObjectReference {
                    &self.reference
                }
            }
        )*
    };
}

managed_object!(
    Folder,
    Datacenter,
    ComputeResource,
    DistributedVirtualSwitch,
    VirtualMachine,
    HostSystem,
    Network,
    ResourcePool,
    DistributedVirtualPortgroup,
    Datastore,
);

/// Datastore cluster; a specialised folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePod {
    pub folder: Folder,
}

/// A compute resource with DRS/HA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterComputeResource {
    pub compute_resource: ComputeResource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualApp {
    pub resource_pool: ResourcePool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmwareDistributedVirtualSwitch {
    pub switch: DistributedVirtualSwitch,
}

impl Reference for StoragePod {
    fn reference(&self) -> &ManagedObjectReference {
        self.folder.reference()
    }
}

impl Reference for ClusterComputeResource {
    fn reference(&self) -> &ManagedObjectReference {
        self.compute_resource.reference()
    }
}

impl Reference for VirtualApp {
    fn reference(&self) -> &ManagedObjectReference {
        self.resource_pool.reference()
    }
}

impl Reference for VmwareDistributedVirtualSwitch {
    fn reference(&self) -> &ManagedObjectReference {
        self.switch.reference()
    }
}

/// A resolved node of the inventory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryObject {
    Folder(Folder),
    Datacenter(Datacenter),
    StoragePod(StoragePod),
    ComputeResource(ComputeResource),
    ClusterComputeResource(ClusterComputeResource),
    DistributedVirtualSwitch(DistributedVirtualSwitch),
    VmwareDistributedVirtualSwitch(VmwareDistributedVirtualSwitch),
    VirtualMachine(VirtualMachine),
    VirtualApp(VirtualApp),
    HostSystem(HostSystem),
    Network(Network),
    ResourcePool(ResourcePool),
    DistributedVirtualPortgroup(DistributedVirtualPortgroup),
    Datastore(Datastore),
}

impl InventoryObject {
    /// The outer type tag, used for container-rule dispatch.
    pub fn tag(&self) -> TypeTag {
        match self {
            InventoryObject::Folder(_) => TypeTag::Folder,
            InventoryObject::Datacenter(_) => TypeTag::Datacenter,
            InventoryObject::StoragePod(_) => TypeTag::StoragePod,
            InventoryObject::ComputeResource(_) => TypeTag::ComputeResource,
            InventoryObject::ClusterComputeResource(_) => TypeTag::ClusterComputeResource,
            InventoryObject::DistributedVirtualSwitch(_) => TypeTag::DistributedVirtualSwitch,
            InventoryObject::VmwareDistributedVirtualSwitch(_) => {
                TypeTag::VmwareDistributedVirtualSwitch
            }
            InventoryObject::VirtualMachine(_) => TypeTag::VirtualMachine,
            InventoryObject::VirtualApp(_) => TypeTag::VirtualApp,
            InventoryObject::HostSystem(_) => TypeTag::HostSystem,
            InventoryObject::Network(_) => TypeTag::Network,
            InventoryObject::ResourcePool(_) => TypeTag::ResourcePool,
            InventoryObject::DistributedVirtualPortgroup(_) => {
                TypeTag::DistributedVirtualPortgroup
            }
            InventoryObject::Datastore(_) => TypeTag::Datastore,
        }
    }

    /// Managed object ID (e.g. "vm-42").
    pub fn id(&self) -> &str {
        &self.reference().value
    }
}

impl Reference for InventoryObject {
    fn reference(&self) -> &ManagedObjectReference {
        match self {
            InventoryObject::Folder(o) => o.reference(),
            InventoryObject::Datacenter(o) => o.reference(),
            InventoryObject::StoragePod(o) => o.reference(),
            InventoryObject::ComputeResource(o) => o.reference(),
            InventoryObject::ClusterComputeResource(o) => o.reference(),
            InventoryObject::DistributedVirtualSwitch(o) => o.reference(),
            InventoryObject::VmwareDistributedVirtualSwitch(o) => o.reference(),
            InventoryObject::VirtualMachine(o) => o.reference(),
            InventoryObject::VirtualApp(o) => o.reference(),
            InventoryObject::HostSystem(o) => o.reference(),
            InventoryObject::Network(o) => o.reference(),
            InventoryObject::ResourcePool(o) => o.reference(),
            InventoryObject::DistributedVirtualPortgroup(o) => o.reference(),
            InventoryObject::Datastore(o) => o.reference(),
        }
    }
}

impl Serialize for InventoryObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.reference().serialize(serializer)
    }
}

/// Resolve a raw reference into its typed wrapper.
///
/// Fails with `UnknownTypeTag` when the API reports a type this crate does
/// not know; the node is never silently dropped.
pub fn resolve(reference: ManagedObjectReference) -> VmwareResult<InventoryObject> {
    let tag = match reference.type_tag.parse::<TypeTag>() {
        Ok(tag) => tag,
        Err(e) => {
            warn!("Rejecting {reference}: type tag not in the inventory taxonomy");
            return Err(e);
        }
    };

    let object = match tag {
        TypeTag::Folder => InventoryObject::Folder(Folder { reference }),
        TypeTag::StoragePod => InventoryObject::StoragePod(StoragePod {
            folder: Folder { reference },
        }),
        TypeTag::Datacenter => InventoryObject::Datacenter(Datacenter { reference }),
        TypeTag::VirtualMachine => InventoryObject::VirtualMachine(VirtualMachine { reference }),
        TypeTag::VirtualApp => InventoryObject::VirtualApp(VirtualApp {
            resource_pool: ResourcePool { reference },
        }),
        TypeTag::ComputeResource => {
            InventoryObject::ComputeResource(ComputeResource { reference })
        }
        TypeTag::ClusterComputeResource => {
            InventoryObject::ClusterComputeResource(ClusterComputeResource {
                compute_resource: ComputeResource { reference },
            })
        }
        TypeTag::HostSystem => InventoryObject::HostSystem(HostSystem { reference }),
        TypeTag::Network => InventoryObject::Network(Network { reference }),
        TypeTag::ResourcePool => InventoryObject::ResourcePool(ResourcePool { reference }),
        TypeTag::DistributedVirtualSwitch => {
            InventoryObject::DistributedVirtualSwitch(DistributedVirtualSwitch { reference })
        }
        TypeTag::VmwareDistributedVirtualSwitch => {
            InventoryObject::VmwareDistributedVirtualSwitch(VmwareDistributedVirtualSwitch {
                switch: DistributedVirtualSwitch { reference },
            })
        }
        TypeTag::DistributedVirtualPortgroup => {
            InventoryObject::DistributedVirtualPortgroup(DistributedVirtualPortgroup { reference })
        }
        TypeTag::Datastore => InventoryObject::Datastore(Datastore { reference }),
    };

    Ok(object)
}
