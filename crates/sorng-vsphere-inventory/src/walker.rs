//! Depth-first walk over the inventory tree.
//!
//! The descent is shared by every consumer; what happens at each node is
//! decided by a [`WalkPolicy`]. Children are fetched and visited strictly in
//! sequence, pre-order, in the order the API reports them (datacenter folders
//! always VM, Host, Datastore, Network).

use crate::client::{fetch_reference_list, InventoryClient};
use crate::error::VmwareResult;
use crate::resolver::{resolve, InventoryObject, Reference};
use crate::types::{ChildRule, ManagedObjectReference};

use futures::future::BoxFuture;
use log::debug;

/// Outcome of visiting a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the node's children and carry on with its siblings.
    Continue,
    /// End the whole walk now.
    Stop,
}

/// Per-node behaviour plugged into the shared descent.
#[async_trait::async_trait]
pub trait WalkPolicy: Send {
    type Output;

    /// Called for each node before its children are enumerated.
    async fn visit(
        &mut self,
        client: &dyn InventoryClient,
        object: &InventoryObject,
    ) -> VmwareResult<Visit>;

    /// Consume the policy once the walk ends.
    fn finish(self) -> Self::Output;
}

/// Walks the inventory reachable from a client.
pub struct InventoryWalker<'a> {
    client: &'a dyn InventoryClient,
}

impl<'a> InventoryWalker<'a> {
    pub fn new(client: &'a dyn InventoryClient) -> Self {
        Self { client }
    }

    /// Walk everything below the root folder. The root itself is not visited.
    pub async fn walk_root<P: WalkPolicy>(&self, mut policy: P) -> VmwareResult<P::Output> {
        let root = resolve(self.client.root_folder()?)?;
        self.expand(&root, &mut policy).await?;
        Ok(policy.finish())
    }

    /// Walk the subtree rooted at `start`, visiting `start` first.
    pub async fn walk_from<P: WalkPolicy>(
        &self,
        start: ManagedObjectReference,
        mut policy: P,
    ) -> VmwareResult<P::Output> {
        let start = resolve(start)?;
        self.descend(&start, &mut policy).await?;
        Ok(policy.finish())
    }

    fn descend<'b, P: WalkPolicy>(
        &'b self,
        object: &'b InventoryObject,
        policy: &'b mut P,
    ) -> BoxFuture<'b, VmwareResult<Visit>> {
        Box::pin(async move {
            if policy.visit(self.client, object).await? == Visit::Stop {
                return Ok(Visit::Stop);
            }
            self.expand(object, policy).await
        })
    }

    async fn expand<P: WalkPolicy>(
        &self,
        object: &InventoryObject,
        policy: &mut P,
    ) -> VmwareResult<Visit> {
        for child in self.children_of(object).await? {
            let child = resolve(child)?;
            if self.descend(&child, policy).await? == Visit::Stop {
                return Ok(Visit::Stop);
            }
        }
        Ok(Visit::Continue)
    }

    /// Enumerate the children of `object` per its container rule. Each child
    /// is resolved only when the walk reaches it.
    async fn children_of(
        &self,
        object: &InventoryObject,
    ) -> VmwareResult<Vec<ManagedObjectReference>> {
        let Some(rule) = object.tag().child_rule() else {
            return Ok(Vec::new());
        };
        let moref = object.reference();

        let refs = match rule {
            ChildRule::FolderChildren => self.client.children(moref).await?,
            ChildRule::DatacenterFolders => self
                .client
                .datacenter_folders(moref)
                .await?
                .in_walk_order()
                .into_iter()
                .cloned()
                .collect(),
            ChildRule::ReferenceProperty(property) => {
                fetch_reference_list(self.client, moref, property).await?
            }
        };
        debug!("Expanding {moref} ({rule:?}): {} children", refs.len());
        Ok(refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedInventory;

    /// Records the IDs of visited nodes, optionally stopping at one.
    struct Trace {
        seen: Vec<String>,
        stop_at: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl WalkPolicy for Trace {
        type Output = Vec<String>;

        async fn visit(
            &mut self,
            _client: &dyn InventoryClient,
            object: &InventoryObject,
        ) -> VmwareResult<Visit> {
            self.seen.push(object.id().to_string());
            if self.stop_at.is_some_and(|id| id == object.id()) {
                return Ok(Visit::Stop);
            }
            Ok(Visit::Continue)
        }

        fn finish(self) -> Vec<String> {
            self.seen
        }
    }

    fn trace() -> Trace {
        Trace { seen: Vec::new(), stop_at: None }
    }

    #[tokio::test]
    async fn visits_in_pre_order() {
        let mut sim = SimulatedInventory::new();
        let a = sim.add(&sim.root(), "Folder", "a", "a");
        sim.add(&a, "VirtualMachine", "a1", "a1");
        sim.add(&a, "VirtualMachine", "a2", "a2");
        sim.add(&sim.root(), "VirtualMachine", "b", "b");

        let seen = InventoryWalker::new(&sim).walk_root(trace()).await.unwrap();
        assert_eq!(seen, vec!["a", "a1", "a2", "b"]);
    }

    #[tokio::test]
    async fn datacenter_folders_are_walked_in_fixed_order() {
        let mut sim = SimulatedInventory::new();
        let folders = sim.add_datacenter(&sim.root(), "dc-1", "DC1");
        // Populate in reverse so insertion order cannot explain the result.
        sim.add(&folders.network_folder, "Network", "net-1", "VM Network");
        sim.add(&folders.datastore_folder, "Datastore", "ds-1", "ds");
        sim.add(&folders.host_folder, "HostSystem", "host-1", "esx");
        sim.add(&folders.vm_folder, "VirtualMachine", "vm-1", "vm");

        let seen = InventoryWalker::new(&sim).walk_root(trace()).await.unwrap();
        assert_eq!(
            seen,
            vec![
                "dc-1", "dc-1-vm", "vm-1", "dc-1-host", "host-1", "dc-1-datastore", "ds-1",
                "dc-1-network", "net-1",
            ]
        );
    }

    #[tokio::test]
    async fn stop_ends_the_whole_walk() {
        let mut sim = SimulatedInventory::new();
        let a = sim.add(&sim.root(), "Folder", "a", "a");
        sim.add(&a, "VirtualMachine", "a1", "a1");
        sim.add(&a, "VirtualMachine", "a2", "a2");
        sim.add(&sim.root(), "VirtualMachine", "b", "b");

        let policy = Trace { seen: Vec::new(), stop_at: Some("a1") };
        let seen = InventoryWalker::new(&sim).walk_root(policy).await.unwrap();
        assert_eq!(seen, vec!["a", "a1"]);
    }

    #[tokio::test]
    async fn property_sourced_children_are_followed() {
        let mut sim = SimulatedInventory::new();
        let pod = sim.add(&sim.root(), "StoragePod", "pod-1", "pod");
        sim.add(&pod, "Datastore", "ds-1", "ds1");
        let dvs = sim.add(&sim.root(), "VmwareDistributedVirtualSwitch", "dvs-1", "dvs");
        sim.add(&dvs, "DistributedVirtualPortgroup", "pg-1", "pg");

        let seen = InventoryWalker::new(&sim).walk_root(trace()).await.unwrap();
        assert_eq!(seen, vec!["pod-1", "ds-1", "dvs-1", "pg-1"]);
    }

    #[tokio::test]
    async fn walk_from_visits_start_node() {
        let mut sim = SimulatedInventory::new();
        let cluster = sim.add(&sim.root(), "ClusterComputeResource", "c-1", "cl");
        sim.add(&cluster, "HostSystem", "host-1", "esx");

        let seen = InventoryWalker::new(&sim)
            .walk_from(cluster, trace())
            .await
            .unwrap();
        assert_eq!(seen, vec!["c-1", "host-1"]);
    }

    #[tokio::test]
    async fn unknown_child_tag_aborts() {
        let mut sim = SimulatedInventory::new();
        sim.add(&sim.root(), "VirtualMachine", "vm-1", "ok");
        sim.add(&sim.root(), "FutureType", "x-1", "new");

        let err = InventoryWalker::new(&sim).walk_root(trace()).await.unwrap_err();
        assert_eq!(err.kind, crate::error::VmwareErrorKind::UnknownTypeTag);
    }

    #[tokio::test]
    async fn stop_before_unknown_sibling_succeeds() {
        let mut sim = SimulatedInventory::new();
        sim.add(&sim.root(), "VirtualMachine", "vm-1", "ok");
        sim.add(&sim.root(), "FutureType", "x-1", "new");

        let policy = Trace { seen: Vec::new(), stop_at: Some("vm-1") };
        let seen = InventoryWalker::new(&sim).walk_root(policy).await.unwrap();
        assert_eq!(seen, vec!["vm-1"]);
    }
}
