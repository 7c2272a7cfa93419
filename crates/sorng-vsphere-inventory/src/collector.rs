//! Exhaustive collection of the inventory, grouped by type tag.

use crate::client::InventoryClient;
use crate::error::VmwareResult;
use crate::resolver::{InventoryObject, Reference};
use crate::types::{ManagedObjectReference, TypeTag};
use crate::walker::{InventoryWalker, Visit, WalkPolicy};

use log::info;
use serde::Serialize;
use std::collections::BTreeMap;

/// Objects grouped by type tag, each group in walk order.
///
/// No deduplication: an object reachable twice appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InventoryMap {
    entries: BTreeMap<TypeTag, Vec<InventoryObject>>,
}

impl InventoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object to its tag's group.
    pub fn insert(&mut self, object: InventoryObject) {
        self.entries.entry(object.tag()).or_default().push(object);
    }

    /// Append every group of `other` after the existing entries of the same tag.
    ///
    /// The walk itself fills one map in visit order; this is for callers
    /// combining maps from separate walks (e.g. several `collect_from` subtrees).
    pub fn merge(&mut self, other: InventoryMap) {
        for (tag, objects) in other.entries {
            self.entries.entry(tag).or_default().extend(objects);
        }
    }

    pub fn get(&self, tag: TypeTag) -> &[InventoryObject] {
        self.entries.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Raw references of one tag, in walk order.
    pub fn references(&self, tag: TypeTag) -> Vec<&ManagedObjectReference> {
        self.get(tag).iter().map(|o| o.reference()).collect()
    }

    /// Total number of entries across all tags.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tags that have at least one entry.
    pub fn tags(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.entries.keys().copied()
    }

    pub fn counts(&self) -> BTreeMap<TypeTag, usize> {
        self.entries
            .iter()
            .map(|(tag, objects)| (*tag, objects.len()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeTag, &[InventoryObject])> {
        self.entries.iter().map(|(tag, objects)| (*tag, objects.as_slice()))
    }
}

/// Which visited nodes end up in the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectScope {
    /// Every visited node, containers included.
    #[default]
    AllObjects,
    /// Only nodes without a container rule.
    LeavesOnly,
}

/// Walk policy that records nodes and never stops early.
pub struct InventoryCollector {
    scope: CollectScope,
    map: InventoryMap,
}

impl InventoryCollector {
    pub fn new(scope: CollectScope) -> Self {
        Self {
            scope,
            map: InventoryMap::new(),
        }
    }
}

#[async_trait::async_trait]
impl WalkPolicy for InventoryCollector {
    type Output = InventoryMap;

    async fn visit(
        &mut self,
        _client: &dyn InventoryClient,
        object: &InventoryObject,
    ) -> VmwareResult<Visit> {
        if self.scope == CollectScope::AllObjects || !object.tag().is_container() {
            self.map.insert(object.clone());
        }
        Ok(Visit::Continue)
    }

    fn finish(self) -> InventoryMap {
        self.map
    }
}

/// Collect every object below the root folder.
pub async fn build_inventory_map(client: &dyn InventoryClient) -> VmwareResult<InventoryMap> {
    build_inventory_map_with(client, CollectScope::AllObjects).await
}

pub async fn build_inventory_map_with(
    client: &dyn InventoryClient,
    scope: CollectScope,
) -> VmwareResult<InventoryMap> {
    let map = InventoryWalker::new(client)
        .walk_root(InventoryCollector::new(scope))
        .await?;
    info!("Inventory walk complete: {} objects across {} types", map.len(), map.counts().len());
    Ok(map)
}

/// Collect the subtree rooted at `start`, including `start` itself.
pub async fn collect_from(
    client: &dyn InventoryClient,
    start: ManagedObjectReference,
    scope: CollectScope,
) -> VmwareResult<InventoryMap> {
    InventoryWalker::new(client)
        .walk_from(start, InventoryCollector::new(scope))
        .await
}
