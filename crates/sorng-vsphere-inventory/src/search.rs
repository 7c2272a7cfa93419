//! First-match search over the inventory.
//!
//! The walk stops at the first node, in depth-first pre-order, whose
//! predicate holds; later siblings and subtrees are never fetched.

use crate::client::{fetch_property_as, InventoryClient};
use crate::error::VmwareResult;
use crate::resolver::{HostSystem, InventoryObject, Reference, VirtualMachine};
use crate::types::{ManagedObjectReference, TypeTag};
use crate::walker::{InventoryWalker, Visit, WalkPolicy};

use log::debug;

/// Decides whether a visited object is the one being looked for.
///
/// The client is available for predicates that need remote properties.
#[async_trait::async_trait]
pub trait SearchPredicate: Send + Sync {
    async fn matches(
        &self,
        client: &dyn InventoryClient,
        object: &InventoryObject,
    ) -> VmwareResult<bool>;
}

/// Adapts a plain closure that needs no remote lookups.
pub struct FnPredicate<F>(pub F);

#[async_trait::async_trait]
impl<F> SearchPredicate for FnPredicate<F>
where
    F: Fn(&InventoryObject) -> bool + Send + Sync,
{
    async fn matches(
        &self,
        _client: &dyn InventoryClient,
        object: &InventoryObject,
    ) -> VmwareResult<bool> {
        Ok((self.0)(object))
    }
}

/// Matches objects of one tag whose `name` property equals a string exactly.
///
/// The name is only fetched for objects whose tag already matches.
#[derive(Debug, Clone)]
pub struct NamePredicate {
    pub tag: TypeTag,
    pub name: String,
}

impl NamePredicate {
    pub fn new(tag: TypeTag, name: impl Into<String>) -> Self {
        Self { tag, name: name.into() }
    }
}

#[async_trait::async_trait]
impl SearchPredicate for NamePredicate {
    async fn matches(
        &self,
        client: &dyn InventoryClient,
        object: &InventoryObject,
    ) -> VmwareResult<bool> {
        if object.tag() != self.tag {
            return Ok(false);
        }
        let name: Option<String> = fetch_property_as(client, object.reference(), "name").await?;
        Ok(name.as_deref() == Some(self.name.as_str()))
    }
}

struct Searcher<'p, P: ?Sized> {
    predicate: &'p P,
    found: Option<InventoryObject>,
}

#[async_trait::async_trait]
impl<'p, P: SearchPredicate + ?Sized> WalkPolicy for Searcher<'p, P> {
    type Output = Option<InventoryObject>;

    async fn visit(
        &mut self,
        client: &dyn InventoryClient,
        object: &InventoryObject,
    ) -> VmwareResult<Visit> {
        if self.predicate.matches(client, object).await? {
            debug!("Search matched {}", object.reference());
            self.found = Some(object.clone());
            return Ok(Visit::Stop);
        }
        Ok(Visit::Continue)
    }

    fn finish(self) -> Option<InventoryObject> {
        self.found
    }
}

/// First object below the root folder satisfying `predicate`.
pub async fn search<P: SearchPredicate + ?Sized>(
    client: &dyn InventoryClient,
    predicate: &P,
) -> VmwareResult<Option<InventoryObject>> {
    InventoryWalker::new(client)
        .walk_root(Searcher { predicate, found: None })
        .await
}

/// First object in the subtree rooted at `start` (inclusive) satisfying `predicate`.
pub async fn search_from<P: SearchPredicate + ?Sized>(
    client: &dyn InventoryClient,
    start: ManagedObjectReference,
    predicate: &P,
) -> VmwareResult<Option<InventoryObject>> {
    InventoryWalker::new(client)
        .walk_from(start, Searcher { predicate, found: None })
        .await
}

/// Find a virtual machine by exact, case-sensitive name.
pub async fn find_vm_by_name(
    client: &dyn InventoryClient,
    name: &str,
) -> VmwareResult<Option<VirtualMachine>> {
    let found = search(client, &NamePredicate::new(TypeTag::VirtualMachine, name)).await?;
    Ok(match found {
        Some(InventoryObject::VirtualMachine(vm)) => Some(vm),
        _ => None,
    })
}

/// Find an ESXi host by exact, case-sensitive name.
pub async fn find_host_by_name(
    client: &dyn InventoryClient,
    name: &str,
) -> VmwareResult<Option<HostSystem>> {
    let found = search(client, &NamePredicate::new(TypeTag::HostSystem, name)).await?;
    Ok(match found {
        Some(InventoryObject::HostSystem(host)) => Some(host),
        _ => None,
    })
}
