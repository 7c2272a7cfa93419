//! The remote API surface the inventory walk depends on.
//!
//! [`crate::vsphere::VsphereClient`] talks to a real vCenter;
//! [`crate::simulated::SimulatedInventory`] serves an in-memory tree.

use crate::error::{VmwareError, VmwareResult};
use crate::types::{DatacenterFolders, ManagedObjectReference};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Child enumeration and property retrieval for managed objects.
///
/// The walker only reads through this trait; implementations must never
/// mutate the inventory.
#[async_trait::async_trait]
pub trait InventoryClient: Send + Sync {
    /// Entry point of the whole hierarchy.
    fn root_folder(&self) -> VmwareResult<ManagedObjectReference>;

    /// Child entities of a folder, in the order the API reports them.
    async fn children(
        &self,
        folder: &ManagedObjectReference,
    ) -> VmwareResult<Vec<ManagedObjectReference>>;

    /// The four fixed sub-folders of a datacenter.
    async fn datacenter_folders(
        &self,
        datacenter: &ManagedObjectReference,
    ) -> VmwareResult<DatacenterFolders>;

    /// Raw value of a single property. Unset properties are `Value::Null`.
    async fn fetch_property(
        &self,
        object: &ManagedObjectReference,
        property: &str,
    ) -> VmwareResult<Value>;
}

/// Fetch a property and decode it into `T`.
pub async fn fetch_property_as<T: DeserializeOwned>(
    client: &dyn InventoryClient,
    object: &ManagedObjectReference,
    property: &str,
) -> VmwareResult<T> {
    let value = client.fetch_property(object, property).await?;
    serde_json::from_value(value).map_err(|e| {
        VmwareError::parse(format!("Cannot decode property '{property}' of {object}: {e}"))
    })
}

/// Fetch a reference-list property (`childEntity`, `host`, `portgroup`).
/// An unset list is treated as empty.
pub async fn fetch_reference_list(
    client: &dyn InventoryClient,
    object: &ManagedObjectReference,
    property: &str,
) -> VmwareResult<Vec<ManagedObjectReference>> {
    let refs: Option<Vec<ManagedObjectReference>> =
        fetch_property_as(client, object, property).await?;
    Ok(refs.unwrap_or_default())
}
