//! # SortOfRemote NG – vSphere Inventory
//!
//! Depth-first traversal of a vCenter / ESXi inventory tree: datacenters,
//! folders, clusters, hosts, VMs, datastores, networks, distributed switches
//! and storage pods.
//!
//! ## Modules
//!
//! - **types** — Managed-object references, type-tag taxonomy, container rules, config
//! - **error** — Crate-specific error types
//! - **resolver** — Raw reference → typed inventory object
//! - **client** — `InventoryClient` trait the walk reads through
//! - **walker** — Shared recursive descent + `WalkPolicy`
//! - **collector** — Collect everything into an `InventoryMap`
//! - **search** — First-match search, VM / host lookup by name
//! - **vsphere** — VI/JSON API HTTP client with session-based auth
//! - **simulated** — In-memory inventory for tests and demos
//! - **service** — Aggregate facade + shared-state alias

pub mod types;
pub mod error;
pub mod resolver;
pub mod client;
pub mod walker;
pub mod collector;
pub mod search;
pub mod vsphere;
pub mod simulated;
pub mod service;

pub use client::InventoryClient;
pub use collector::{build_inventory_map, build_inventory_map_with, collect_from, CollectScope, InventoryMap};
pub use error::{VmwareError, VmwareErrorKind, VmwareResult};
pub use resolver::{resolve, InventoryObject, Reference};
pub use search::{find_host_by_name, find_vm_by_name, search, search_from, FnPredicate, NamePredicate, SearchPredicate};
pub use types::{ManagedObjectReference, TypeTag};
