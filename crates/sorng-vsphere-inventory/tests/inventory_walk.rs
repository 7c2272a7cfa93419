use sorng_vsphere_inventory::simulated::{SimCall, SimCallKind, SimulatedInventory};
use sorng_vsphere_inventory::{
    build_inventory_map, find_host_by_name, find_vm_by_name, search, FnPredicate,
    InventoryObject, ManagedObjectReference, Reference, TypeTag, VmwareError, VmwareErrorKind,
};

use std::collections::BTreeSet;

/// Two datacenters with a bit of everything.
fn lab() -> SimulatedInventory {
    let mut sim = SimulatedInventory::new();
    let root = sim.root();

    let east = sim.add_datacenter(&root, "dc-east", "East");
    let apps = sim.add(&east.vm_folder, "Folder", "group-apps", "apps");
    sim.add(&apps, "VirtualMachine", "vm-1", "web-01");
    sim.add(&apps, "VirtualApp", "vapp-1", "billing");
    sim.add(&east.vm_folder, "VirtualMachine", "vm-2", "db-01");
    let cluster = sim.add(&east.host_folder, "ClusterComputeResource", "domain-c1", "prod");
    sim.add(&cluster, "HostSystem", "host-1", "esx-01");
    sim.add(&cluster, "HostSystem", "host-2", "esx-02");
    let pod = sim.add(&east.datastore_folder, "StoragePod", "pod-1", "gold");
    sim.add(&pod, "Datastore", "ds-1", "gold-a");
    sim.add(&east.datastore_folder, "Datastore", "ds-2", "local");
    let dvs = sim.add(&east.network_folder, "VmwareDistributedVirtualSwitch", "dvs-1", "dvs");
    sim.add(&dvs, "DistributedVirtualPortgroup", "pg-1", "pg-web");
    sim.add(&east.network_folder, "Network", "net-1", "VM Network");

    let west = sim.add_datacenter(&root, "dc-west", "West");
    let single = sim.add(&west.host_folder, "ComputeResource", "domain-s1", "standalone");
    sim.add(&single, "HostSystem", "host-3", "esx-03");
    sim.add(&west.vm_folder, "VirtualMachine", "vm-3", "web-01");
    sim.add(&west.vm_folder, "ResourcePool", "resgroup-1", "pool");

    sim
}

fn ids(map: &sorng_vsphere_inventory::InventoryMap, tag: TypeTag) -> BTreeSet<String> {
    map.get(tag).iter().map(|o| o.id().to_string()).collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn inventory_map_is_complete() {
    let sim = lab();
    let map = build_inventory_map(&sim).await.unwrap();

    assert_eq!(ids(&map, TypeTag::VirtualMachine), set(&["vm-1", "vm-2", "vm-3"]));
    assert_eq!(ids(&map, TypeTag::HostSystem), set(&["host-1", "host-2", "host-3"]));
    assert_eq!(ids(&map, TypeTag::Datastore), set(&["ds-1", "ds-2"]));
    assert_eq!(ids(&map, TypeTag::Network), set(&["net-1"]));
    assert_eq!(ids(&map, TypeTag::DistributedVirtualPortgroup), set(&["pg-1"]));
    assert_eq!(ids(&map, TypeTag::VirtualApp), set(&["vapp-1"]));
    assert_eq!(ids(&map, TypeTag::ResourcePool), set(&["resgroup-1"]));
    assert_eq!(ids(&map, TypeTag::Datacenter), set(&["dc-east", "dc-west"]));

    // 2 datacenters + 8 datacenter folders + 1 sub-folder + 2 compute
    // resources + 1 pod + 1 switch + 12 leaves.
    assert_eq!(map.len(), 27);
}

#[tokio::test]
async fn inventory_map_preserves_walk_order() {
    let sim = lab();
    let map = build_inventory_map(&sim).await.unwrap();
    let vms: Vec<&str> = map.get(TypeTag::VirtualMachine).iter().map(|o| o.id()).collect();
    assert_eq!(vms, vec!["vm-1", "vm-2", "vm-3"]);
}

#[tokio::test]
async fn empty_root_yields_empty_results() {
    let sim = SimulatedInventory::new();
    assert!(build_inventory_map(&sim).await.unwrap().is_empty());
    assert!(find_vm_by_name(&sim, "web-01").await.unwrap().is_none());
    assert!(search(&sim, &FnPredicate(|_: &InventoryObject| true))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn search_returns_first_match_and_skips_the_rest() {
    let sim = lab();
    let vm = find_vm_by_name(&sim, "web-01").await.unwrap().unwrap();
    assert_eq!(vm.reference.value, "vm-1");

    // Nothing after vm-1 was touched: no later sibling, no later datacenter.
    let calls = sim.calls().await;
    let last = calls.last().unwrap();
    assert_eq!(
        last,
        &SimCall::Property(ManagedObjectReference::new("VirtualMachine", "vm-1"), "name".into())
    );
    assert!(calls.iter().all(|c| c.target().value != "dc-west"));
    assert!(calls.iter().all(|c| c.target().value != "dc-east-host"));
}

#[tokio::test]
async fn collector_visits_what_search_skips() {
    let sim = lab();
    build_inventory_map(&sim).await.unwrap();
    let calls = sim.calls().await;
    assert!(calls.iter().any(|c| c.target().value == "dc-west"));
    assert!(calls
        .iter()
        .any(|c| matches!(c, SimCall::Property(r, p) if r.value == "domain-s1" && p == "host")));
}

#[tokio::test]
async fn name_search_is_exact_and_tag_scoped() {
    let mut sim = SimulatedInventory::new();
    let dc = sim.add_datacenter(&sim.root(), "dc-1", "DC");
    sim.add(&dc.vm_folder, "VirtualMachine", "vm-prod", "web-01-prod");
    sim.add(&dc.host_folder, "HostSystem", "host-web", "web-01");

    assert!(find_vm_by_name(&sim, "web-01").await.unwrap().is_none());
    let host = find_host_by_name(&sim, "web-01").await.unwrap().unwrap();
    assert_eq!(host.reference().value, "host-web");
}

#[tokio::test]
async fn collaborator_failure_aborts_without_partial_result() {
    let mut sim = lab();
    sim.fail_on(
        SimCallKind::Children,
        3,
        VmwareError::connection("vCenter went away"),
    );

    let err = build_inventory_map(&sim).await.unwrap_err();
    assert_eq!(err.kind, VmwareErrorKind::ConnectionError);
    assert!(err.is_collaborator());

    let children_calls = sim
        .calls()
        .await
        .into_iter()
        .filter(|c| c.kind() == SimCallKind::Children)
        .count();
    assert_eq!(children_calls, 3);
}

#[tokio::test]
async fn search_propagates_collaborator_failure() {
    let mut sim = lab();
    sim.fail_on(SimCallKind::Property, 1, VmwareError::timeout("name lookup timed out"));
    let err = find_vm_by_name(&sim, "web-01").await.unwrap_err();
    assert_eq!(err.kind, VmwareErrorKind::Timeout);
}

#[tokio::test]
async fn unknown_type_tag_is_reported_not_skipped() {
    let mut sim = lab();
    let root = sim.root();
    sim.add(&root, "FutureType", "future-1", "next-gen");

    let err = build_inventory_map(&sim).await.unwrap_err();
    assert_eq!(err.kind, VmwareErrorKind::UnknownTypeTag);
    assert!(!err.is_collaborator());
    assert!(err.message.contains("FutureType"));
}

#[tokio::test]
async fn match_before_unknown_sibling_is_returned() {
    let mut sim = SimulatedInventory::new();
    let root = sim.root();
    sim.add(&root, "VirtualMachine", "vm-1", "web-01");
    sim.add(&root, "FutureType", "x-1", "next-gen");

    let vm = find_vm_by_name(&sim, "web-01").await.unwrap().unwrap();
    assert_eq!(vm.reference.value, "vm-1");

    // The collector does reach the unknown node and must fail.
    let err = build_inventory_map(&sim).await.unwrap_err();
    assert_eq!(err.kind, VmwareErrorKind::UnknownTypeTag);
}

#[tokio::test]
async fn search_fails_on_third_children_fetch() {
    let mut sim = lab();
    sim.fail_on(SimCallKind::Children, 3, VmwareError::timeout("third listing timed out"));

    let found = search(&sim, &FnPredicate(|o: &InventoryObject| o.id() == "vm-1")).await;
    let err = found.unwrap_err();
    assert_eq!(err.kind, VmwareErrorKind::Timeout);
    assert_eq!(err.message, "third listing timed out");
}

#[tokio::test]
async fn failed_host_list_fetch_aborts_collection() {
    let mut sim = SimulatedInventory::new();
    let root = sim.root();
    let cluster = sim.add(&root, "ClusterComputeResource", "domain-c1", "prod");
    sim.add(&cluster, "HostSystem", "host-1", "esx-01");
    sim.add(&root, "VirtualMachine", "vm-1", "web-01");
    sim.fail_on(SimCallKind::Property, 1, VmwareError::timeout("host list timed out"));

    let err = build_inventory_map(&sim).await.unwrap_err();
    assert_eq!(err.kind, VmwareErrorKind::Timeout);

    let calls = sim.calls().await;
    assert_eq!(
        calls.last().unwrap(),
        &SimCall::Property(cluster, "host".into())
    );
    assert!(calls.iter().all(|c| c.target().value != "host-1"));
}
