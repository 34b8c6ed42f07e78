//! Catalog discovery and sync-plan resolution

use tap_flexopus::catalog::{Catalog, StreamKind};

#[test]
fn test_discovery_produces_the_three_streams_in_sync_order() {
    let catalog = Catalog::discover().unwrap();
    let names: Vec<_> = catalog
        .streams
        .iter()
        .map(|entry| entry.tap_stream_id.as_str())
        .collect();
    assert_eq!(names, vec!["buildings", "bookables", "bookings"]);
    assert!(catalog.streams.iter().all(|entry| entry.selected));
}

#[test]
fn test_discovered_bookings_carry_a_replication_key() {
    let catalog = Catalog::discover().unwrap();
    let bookings = catalog
        .streams
        .iter()
        .find(|entry| entry.tap_stream_id == "bookings")
        .unwrap();
    assert_eq!(bookings.replication_key.as_deref(), Some("updated_at"));
    assert_eq!(bookings.key_properties, vec!["id".to_string()]);
    assert!(bookings.is_sorted);
    assert!(bookings.schema["properties"]["updated_at"].is_object());
}

#[test]
fn test_discovered_schemas_describe_location_enrichment() {
    let catalog = Catalog::discover().unwrap();
    for name in ["bookables", "bookings"] {
        let entry = catalog
            .streams
            .iter()
            .find(|e| e.tap_stream_id == name)
            .unwrap();
        assert!(
            entry.schema["properties"]["location_id"].is_object(),
            "{name} schema must declare the injected location_id field"
        );
    }
}

#[test]
fn test_sync_plan_puts_the_root_stream_first() {
    let catalog = Catalog::discover().unwrap();
    let plan = catalog.sync_plan().unwrap();

    let (root_entry, root_def) = plan.root.unwrap();
    assert_eq!(root_entry.tap_stream_id, "buildings");
    assert!(matches!(root_def.kind, StreamKind::Root { .. }));

    let dependents: Vec<_> = plan
        .dependents
        .iter()
        .map(|(entry, _)| entry.tap_stream_id.as_str())
        .collect();
    assert_eq!(dependents, vec!["bookables", "bookings"]);
}

#[test]
fn test_deselected_streams_are_left_out_of_the_plan() {
    let mut catalog = Catalog::discover().unwrap();
    catalog
        .streams
        .iter_mut()
        .find(|entry| entry.tap_stream_id == "bookables")
        .unwrap()
        .selected = false;

    let plan = catalog.sync_plan().unwrap();
    let dependents: Vec<_> = plan
        .dependents
        .iter()
        .map(|(entry, _)| entry.tap_stream_id.as_str())
        .collect();
    assert_eq!(dependents, vec!["bookings"]);
}
