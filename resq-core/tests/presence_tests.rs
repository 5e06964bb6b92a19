// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Presence Registry Integration Tests
//!
//! Exercises the registry through the message router the way live
//! traffic reaches it: single upserts, bulk resyncs, and disconnect
//! notices.

use resq_core::network::DriverLocation;
use resq_core::{route, DriverStatus, Negotiation, PresenceRegistry, Routed, ServerMessage};

fn wire_location(driver_id: u64, name: Option<&str>) -> DriverLocation {
    DriverLocation {
        driver_id,
        latitude: 23.79,
        longitude: 90.40,
        timestamp: 1_000,
        name: name.map(String::from),
        status: Some(DriverStatus::Available),
    }
}

// ============================================================
// Upsert idempotence
// Property: applying the same record twice yields the same state
// as applying it once
// ============================================================

#[test]
fn test_upsert_idempotence_through_router() {
    let mut registry = PresenceRegistry::new();
    let mut negotiation = Negotiation::new();

    let message = ServerMessage::DriverLocation(wire_location(7, Some("Karim")));
    route(message.clone(), &mut registry, &mut negotiation).unwrap();
    let once = registry.snapshot().clone();

    route(message, &mut registry, &mut negotiation).unwrap();
    assert_eq!(registry.snapshot(), &once);
}

#[test]
fn test_partial_record_merges_instead_of_blanking() {
    let mut registry = PresenceRegistry::new();
    let mut negotiation = Negotiation::new();

    route(
        ServerMessage::DriverLocation(wire_location(7, Some("Karim"))),
        &mut registry,
        &mut negotiation,
    )
    .unwrap();

    // Later push without the optional name.
    let mut bare = wire_location(7, None);
    bare.latitude = 24.0;
    bare.status = None;
    route(
        ServerMessage::DriverLocation(bare),
        &mut registry,
        &mut negotiation,
    )
    .unwrap();

    let record = registry.get(7).unwrap();
    assert_eq!(record.latitude, 24.0);
    assert_eq!(record.name, "Karim", "missing name must not blank");
    assert_eq!(record.status, DriverStatus::Available);
}

// ============================================================
// Replace-all semantics
// Property: replaceAll([A, B]) after holding {A, C} leaves
// exactly {A, B}
// ============================================================

#[test]
fn test_nearby_drivers_is_full_resync() {
    let mut registry = PresenceRegistry::new();
    let mut negotiation = Negotiation::new();

    for id in [1, 3] {
        route(
            ServerMessage::DriverLocation(wire_location(id, None)),
            &mut registry,
            &mut negotiation,
        )
        .unwrap();
    }

    let routed = route(
        ServerMessage::NearbyDrivers(vec![wire_location(1, None), wire_location(2, None)]),
        &mut registry,
        &mut negotiation,
    )
    .unwrap();

    assert_eq!(routed, Routed::Presence);
    assert_eq!(registry.len(), 2);
    assert!(registry.get(1).is_some());
    assert!(registry.get(2).is_some());
    assert!(registry.get(3).is_none(), "absent entries are dropped");
}

// ============================================================
// Event-driven removal
// ============================================================

#[test]
fn test_removal_only_on_explicit_signal() {
    let mut registry = PresenceRegistry::new();
    let mut negotiation = Negotiation::new();

    route(
        ServerMessage::DriverLocation(wire_location(7, None)),
        &mut registry,
        &mut negotiation,
    )
    .unwrap();

    // Nothing expires on its own; only the disconnect notice removes.
    assert_eq!(registry.len(), 1);
    route(
        ServerMessage::DriverOffline { driver_id: 7 },
        &mut registry,
        &mut negotiation,
    )
    .unwrap();
    assert!(registry.is_empty());
}
