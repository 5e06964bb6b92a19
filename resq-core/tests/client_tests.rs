// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Dispatch Client Integration Tests
//!
//! End-to-end flows over a scripted transport: offline queueing with
//! drain-on-reconnect, the rider's request/bid/accept path, and loud
//! failure of negotiation traffic while disconnected.

use resq_core::network::{ConnectionEstablished, ManualClock, MockTransport};
use resq_core::{
    ClientError, ClientMessage, ConnectionState, DispatchClient, LocationError,
    MockLocationProvider, MockRequestEndpoint, Outbox, RequestDraft, Role, Routed, ServerMessage,
    SessionIdentity, Storage, TransportConfig,
};

fn driver_client() -> DispatchClient<MockTransport, ManualClock> {
    DispatchClient::new(
        MockTransport::new(),
        TransportConfig::default(),
        ManualClock::new(),
        SessionIdentity::new(7, Role::Driver, "token"),
        Outbox::new(Storage::in_memory().unwrap()),
    )
}

fn rider_client() -> DispatchClient<MockTransport, ManualClock> {
    DispatchClient::new(
        MockTransport::new(),
        TransportConfig::default(),
        ManualClock::new(),
        SessionIdentity::new(3, Role::Rider, "token"),
        Outbox::new(Storage::in_memory().unwrap()),
    )
}

fn greeting(user_id: u64, role: Role) -> ServerMessage {
    ServerMessage::ConnectionEstablished(ConnectionEstablished {
        user_id,
        user_role: role,
        message: None,
    })
}

// ============================================================
// Location pushes
// ============================================================

#[test]
fn test_first_push_announces_then_updates() {
    let mut client = driver_client();
    client.connect().unwrap();

    assert!(client.send_location(23.79, 90.40, 1_000).unwrap());
    assert!(client.send_location(23.80, 90.41, 2_000).unwrap());

    let sent = client
        .supervisor_mut()
        .session_mut()
        .transport_mut()
        .sent_messages()
        .to_vec();
    // new-client, add-location, update-location in that order.
    assert!(matches!(sent[0], ClientMessage::NewClient(_)));
    assert!(matches!(sent[1], ClientMessage::AddLocation(_)));
    assert!(matches!(sent[2], ClientMessage::UpdateLocation(_)));
}

// ============================================================
// Offline queueing and drain
// Scenario: a location pushed while disconnected is queued; upon
// reconnect exactly one location frame for driver 7 is sent and
// the outbox is empty afterward
// ============================================================

#[test]
fn test_offline_location_queued_and_drained_once() {
    let mut client = driver_client();

    // Disconnected: the push queues instead of sending.
    assert!(!client.send_location(23.79, 90.40, 1_000).unwrap());
    assert_eq!(client.outbox().len().unwrap(), 1);

    // Reconnect; the server greets, which triggers the drain.
    client.connect().unwrap();
    client
        .supervisor_mut()
        .session_mut()
        .transport_mut()
        .queue_receive(greeting(7, Role::Driver));

    let routed = client.process_incoming().unwrap();
    assert_eq!(routed, vec![Routed::DrainRequested { user_id: 7 }]);

    let sent = client
        .supervisor_mut()
        .session_mut()
        .transport_mut()
        .sent_messages()
        .to_vec();
    let locations: Vec<&ClientMessage> = sent
        .iter()
        .filter(|m| {
            matches!(
                m,
                ClientMessage::AddLocation(_) | ClientMessage::UpdateLocation(_)
            )
        })
        .collect();
    assert_eq!(locations.len(), 1, "exactly one replayed location frame");
    assert!(client.outbox().is_empty().unwrap());
}

#[test]
fn test_drain_coalesces_to_latest_fix() {
    let mut client = driver_client();

    for (i, lat) in [23.1, 23.2, 23.3].iter().enumerate() {
        client.send_location(*lat, 90.0, i as u64).unwrap();
    }
    assert_eq!(client.outbox().len().unwrap(), 3);

    client.connect().unwrap();
    client
        .supervisor_mut()
        .session_mut()
        .transport_mut()
        .queue_receive(greeting(7, Role::Driver));
    client.process_incoming().unwrap();

    let sent = client
        .supervisor_mut()
        .session_mut()
        .transport_mut()
        .sent_messages()
        .to_vec();
    let replayed: Vec<f64> = sent
        .iter()
        .filter_map(|m| match m {
            ClientMessage::AddLocation(p) | ClientMessage::UpdateLocation(p) => Some(p.latitude),
            _ => None,
        })
        .collect();
    assert_eq!(replayed, vec![23.3], "stale fixes are not replayed");
}

#[test]
fn test_location_sensor_failure_propagates() {
    let mut client = driver_client();
    client.connect().unwrap();

    let mut provider = MockLocationProvider::new();
    provider.push_error(LocationError::PermissionDenied);

    let result = client.push_current_location(&mut provider, 1_000);
    assert!(matches!(
        result,
        Err(ClientError::Location(LocationError::PermissionDenied))
    ));
    // No fabricated coordinate was sent or queued.
    assert!(client.outbox().is_empty().unwrap());
}

// ============================================================
// Rider negotiation flow
// ============================================================

#[test]
fn test_rider_request_bid_accept_flow() {
    let mut client = rider_client();
    client.connect().unwrap();

    let mut endpoint = MockRequestEndpoint::new(42);
    let req_id = client
        .create_request(
            &mut endpoint,
            RequestDraft {
                rider_id: 3,
                pickup_location: "Dhanmondi 27".into(),
                pickup_lat: 23.75,
                pickup_lng: 90.37,
                destination: "Square Hospital".into(),
                destination_lat: 23.753,
                destination_lng: 90.381,
                fare: 500,
            },
            1_000,
        )
        .unwrap();
    assert_eq!(req_id, 42, "endpoint assigns the request ID");

    // Two drivers bid over the wire.
    for (driver_id, amount) in [(5u64, 300u32), (9, 350)] {
        client
            .supervisor_mut()
            .session_mut()
            .transport_mut()
            .queue_receive(ServerMessage::DriverBidOffer(resq_core::network::BidData {
                driver_id,
                req_id,
                amount,
            }));
    }
    client.process_incoming().unwrap();
    assert_eq!(client.negotiation().bids().len(), 2);

    client.accept_bid(9, req_id).unwrap();
    assert_eq!(client.negotiation().accepted_driver(), Some(9));

    let sent = client
        .supervisor_mut()
        .session_mut()
        .transport_mut()
        .sent_messages()
        .to_vec();
    assert!(
        matches!(
            sent.last(),
            Some(ClientMessage::BidAccepted(bid)) if bid.driver_id == 9 && bid.amount == 350
        ),
        "accept is broadcast with the winning amount"
    );
}

#[test]
fn test_negotiation_traffic_fails_loudly_when_disconnected() {
    let mut client = driver_client();
    // Never connected.
    let result = client.place_bid(42, 300);
    assert!(result.is_err(), "bids must never be silently deferred");
    assert!(client.outbox().is_empty().unwrap());
}

#[test]
fn test_conflicting_inbound_accept_reported_not_fatal() {
    let mut client = rider_client();
    client.connect().unwrap();

    let mut endpoint = MockRequestEndpoint::new(42);
    client
        .create_request(
            &mut endpoint,
            RequestDraft {
                rider_id: 3,
                pickup_location: "A".into(),
                pickup_lat: 0.0,
                pickup_lng: 0.0,
                destination: "B".into(),
                destination_lat: 0.0,
                destination_lng: 0.0,
                fare: 500,
            },
            1_000,
        )
        .unwrap();

    // An accept for a driver that never bid is dropped with a report,
    // and the pump keeps going.
    client
        .supervisor_mut()
        .session_mut()
        .transport_mut()
        .queue_receive(ServerMessage::BidAccepted(resq_core::network::BidOutcome {
            driver_id: 99,
            req_id: 42,
            trip_details: None,
        }));
    client
        .supervisor_mut()
        .session_mut()
        .transport_mut()
        .queue_receive(ServerMessage::Pong);

    let routed = client.process_incoming().unwrap();
    assert_eq!(routed, vec![Routed::Logged], "pump survived the conflict");
    assert!(client.negotiation().accepted_driver().is_none());
}

// ============================================================
// Teardown
// ============================================================

#[test]
fn test_disconnect_clears_volatile_state_keeps_outbox() {
    let mut client = driver_client();
    client.send_location(23.79, 90.40, 1_000).unwrap();
    client.connect().unwrap();
    client
        .supervisor_mut()
        .session_mut()
        .transport_mut()
        .queue_receive(ServerMessage::DriverLocation(
            resq_core::network::DriverLocation {
                driver_id: 9,
                latitude: 23.0,
                longitude: 90.0,
                timestamp: 1,
                name: None,
                status: None,
            },
        ));
    client.process_incoming().unwrap();
    assert_eq!(client.registry().len(), 1);

    client.disconnect().unwrap();
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(client.registry().is_empty(), "presence does not outlive the session");
    // The queued location from before the connect is still durable.
    assert_eq!(client.outbox().len().unwrap(), 1);
}
