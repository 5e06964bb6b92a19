// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire Protocol Integration Tests
//!
//! Decoding tolerance for the server's envelope quirks: `event` as a
//! synonym for `type`, payloads at the top level instead of under
//! `data`, and unknown message types that must not kill the session.

use resq_core::network::{decode_message, encode_message};
use resq_core::{ClientMessage, ServerMessage};

// ============================================================
// Envelope normalization
// ============================================================

#[test]
fn test_event_key_is_type_synonym() {
    let frame = r#"{"event": "driver-location", "data": {"driver_id": 7, "latitude": 23.79, "longitude": 90.40}}"#;
    let message = decode_message(frame).unwrap();
    assert!(matches!(
        message,
        ServerMessage::DriverLocation(ref loc) if loc.driver_id == 7
    ));
}

#[test]
fn test_top_level_payload_accepted() {
    // connection_established historically carries its payload beside
    // the discriminator, not under data.
    let frame = r#"{"type": "connection_established", "user_id": 3, "user_role": "rider"}"#;
    let message = decode_message(frame).unwrap();
    assert!(matches!(
        message,
        ServerMessage::ConnectionEstablished(ref info) if info.user_id == 3
    ));
}

#[test]
fn test_unknown_type_tolerated() {
    let frame = r#"{"type": "surge-pricing", "data": {"factor": 2}}"#;
    let message = decode_message(frame).unwrap();
    assert_eq!(
        message,
        ServerMessage::Unknown {
            kind: "surge-pricing".into()
        }
    );
}

#[test]
fn test_malformed_known_type_is_error() {
    // Recognized discriminator with a broken payload must error so the
    // transport can log and drop the frame.
    let frame = r#"{"type": "driver-bid-offer", "data": {"driver_id": "not-a-number"}}"#;
    assert!(decode_message(frame).is_err());
}

#[test]
fn test_non_object_rejected() {
    assert!(decode_message("[1, 2, 3]").is_err());
    assert!(decode_message("\"hello\"").is_err());
    assert!(decode_message("not json at all").is_err());
}

// ============================================================
// Encoding
// ============================================================

#[test]
fn test_outbound_envelope_shape() {
    let encoded = encode_message(&ClientMessage::CancelRequest { req_id: 42 }).unwrap();
    let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(value["type"], "cancel-request");
    assert_eq!(value["data"]["req_id"], 42);
}

#[test]
fn test_bid_round_trips_between_peers() {
    // What one side encodes, the other decodes into the matching
    // inbound event.
    let outbound = ClientMessage::DriverBidOffer(resq_core::network::BidData {
        driver_id: 9,
        req_id: 42,
        amount: 350,
    });
    let decoded = decode_message(&encode_message(&outbound).unwrap()).unwrap();
    assert!(matches!(
        decoded,
        ServerMessage::DriverBidOffer(ref bid) if bid.amount == 350
    ));
}
