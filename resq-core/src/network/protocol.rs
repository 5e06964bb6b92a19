// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire Protocol
//!
//! JSON envelope codec for the dispatch connection. Outbound frames are
//! always `{"type": <kind>, "data": {...}}`. Inbound frames are messier:
//! some servers use `event` instead of `type`, and some put the payload
//! fields at the top level instead of under `data`. Both shapes are
//! normalized here, once, at ingress; everything past this point operates
//! on the closed [`ServerMessage`] union.

use serde_json::Value;

use super::error::NetworkError;
use super::message::{ClientMessage, ServerMessage};

/// Maximum accepted frame size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Inbound `type` strings this client understands.
const KNOWN_TYPES: &[&str] = &[
    "driver-location",
    "location_updated",
    "add-location",
    "update-location",
    "nearby-drivers",
    "connection_established",
    "new-trip-request",
    "driver-bid-offer",
    "rider-counter-offer",
    "driver-counter-offer",
    "bid-accepted",
    "bid-rejected",
    "trip-confirmed",
    "trip-ended",
    "driver-offline",
    "error",
    "pong",
];

/// Encodes an outbound message as a JSON text frame.
pub fn encode_message(message: &ClientMessage) -> Result<String, NetworkError> {
    serde_json::to_string(message).map_err(|e| NetworkError::InvalidMessage(e.to_string()))
}

/// Decodes an inbound JSON text frame.
///
/// Unrecognized `type` strings decode to [`ServerMessage::Unknown`] so the
/// caller can log and drop them; a malformed payload for a *known* type is
/// an [`NetworkError::InvalidMessage`]. Neither terminates the session.
pub fn decode_message(frame: &str) -> Result<ServerMessage, NetworkError> {
    if frame.len() > MAX_MESSAGE_SIZE {
        return Err(NetworkError::InvalidMessage(format!(
            "frame of {} bytes exceeds limit of {}",
            frame.len(),
            MAX_MESSAGE_SIZE
        )));
    }

    let value: Value = serde_json::from_str(frame)
        .map_err(|e| NetworkError::InvalidMessage(format!("not JSON: {}", e)))?;

    let Value::Object(mut map) = value else {
        return Err(NetworkError::InvalidMessage(
            "frame is not a JSON object".into(),
        ));
    };

    // `event` is an accepted synonym for `type`.
    let kind = match map.remove("type").or_else(|| map.remove("event")) {
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(NetworkError::InvalidMessage(
                "type discriminator is not a string".into(),
            ))
        }
        None => {
            return Err(NetworkError::InvalidMessage(
                "missing type/event discriminator".into(),
            ))
        }
    };

    if !KNOWN_TYPES.contains(&kind.as_str()) {
        return Ok(ServerMessage::Unknown { kind });
    }

    // Heartbeat replies carry no payload worth validating.
    if kind == "pong" {
        return Ok(ServerMessage::Pong);
    }

    // Payload fields may live under `data` or at the top level.
    let data = match map.remove("data") {
        Some(data) => data,
        None => Value::Object(map),
    };

    let envelope = serde_json::json!({ "type": kind, "data": data });
    serde_json::from_value(envelope)
        .map_err(|e| NetworkError::InvalidMessage(format!("bad {} payload: {}", kind, e)))
}
