// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire Message Types
//!
//! Closed tagged unions for everything that crosses the dispatch
//! connection, validated once at ingress. The wire form is a JSON
//! envelope `{"type": ..., "data": {...}}`; inbound frames may use
//! `event` as a synonym for `type` (see [`crate::network::protocol`]).

use serde::{Deserialize, Serialize};

use crate::identity::Role;
use crate::presence::DriverStatus;

/// Identity announcement, sent as the first frame after open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    pub id: u64,
    pub role: Role,
    pub token: String,
}

/// A driver location push (outbound from the driver side).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPush {
    pub driver_id: u64,
    pub latitude: f64,
    pub longitude: f64,
    /// Unix milliseconds.
    pub timestamp: u64,
}

/// A driver location record as seen in inbound presence messages.
///
/// The server is inconsistent about the key name (`driver_id` vs `id`)
/// and about which optional fields it includes; both are tolerated here
/// and normalized before they reach the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverLocation {
    #[serde(alias = "id")]
    pub driver_id: u64,
    pub latitude: f64,
    pub longitude: f64,
    /// Unix milliseconds.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DriverStatus>,
}

/// Server greeting confirming the session is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEstablished {
    pub user_id: u64,
    pub user_role: Role,
    #[serde(default)]
    pub message: Option<String>,
}

/// Trip request fields as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequestData {
    pub req_id: u64,
    pub rider_id: u64,
    pub pickup_location: String,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub destination: String,
    pub destination_lat: f64,
    pub destination_lng: f64,
    /// Fare ceiling the rider will accept.
    pub fare: u32,
    /// Unix milliseconds.
    #[serde(default)]
    pub created_at: u64,
}

/// A priced offer tied to one driver and one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidData {
    pub driver_id: u64,
    pub req_id: u64,
    pub amount: u32,
}

/// Terminal bid outcome, optionally carrying confirmed trip details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidOutcome {
    pub driver_id: u64,
    pub req_id: u64,
    #[serde(
        default,
        alias = "tripDetails",
        skip_serializing_if = "Option::is_none"
    )]
    pub trip_details: Option<TripDetails>,
}

/// Confirmed trip details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDetails {
    pub trip_id: u64,
    pub req_id: u64,
    pub driver_id: u64,
    pub rider_id: u64,
    pub fare: u32,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub destination: String,
}

/// Diagnostic payload for `error` frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorData {
    #[serde(default)]
    pub message: String,
}

/// Outbound messages (client to server).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Announces identity; always the first frame.
    NewClient(NewClient),
    /// First location push of a session.
    AddLocation(LocationPush),
    /// Subsequent location pushes.
    UpdateLocation(LocationPush),
    /// Rider posts a trip request for broadcast.
    NewTripRequest(TripRequestData),
    /// Driver offers a fare for a request.
    DriverBidOffer(BidData),
    /// Rider counters a driver's offer.
    RiderCounterOffer(BidData),
    /// Driver counters a rider's counter.
    DriverCounterOffer(BidData),
    /// Rider accepts one driver's bid.
    BidAccepted(BidData),
    /// Rider rejects one driver's bid.
    BidRejected(BidData),
    /// Rider withdraws the whole request.
    CancelRequest { req_id: u64 },
    /// Driver withdraws one bid.
    CancelBid { driver_id: u64, req_id: u64 },
    /// Heartbeat.
    Ping,
}

impl ClientMessage {
    /// The wire `type` string for this message.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::NewClient(_) => "new-client",
            ClientMessage::AddLocation(_) => "add-location",
            ClientMessage::UpdateLocation(_) => "update-location",
            ClientMessage::NewTripRequest(_) => "new-trip-request",
            ClientMessage::DriverBidOffer(_) => "driver-bid-offer",
            ClientMessage::RiderCounterOffer(_) => "rider-counter-offer",
            ClientMessage::DriverCounterOffer(_) => "driver-counter-offer",
            ClientMessage::BidAccepted(_) => "bid-accepted",
            ClientMessage::BidRejected(_) => "bid-rejected",
            ClientMessage::CancelRequest { .. } => "cancel-request",
            ClientMessage::CancelBid { .. } => "cancel-bid",
            ClientMessage::Ping => "ping",
        }
    }

    /// True for payloads whose delivery tolerates delay.
    ///
    /// Only these may enter the offline outbox; negotiation traffic must
    /// fail loudly instead of being silently deferred.
    pub fn is_deferrable(&self) -> bool {
        matches!(
            self,
            ClientMessage::AddLocation(_) | ClientMessage::UpdateLocation(_)
        )
    }
}

/// Inbound messages (server to client).
///
/// `Unknown` is never produced by serde; the protocol layer constructs
/// it for unrecognized `type` strings so they can be logged and dropped
/// without terminating the session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Single driver presence update.
    #[serde(
        alias = "location_updated",
        alias = "add-location",
        alias = "update-location"
    )]
    DriverLocation(DriverLocation),
    /// Bulk "everyone online right now" resync.
    NearbyDrivers(Vec<DriverLocation>),
    /// Session registered; triggers the outbox drain.
    #[serde(rename = "connection_established")]
    ConnectionEstablished(ConnectionEstablished),
    /// A rider's request reached this driver.
    NewTripRequest(TripRequestData),
    /// A driver bid on our request.
    DriverBidOffer(BidData),
    /// The rider countered our bid.
    RiderCounterOffer(BidData),
    /// The driver countered our counter.
    DriverCounterOffer(BidData),
    /// A bid was accepted.
    BidAccepted(BidOutcome),
    /// A bid was rejected.
    BidRejected(BidOutcome),
    /// Trip confirmed; negotiation is over.
    TripConfirmed(TripDetails),
    /// Trip completed or aborted.
    TripEnded(TripDetails),
    /// A driver disconnected; remove from the registry.
    DriverOffline { driver_id: u64 },
    /// Server-side diagnostic. Logged only.
    Error(ErrorData),
    /// Heartbeat reply. Logged only.
    Pong,
    /// Unrecognized `type`; logged and dropped.
    #[serde(skip)]
    Unknown { kind: String },
}
