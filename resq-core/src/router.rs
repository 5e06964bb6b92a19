// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Message Router
//!
//! Classifies inbound frames and dispatches them to the presence
//! registry or the negotiation state machine. The router owns no state
//! itself; it borrows both stores per call so all mutation stays
//! serialized through the caller's event loop.

use log::{debug, warn};

use crate::negotiation::{Effect, Negotiation, NegotiationError, NegotiationEvent};
use crate::network::{DriverLocation, ServerMessage, TripDetails};
use crate::presence::{PresenceRegistry, PresenceUpdate};

/// Where an inbound frame went.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Presence registry was mutated.
    Presence,
    /// Negotiation transition applied; effects for the caller.
    Negotiation(Vec<Effect>),
    /// Session is registered server-side; drain the offline outbox.
    DrainRequested { user_id: u64 },
    /// Negotiation settled into a confirmed, trackable trip.
    TripConfirmed(TripDetails),
    /// Trip completed or aborted; negotiation scope was cleared.
    TripEnded(TripDetails),
    /// Diagnostic or unrecognized frame; logged only.
    Logged,
}

fn presence_update(location: DriverLocation) -> PresenceUpdate {
    PresenceUpdate {
        driver_id: location.driver_id,
        latitude: location.latitude,
        longitude: location.longitude,
        timestamp: location.timestamp,
        name: location.name,
        status: location.status,
    }
}

/// Dispatches one inbound message.
///
/// Negotiation conflicts surface as errors and leave both stores
/// unchanged; everything else either mutates a store or is logged.
pub fn route(
    message: ServerMessage,
    registry: &mut PresenceRegistry,
    negotiation: &mut Negotiation,
) -> Result<Routed, NegotiationError> {
    match message {
        ServerMessage::DriverLocation(location) => {
            registry.upsert(presence_update(location));
            Ok(Routed::Presence)
        }
        ServerMessage::NearbyDrivers(locations) => {
            registry.replace_all(locations.into_iter().map(presence_update).collect());
            Ok(Routed::Presence)
        }
        ServerMessage::DriverOffline { driver_id } => {
            registry.remove(driver_id);
            Ok(Routed::Presence)
        }
        ServerMessage::ConnectionEstablished(info) => {
            debug!("session registered for user {}", info.user_id);
            Ok(Routed::DrainRequested {
                user_id: info.user_id,
            })
        }
        ServerMessage::NewTripRequest(data) => {
            let effects = negotiation.apply(NegotiationEvent::CreateRequest(data.into()))?;
            Ok(Routed::Negotiation(effects))
        }
        ServerMessage::DriverBidOffer(bid) => {
            let effects = negotiation.apply(NegotiationEvent::DriverBidOffer {
                driver_id: bid.driver_id,
                req_id: bid.req_id,
                amount: bid.amount,
            })?;
            Ok(Routed::Negotiation(effects))
        }
        ServerMessage::RiderCounterOffer(bid) => {
            let effects = negotiation.apply(NegotiationEvent::RiderCounterOffer {
                driver_id: bid.driver_id,
                req_id: bid.req_id,
                amount: bid.amount,
            })?;
            Ok(Routed::Negotiation(effects))
        }
        ServerMessage::DriverCounterOffer(bid) => {
            let effects = negotiation.apply(NegotiationEvent::DriverCounterOffer {
                driver_id: bid.driver_id,
                req_id: bid.req_id,
                amount: bid.amount,
            })?;
            Ok(Routed::Negotiation(effects))
        }
        ServerMessage::BidAccepted(outcome) => {
            let effects = negotiation.apply(NegotiationEvent::AcceptBid {
                driver_id: outcome.driver_id,
                req_id: outcome.req_id,
            })?;
            Ok(Routed::Negotiation(effects))
        }
        ServerMessage::BidRejected(outcome) => {
            let effects = negotiation.apply(NegotiationEvent::RejectBid {
                driver_id: outcome.driver_id,
                req_id: outcome.req_id,
            })?;
            Ok(Routed::Negotiation(effects))
        }
        ServerMessage::TripConfirmed(details) => {
            debug!("trip {} confirmed", details.trip_id);
            Ok(Routed::TripConfirmed(details))
        }
        ServerMessage::TripEnded(details) => {
            debug!("trip {} ended", details.trip_id);
            negotiation.clear();
            Ok(Routed::TripEnded(details))
        }
        ServerMessage::Error(diagnostic) => {
            warn!("server error: {}", diagnostic.message);
            Ok(Routed::Logged)
        }
        ServerMessage::Pong => {
            debug!("pong");
            Ok(Routed::Logged)
        }
        ServerMessage::Unknown { kind } => {
            warn!("unhandled message type: {}", kind);
            Ok(Routed::Logged)
        }
    }
}
