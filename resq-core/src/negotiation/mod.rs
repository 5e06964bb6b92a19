// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Negotiation State Machine
//!
//! Per-request price negotiation between one rider and any number of
//! candidate drivers: request → driver bid → counter-offer (either
//! side) → accept/reject → trip confirmation. Pure transition logic
//! driven by events; side effects the caller must perform (create the
//! trip, clear a bid) come back as [`Effect`] values.
//!
//! Duplicate or out-of-order delivery is the normal case, not the
//! exception: re-delivering any event for an already-terminal
//! `(driver_id, req_id)` pair is a no-op, while genuinely invalid
//! orderings (accepting a bid that was never offered) are rejected
//! with a [`NegotiationError`] and leave the state untouched.

mod error;

pub use error::NegotiationError;

use std::collections::HashMap;

use log::debug;

use crate::network::TripRequestData;

/// Lifecycle of the rider's outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Negotiating,
    Accepted,
    /// Server-driven terminal rejection; no local transition produces it.
    Rejected,
    Cancelled,
}

impl RequestStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Accepted | RequestStatus::Rejected | RequestStatus::Cancelled
        )
    }
}

/// Lifecycle of one driver's bid on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidStatus {
    Offered,
    Countered,
    Accepted,
    Rejected,
    Cancelled,
}

impl BidStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BidStatus::Accepted | BidStatus::Rejected | BidStatus::Cancelled
        )
    }
}

/// Which party authored a counter-offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Rider,
    Driver,
}

/// The rider's outstanding trip request. One per machine at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
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
    pub created_at: u64,
    pub status: RequestStatus,
}

impl From<TripRequestData> for TripRequest {
    fn from(data: TripRequestData) -> Self {
        TripRequest {
            req_id: data.req_id,
            rider_id: data.rider_id,
            pickup_location: data.pickup_location,
            pickup_lat: data.pickup_lat,
            pickup_lng: data.pickup_lng,
            destination: data.destination,
            destination_lat: data.destination_lat,
            destination_lng: data.destination_lng,
            fare: data.fare,
            created_at: data.created_at,
            status: RequestStatus::Pending,
        }
    }
}

/// One driver's active bid. Keyed by `(driver_id, req_id)`; a later
/// bid for the same key replaces this one (last-write-wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bid {
    pub driver_id: u64,
    pub req_id: u64,
    pub amount: u32,
    /// Which party set the current amount (flips during haggling).
    pub side: Party,
    pub status: BidStatus,
}

/// Counter-offer log entry, kept in arrival order for audit/display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterOffer {
    pub party: Party,
    pub driver_id: u64,
    pub req_id: u64,
    pub amount: u32,
}

/// Events driving the machine, inbound or outbound.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationEvent {
    CreateRequest(TripRequest),
    DriverBidOffer {
        driver_id: u64,
        req_id: u64,
        amount: u32,
    },
    RiderCounterOffer {
        driver_id: u64,
        req_id: u64,
        amount: u32,
    },
    DriverCounterOffer {
        driver_id: u64,
        req_id: u64,
        amount: u32,
    },
    AcceptBid {
        driver_id: u64,
        req_id: u64,
    },
    RejectBid {
        driver_id: u64,
        req_id: u64,
    },
    CancelRequest {
        req_id: u64,
    },
    CancelBid {
        driver_id: u64,
        req_id: u64,
    },
}

/// Side effects the caller must perform after a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The accept settled; create/track the trip with the winning driver.
    TripCreated {
        driver_id: u64,
        req_id: u64,
        amount: u32,
    },
    /// The request was cancelled; notify counterparts and clear UI.
    RequestCleared { req_id: u64 },
    /// One bid was withdrawn; the driver reverts to available.
    BidCleared { driver_id: u64, req_id: u64 },
}

/// Negotiation scope: one outstanding rider request and the bids
/// against it.
#[derive(Debug, Default)]
pub struct Negotiation {
    request: Option<TripRequest>,
    bids: HashMap<u64, Bid>,
    counter_log: Vec<CounterOffer>,
    accepted_driver: Option<u64>,
}

impl Negotiation {
    /// Creates an empty machine with no outstanding request.
    pub fn new() -> Self {
        Negotiation::default()
    }

    /// Applies one event.
    ///
    /// On success returns the side effects the caller must perform;
    /// duplicates of already-settled events return an empty effect
    /// list. On error the machine is unchanged.
    pub fn apply(&mut self, event: NegotiationEvent) -> Result<Vec<Effect>, NegotiationError> {
        match event {
            NegotiationEvent::CreateRequest(request) => self.create_request(request),
            NegotiationEvent::DriverBidOffer {
                driver_id,
                req_id,
                amount,
            } => self.bid_offer(driver_id, req_id, amount),
            NegotiationEvent::RiderCounterOffer {
                driver_id,
                req_id,
                amount,
            } => self.counter_offer(Party::Rider, driver_id, req_id, amount),
            NegotiationEvent::DriverCounterOffer {
                driver_id,
                req_id,
                amount,
            } => self.counter_offer(Party::Driver, driver_id, req_id, amount),
            NegotiationEvent::AcceptBid { driver_id, req_id } => self.accept_bid(driver_id, req_id),
            NegotiationEvent::RejectBid { driver_id, req_id } => self.reject_bid(driver_id, req_id),
            NegotiationEvent::CancelRequest { req_id } => self.cancel_request(req_id),
            NegotiationEvent::CancelBid { driver_id, req_id } => self.cancel_bid(driver_id, req_id),
        }
    }

    fn create_request(&mut self, request: TripRequest) -> Result<Vec<Effect>, NegotiationError> {
        if let Some(existing) = &self.request {
            if !existing.status.is_terminal() {
                if existing.req_id == request.req_id {
                    // Duplicate delivery of the same request.
                    return Ok(vec![]);
                }
                return Err(NegotiationError::RequestExists {
                    req_id: existing.req_id,
                });
            }
        }
        debug!("request {} created", request.req_id);
        self.bids.clear();
        self.counter_log.clear();
        self.accepted_driver = None;
        self.request = Some(TripRequest {
            status: RequestStatus::Pending,
            ..request
        });
        Ok(vec![])
    }

    fn bid_offer(
        &mut self,
        driver_id: u64,
        req_id: u64,
        amount: u32,
    ) -> Result<Vec<Effect>, NegotiationError> {
        if self.pair_is_terminal(driver_id, req_id) {
            return Ok(vec![]);
        }
        let request = self.active_request_mut(req_id)?;
        request.status = RequestStatus::Negotiating;
        self.bids.insert(
            driver_id,
            Bid {
                driver_id,
                req_id,
                amount,
                side: Party::Driver,
                status: BidStatus::Offered,
            },
        );
        Ok(vec![])
    }

    fn counter_offer(
        &mut self,
        party: Party,
        driver_id: u64,
        req_id: u64,
        amount: u32,
    ) -> Result<Vec<Effect>, NegotiationError> {
        if self.pair_is_terminal(driver_id, req_id) {
            return Ok(vec![]);
        }
        self.active_request_mut(req_id)?;
        let bid = self
            .bids
            .get_mut(&driver_id)
            .filter(|b| b.req_id == req_id)
            .ok_or(NegotiationError::UnknownBid { driver_id, req_id })?;
        bid.amount = amount;
        bid.side = party;
        bid.status = BidStatus::Countered;
        self.counter_log.push(CounterOffer {
            party,
            driver_id,
            req_id,
            amount,
        });
        Ok(vec![])
    }

    fn accept_bid(&mut self, driver_id: u64, req_id: u64) -> Result<Vec<Effect>, NegotiationError> {
        // First accepted wins; a repeat for the same driver is a no-op,
        // a different driver is a conflict.
        if let Some(accepted_driver) = self.accepted_driver {
            if self
                .request
                .as_ref()
                .is_some_and(|r| r.req_id == req_id && r.status == RequestStatus::Accepted)
            {
                if accepted_driver == driver_id {
                    return Ok(vec![]);
                }
                return Err(NegotiationError::AcceptConflict {
                    req_id,
                    accepted_driver,
                });
            }
        }

        let amount = self
            .bids
            .get(&driver_id)
            .filter(|b| b.req_id == req_id)
            .ok_or(NegotiationError::UnknownBid { driver_id, req_id })?
            .amount;
        let request = self.active_request_mut(req_id)?;
        request.status = RequestStatus::Accepted;

        // Mutual exclusion: exactly one winner, everyone else rejected
        // atomically with the accept.
        for bid in self.bids.values_mut() {
            bid.status = if bid.driver_id == driver_id {
                BidStatus::Accepted
            } else {
                BidStatus::Rejected
            };
        }
        self.accepted_driver = Some(driver_id);
        debug!("request {} accepted for driver {}", req_id, driver_id);
        Ok(vec![Effect::TripCreated {
            driver_id,
            req_id,
            amount,
        }])
    }

    fn reject_bid(&mut self, driver_id: u64, req_id: u64) -> Result<Vec<Effect>, NegotiationError> {
        if self.pair_is_terminal(driver_id, req_id) {
            return Ok(vec![]);
        }
        let bid = self
            .bids
            .get_mut(&driver_id)
            .filter(|b| b.req_id == req_id)
            .ok_or(NegotiationError::UnknownBid { driver_id, req_id })?;
        bid.status = BidStatus::Rejected;
        // The request itself stays open; other drivers may still bid.
        Ok(vec![])
    }

    fn cancel_request(&mut self, req_id: u64) -> Result<Vec<Effect>, NegotiationError> {
        let Some(request) = &mut self.request else {
            // Already cleared; duplicate delivery.
            return Ok(vec![]);
        };
        if request.req_id != req_id {
            return Err(NegotiationError::UnknownRequest { req_id });
        }
        match request.status {
            RequestStatus::Accepted => Err(NegotiationError::AlreadySettled { req_id }),
            RequestStatus::Cancelled => Ok(vec![]),
            _ => {
                request.status = RequestStatus::Cancelled;
                for bid in self.bids.values_mut() {
                    if !bid.status.is_terminal() {
                        bid.status = BidStatus::Cancelled;
                    }
                }
                debug!("request {} cancelled", req_id);
                Ok(vec![Effect::RequestCleared { req_id }])
            }
        }
    }

    fn cancel_bid(&mut self, driver_id: u64, req_id: u64) -> Result<Vec<Effect>, NegotiationError> {
        if self
            .request
            .as_ref()
            .is_some_and(|r| r.req_id == req_id && r.status == RequestStatus::Accepted)
            && self.accepted_driver == Some(driver_id)
        {
            return Err(NegotiationError::AlreadySettled { req_id });
        }
        match self.bids.get(&driver_id) {
            Some(bid) if bid.req_id == req_id && !bid.status.is_terminal() => {
                self.bids.remove(&driver_id);
                Ok(vec![Effect::BidCleared { driver_id, req_id }])
            }
            // Unknown or already-terminal bid: duplicate delivery.
            _ => Ok(vec![]),
        }
    }

    /// The outstanding request, if any.
    pub fn request(&self) -> Option<&TripRequest> {
        self.request.as_ref()
    }

    /// All bids against the outstanding request, keyed by driver ID.
    pub fn bids(&self) -> &HashMap<u64, Bid> {
        &self.bids
    }

    /// One driver's bid.
    pub fn bid(&self, driver_id: u64) -> Option<&Bid> {
        self.bids.get(&driver_id)
    }

    /// Counter-offers in arrival order.
    pub fn counter_log(&self) -> &[CounterOffer] {
        &self.counter_log
    }

    /// Winning driver once the request settled.
    pub fn accepted_driver(&self) -> Option<u64> {
        self.accepted_driver
    }

    /// Drops all state, terminal or not. Used on session teardown.
    pub fn clear(&mut self) {
        self.request = None;
        self.bids.clear();
        self.counter_log.clear();
        self.accepted_driver = None;
    }

    fn pair_is_terminal(&self, driver_id: u64, req_id: u64) -> bool {
        self.bids
            .get(&driver_id)
            .is_some_and(|b| b.req_id == req_id && b.status.is_terminal())
    }

    fn active_request_mut(
        &mut self,
        req_id: u64,
    ) -> Result<&mut TripRequest, NegotiationError> {
        let request = self
            .request
            .as_mut()
            .filter(|r| r.req_id == req_id)
            .ok_or(NegotiationError::UnknownRequest { req_id })?;
        if request.status.is_terminal() {
            return Err(NegotiationError::AlreadySettled { req_id });
        }
        Ok(request)
    }
}
