// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Dispatch Client
//!
//! Process-wide session context: one supervised connection, the
//! presence registry, the negotiation machine, and the offline outbox,
//! driven cooperatively from the caller's event loop. All mutation of
//! the registry and the machine goes through this type's entry points,
//! each of which completes synchronously with no partial-update yield
//! points.

use std::collections::VecDeque;

use log::{debug, info, warn};
use thiserror::Error;

use crate::identity::SessionIdentity;
use crate::location::{LocationError, LocationProvider, DEFAULT_LOCATION_TIMEOUT};
use crate::negotiation::{Negotiation, NegotiationError, NegotiationEvent, TripRequest};
use crate::network::{
    BidData, ClientMessage, Clock, ConnectionState, LocationPush, NetworkError, Supervisor,
    Transport, TransportConfig, TripRequestData, CLOSE_NORMAL,
};
use crate::presence::PresenceRegistry;
use crate::router::{route, Routed};
use crate::storage::{Outbox, StorageError};

/// Top-level client error taxonomy.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("request endpoint error: {0}")]
    Endpoint(String),
}

/// Fields the rider supplies when posting a request; the server assigns
/// the request identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDraft {
    pub rider_id: u64,
    pub pickup_location: String,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub destination: String,
    pub destination_lat: f64,
    pub destination_lng: f64,
    /// Fare ceiling the rider will accept.
    pub fare: u32,
}

/// HTTP request-creation endpoint. Returns the server-assigned
/// request identifier.
pub trait RequestEndpoint {
    fn create_request(&mut self, draft: &RequestDraft) -> Result<u64, ClientError>;
}

/// Scripted endpoint for tests.
#[derive(Debug, Default)]
pub struct MockRequestEndpoint {
    next_id: u64,
    fail: bool,
    pub drafts: Vec<RequestDraft>,
}

impl MockRequestEndpoint {
    pub fn new(first_id: u64) -> Self {
        MockRequestEndpoint {
            next_id: first_id,
            fail: false,
            drafts: Vec::new(),
        }
    }

    pub fn fail_requests(&mut self, fail: bool) {
        self.fail = fail;
    }
}

impl RequestEndpoint for MockRequestEndpoint {
    fn create_request(&mut self, draft: &RequestDraft) -> Result<u64, ClientError> {
        if self.fail {
            return Err(ClientError::Endpoint("scripted failure".into()));
        }
        self.drafts.push(draft.clone());
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }
}

/// One user's dispatch session.
pub struct DispatchClient<T: Transport, C: Clock> {
    supervisor: Supervisor<T, C>,
    identity: SessionIdentity,
    registry: PresenceRegistry,
    negotiation: Negotiation,
    outbox: Outbox,
    /// First location push of a session announces, later ones update.
    announced_location: bool,
}

impl<T: Transport, C: Clock> DispatchClient<T, C> {
    /// Creates a client around an unopened transport.
    pub fn new(
        transport: T,
        config: TransportConfig,
        clock: C,
        identity: SessionIdentity,
        outbox: Outbox,
    ) -> Self {
        DispatchClient {
            supervisor: Supervisor::new(transport, config, clock),
            identity,
            registry: PresenceRegistry::new(),
            negotiation: Negotiation::new(),
            outbox,
            announced_location: false,
        }
    }

    /// Connects with retries and backoff.
    ///
    /// `Ok(false)` means another attempt was already in flight.
    pub fn connect(&mut self) -> Result<bool, ClientError> {
        Ok(self.supervisor.connect(&self.identity)?)
    }

    /// Closes the session cleanly and drops all volatile state.
    ///
    /// The outbox is durable and survives; presence and negotiation do
    /// not outlive their session.
    pub fn disconnect(&mut self) -> Result<(), ClientError> {
        self.supervisor
            .session_mut()
            .close(CLOSE_NORMAL, "client disconnect")?;
        self.registry.clear();
        self.negotiation.clear();
        self.announced_location = false;
        info!("session closed");
        Ok(())
    }

    /// Reacts to a transport close event; reconnects on abnormal codes.
    pub fn handle_close(&mut self, close_code: u16) -> Result<bool, ClientError> {
        Ok(self.supervisor.handle_close(close_code, &self.identity)?)
    }

    /// Pumps every pending inbound frame through the router.
    ///
    /// Negotiation conflicts from inbound traffic are reported and
    /// dropped rather than aborting the pump; they indicate an ordering
    /// problem on the wire, not in this process. A registration
    /// greeting triggers the outbox drain inline.
    pub fn process_incoming(&mut self) -> Result<Vec<Routed>, ClientError> {
        if !self.supervisor.is_open() {
            return Ok(Vec::new());
        }
        let mut routed = Vec::new();
        let mut inbound = VecDeque::new();
        loop {
            match self.supervisor.session_mut().receive() {
                Ok(Some(message)) => inbound.push_back(message),
                Ok(None) => break,
                Err(NetworkError::ConnectionClosed) => break,
                Err(e) => return Err(e.into()),
            }
        }

        for message in inbound {
            match route(message, &mut self.registry, &mut self.negotiation) {
                Ok(Routed::DrainRequested { user_id }) => {
                    let sent = self.drain_outbox()?;
                    debug!("drained {} outbox entries for user {}", sent, user_id);
                    routed.push(Routed::DrainRequested { user_id });
                }
                Ok(r) => routed.push(r),
                Err(e) => warn!("dropping conflicting negotiation event: {}", e),
            }
        }
        Ok(routed)
    }

    fn drain_outbox(&mut self) -> Result<usize, ClientError> {
        let session = self.supervisor.session_mut();
        Ok(self.outbox.drain(|payload| session.try_send(payload))?)
    }

    /// Sends one location fix, queueing it for replay when the session
    /// is down.
    pub fn send_location(
        &mut self,
        latitude: f64,
        longitude: f64,
        now_ms: u64,
    ) -> Result<bool, ClientError> {
        let push = LocationPush {
            driver_id: self.identity.user_id,
            latitude,
            longitude,
            timestamp: now_ms,
        };
        let message = if self.announced_location {
            ClientMessage::UpdateLocation(push)
        } else {
            ClientMessage::AddLocation(push)
        };

        if self.supervisor.session_mut().try_send(&message) {
            self.announced_location = true;
            return Ok(true);
        }
        self.outbox.enqueue(&message, now_ms)?;
        debug!("location queued offline ({} pending)", self.outbox.len()?);
        Ok(false)
    }

    /// Acquires a fix from the sensor and sends it.
    ///
    /// Acquisition failures propagate untouched; no coordinate is
    /// fabricated.
    pub fn push_current_location(
        &mut self,
        provider: &mut dyn LocationProvider,
        now_ms: u64,
    ) -> Result<bool, ClientError> {
        let fix = provider.current_position(DEFAULT_LOCATION_TIMEOUT)?;
        self.send_location(fix.latitude, fix.longitude, now_ms)
    }

    /// Posts a new trip request.
    ///
    /// The endpoint assigns the request ID; the request is then tracked
    /// locally and broadcast. Send failure is loud — negotiation
    /// traffic is never deferred.
    pub fn create_request(
        &mut self,
        endpoint: &mut dyn RequestEndpoint,
        draft: RequestDraft,
        now_ms: u64,
    ) -> Result<u64, ClientError> {
        let req_id = endpoint.create_request(&draft)?;
        let data = TripRequestData {
            req_id,
            rider_id: draft.rider_id,
            pickup_location: draft.pickup_location,
            pickup_lat: draft.pickup_lat,
            pickup_lng: draft.pickup_lng,
            destination: draft.destination,
            destination_lat: draft.destination_lat,
            destination_lng: draft.destination_lng,
            fare: draft.fare,
            created_at: now_ms,
        };
        self.negotiation
            .apply(NegotiationEvent::CreateRequest(TripRequest::from(
                data.clone(),
            )))?;
        self.send_critical(&ClientMessage::NewTripRequest(data))?;
        info!("trip request {} posted", req_id);
        Ok(req_id)
    }

    /// Driver offers a fare on a request.
    pub fn place_bid(&mut self, req_id: u64, amount: u32) -> Result<(), ClientError> {
        let driver_id = self.identity.user_id;
        self.negotiation.apply(NegotiationEvent::DriverBidOffer {
            driver_id,
            req_id,
            amount,
        })?;
        self.send_critical(&ClientMessage::DriverBidOffer(BidData {
            driver_id,
            req_id,
            amount,
        }))
    }

    /// Rider counters a driver's offer.
    pub fn counter_offer(
        &mut self,
        driver_id: u64,
        req_id: u64,
        amount: u32,
    ) -> Result<(), ClientError> {
        self.negotiation.apply(NegotiationEvent::RiderCounterOffer {
            driver_id,
            req_id,
            amount,
        })?;
        self.send_critical(&ClientMessage::RiderCounterOffer(BidData {
            driver_id,
            req_id,
            amount,
        }))
    }

    /// Rider accepts one driver's bid; all other bids settle rejected.
    pub fn accept_bid(&mut self, driver_id: u64, req_id: u64) -> Result<(), ClientError> {
        let amount = self
            .negotiation
            .bid(driver_id)
            .map(|b| b.amount)
            .unwrap_or_default();
        self.negotiation
            .apply(NegotiationEvent::AcceptBid { driver_id, req_id })?;
        self.send_critical(&ClientMessage::BidAccepted(BidData {
            driver_id,
            req_id,
            amount,
        }))
    }

    /// Rider rejects one driver's bid; the request stays open.
    pub fn reject_bid(&mut self, driver_id: u64, req_id: u64) -> Result<(), ClientError> {
        let amount = self
            .negotiation
            .bid(driver_id)
            .map(|b| b.amount)
            .unwrap_or_default();
        self.negotiation
            .apply(NegotiationEvent::RejectBid { driver_id, req_id })?;
        self.send_critical(&ClientMessage::BidRejected(BidData {
            driver_id,
            req_id,
            amount,
        }))
    }

    /// Rider withdraws the whole request.
    pub fn cancel_request(&mut self, req_id: u64) -> Result<(), ClientError> {
        self.negotiation
            .apply(NegotiationEvent::CancelRequest { req_id })?;
        self.send_critical(&ClientMessage::CancelRequest { req_id })
    }

    /// Driver withdraws one bid.
    pub fn cancel_bid(&mut self, req_id: u64) -> Result<(), ClientError> {
        let driver_id = self.identity.user_id;
        self.negotiation
            .apply(NegotiationEvent::CancelBid { driver_id, req_id })?;
        self.send_critical(&ClientMessage::CancelBid { driver_id, req_id })
    }

    /// Sends a heartbeat; `false` when the session is not open.
    pub fn ping(&mut self) -> bool {
        self.supervisor.session_mut().try_send(&ClientMessage::Ping)
    }

    /// Negotiation-critical send: fails loudly, never queues.
    fn send_critical(&mut self, message: &ClientMessage) -> Result<(), ClientError> {
        Ok(self.supervisor.session_mut().send(message)?)
    }

    /// Connection state of the underlying session.
    pub fn state(&self) -> ConnectionState {
        self.supervisor.state()
    }

    /// True when the session is open.
    pub fn is_open(&self) -> bool {
        self.supervisor.is_open()
    }

    /// This session's identity.
    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    /// The live presence registry.
    pub fn registry(&self) -> &PresenceRegistry {
        &self.registry
    }

    /// Mutable registry access, for subscribing handlers.
    pub fn registry_mut(&mut self) -> &mut PresenceRegistry {
        &mut self.registry
    }

    /// The negotiation machine.
    pub fn negotiation(&self) -> &Negotiation {
        &self.negotiation
    }

    /// The offline outbox.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// The connection supervisor.
    pub fn supervisor_mut(&mut self) -> &mut Supervisor<T, C> {
        &mut self.supervisor
    }
}
