//! Resq Core Library
//!
//! Real-time dispatch core for emergency transport: a supervised
//! WebSocket session with retry/backoff, a live driver presence
//! registry, a price-negotiation state machine, and a bounded offline
//! outbox that survives restarts.

pub mod client;
pub mod identity;
pub mod location;
pub mod negotiation;
pub mod network;
pub mod presence;
pub mod router;
pub mod storage;

pub use client::{
    ClientError, DispatchClient, MockRequestEndpoint, RequestDraft, RequestEndpoint,
};
pub use identity::{Role, SessionIdentity};
pub use location::{
    Coordinates, LocationError, LocationProvider, MockLocationProvider, DEFAULT_LOCATION_TIMEOUT,
};
pub use negotiation::{
    Bid, BidStatus, CounterOffer, Effect, Negotiation, NegotiationError, NegotiationEvent, Party,
    RequestStatus, TripRequest,
};
pub use network::{
    ClientMessage, ConnectionState, MockTransport, NetworkError, ServerMessage, Supervisor,
    Transport, TransportConfig,
};
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use network::WebSocketTransport;
pub use presence::{
    DriverStatus, PresenceEvent, PresenceHandler, PresenceRecord, PresenceRegistry, PresenceUpdate,
};
pub use router::{route, Routed};
pub use storage::{Outbox, OutboxEntry, Storage, StorageError, OUTBOX_CAPACITY};
