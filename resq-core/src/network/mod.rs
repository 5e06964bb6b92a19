//! Network + Transport Layer
//!
//! Persistent bidirectional connection to the dispatch server, built to
//! survive flaky networks.
//!
//! # Architecture
//!
//! The network layer consists of:
//! - **Transport trait**: Platform-agnostic interface for network I/O
//! - **Message types**: Closed tagged unions for the wire protocol
//! - **Protocol layer**: JSON envelope codec, validated once at ingress
//! - **Session**: One connection, identity announcement, single-flight open
//! - **Supervisor**: Retry with exponential backoff through an injected clock
//!
//! # Example
//!
//! ```ignore
//! use resq_core::network::{MockTransport, Supervisor, TransportConfig};
//! use resq_core::network::backoff::SystemClock;
//! use resq_core::{Role, SessionIdentity};
//!
//! let identity = SessionIdentity::new(7, Role::Driver, "token");
//! let mut supervisor = Supervisor::new(
//!     MockTransport::new(),
//!     TransportConfig::default(),
//!     SystemClock,
//! );
//! supervisor.connect(&identity)?;
//! ```

#[cfg(feature = "testing")]
pub mod backoff;
#[cfg(not(feature = "testing"))]
mod backoff;

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod message;
#[cfg(not(feature = "testing"))]
mod message;

#[cfg(feature = "testing")]
pub mod mock;
#[cfg(not(feature = "testing"))]
mod mock;

#[cfg(feature = "testing")]
pub mod protocol;
#[cfg(not(feature = "testing"))]
mod protocol;

#[cfg(feature = "testing")]
pub mod session;
#[cfg(not(feature = "testing"))]
mod session;

#[cfg(feature = "testing")]
pub mod supervisor;
#[cfg(not(feature = "testing"))]
mod supervisor;

#[cfg(feature = "testing")]
pub mod transport;
#[cfg(not(feature = "testing"))]
mod transport;

#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
mod websocket;

// Error types
pub use error::NetworkError;

// Message types
pub use message::{
    BidData, BidOutcome, ClientMessage, ConnectionEstablished, DriverLocation, ErrorData,
    LocationPush, NewClient, ServerMessage, TripDetails, TripRequestData,
};

// Protocol utilities
pub use protocol::{decode_message, encode_message, MAX_MESSAGE_SIZE};

// Transport abstraction
pub use transport::{ConnectionState, Transport, TransportConfig, TransportResult};

// Mock transport for testing
pub use mock::MockTransport;

// WebSocket transport for production
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use websocket::WebSocketTransport;

// Session and supervision
pub use backoff::{BackoffSchedule, Clock, ManualClock, SystemClock};
pub use session::{is_clean_close, Session, CLOSE_GOING_AWAY, CLOSE_NORMAL};
pub use supervisor::Supervisor;
