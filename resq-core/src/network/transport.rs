//! Transport Trait
//!
//! Platform-agnostic abstraction for the bidirectional dispatch connection.

use super::error::NetworkError;
use super::message::{ClientMessage, ServerMessage};

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Connection state.
///
/// Owned exclusively by the transport; read-only everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection.
    #[default]
    Closed,
    /// Connection attempt in progress.
    Connecting,
    /// Connected and ready.
    Open,
    /// Close handshake in progress.
    Closing,
}

impl ConnectionState {
    /// Numeric code mirroring the state (WebSocket readyState numbering).
    pub fn code(&self) -> u8 {
        match self {
            ConnectionState::Connecting => 0,
            ConnectionState::Open => 1,
            ConnectionState::Closing => 2,
            ConnectionState::Closed => 3,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Closed => "CLOSED",
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Open => "OPEN",
            ConnectionState::Closing => "CLOSING",
        };
        write!(f, "{}", name)
    }
}

/// Configuration for transport connections.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Server URL/address.
    pub server_url: String,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Read/write timeout in milliseconds.
    pub io_timeout_ms: u64,
    /// Extra reconnection attempts after the first failure (4 total).
    pub max_reconnect_attempts: u32,
    /// Base delay for reconnect backoff (milliseconds).
    pub reconnect_base_delay_ms: u64,
    /// Ceiling for reconnect backoff (milliseconds).
    pub reconnect_max_delay_ms: u64,
    /// Base delay for in-session send retries (milliseconds).
    pub send_base_delay_ms: u64,
    /// Ceiling for in-session send retries (milliseconds).
    pub send_max_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            server_url: String::new(),
            connect_timeout_ms: 10_000,
            io_timeout_ms: 30_000,
            max_reconnect_attempts: 3,
            reconnect_base_delay_ms: 2_000,
            reconnect_max_delay_ms: 8_000,
            send_base_delay_ms: 1_000,
            send_max_delay_ms: 4_000,
        }
    }
}

/// Transport trait for the dispatch connection.
///
/// Abstracts the underlying mechanism (WebSocket, mock) so the session
/// layer can be tested without a network. Synchronous interface; platform
/// implementations may run an async runtime internally but expose a
/// blocking surface here.
pub trait Transport: Send {
    /// Connects to the dispatch server.
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()>;

    /// Disconnects. Safe to call when not connected.
    ///
    /// `code`/`reason` follow WebSocket close semantics (1000 = normal).
    fn disconnect(&mut self, code: u16, reason: &str) -> TransportResult<()>;

    /// Returns the current connection state.
    fn state(&self) -> ConnectionState;

    /// Sends one outbound message. Errors if not open.
    fn send(&mut self, message: &ClientMessage) -> TransportResult<()>;

    /// Receives the next inbound message.
    ///
    /// Returns `Ok(None)` when no message is available (timeout without
    /// error) or when a malformed frame was dropped.
    fn receive(&mut self) -> TransportResult<Option<ServerMessage>>;

    /// Checks if there are pending inbound messages (non-blocking).
    fn has_pending(&self) -> bool;
}
