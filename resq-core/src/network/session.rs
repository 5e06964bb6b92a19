// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Session
//!
//! Owns exactly one bidirectional connection to the dispatch server:
//! open, announce identity, send, receive, close. No business semantics
//! live here; queuing and retry decisions belong to the callers.

use log::warn;

use super::error::NetworkError;
use super::message::{ClientMessage, NewClient, ServerMessage};
use super::transport::{ConnectionState, Transport, TransportConfig, TransportResult};
use crate::identity::SessionIdentity;

/// Normal-closure WebSocket codes. Everything else is abnormal and
/// eligible for reconnection.
pub const CLOSE_NORMAL: u16 = 1000;
pub const CLOSE_GOING_AWAY: u16 = 1001;

/// Returns true if `code` is a clean, intentional shutdown.
pub fn is_clean_close(code: u16) -> bool {
    code == CLOSE_NORMAL || code == CLOSE_GOING_AWAY
}

/// One transport session bound to one identity.
pub struct Session<T: Transport> {
    transport: T,
    config: TransportConfig,
    /// Guards against duplicate sockets from overlapping open calls.
    opening: bool,
}

impl<T: Transport> Session<T> {
    /// Creates a closed session.
    pub fn new(transport: T, config: TransportConfig) -> Self {
        Session {
            transport,
            config,
            opening: false,
        }
    }

    /// Opens the connection and announces `identity` as the first frame.
    ///
    /// Single-flight: returns `ConnectionInProgress` if an attempt is
    /// already in flight, so overlapping calls can never produce two
    /// sockets for one identity.
    pub fn open(&mut self, identity: &SessionIdentity) -> TransportResult<()> {
        if self.opening || self.transport.state() == ConnectionState::Connecting {
            return Err(NetworkError::ConnectionInProgress);
        }
        if self.is_open() {
            return Ok(());
        }

        identity.validate()?;

        self.opening = true;
        let result = self.open_and_announce(identity);
        self.opening = false;
        result
    }

    fn open_and_announce(&mut self, identity: &SessionIdentity) -> TransportResult<()> {
        self.transport.connect(&self.config)?;

        // Identity announcement must precede all other traffic.
        let announce = ClientMessage::NewClient(NewClient {
            id: identity.user_id,
            role: identity.role,
            token: identity.auth_token.clone(),
        });
        if let Err(e) = self.transport.send(&announce) {
            let _ = self.transport.disconnect(CLOSE_NORMAL, "announce failed");
            return Err(e);
        }
        Ok(())
    }

    /// Sends a message, erroring when the session is not open.
    ///
    /// Use this for negotiation-critical traffic that must fail loudly.
    pub fn send(&mut self, message: &ClientMessage) -> TransportResult<()> {
        if !self.is_open() {
            return Err(NetworkError::NotConnected);
        }
        self.transport.send(message)
    }

    /// Sends a message, returning `false` instead of an error when the
    /// session is not open. Callers are responsible for queuing.
    pub fn try_send(&mut self, message: &ClientMessage) -> bool {
        match self.send(message) {
            Ok(()) => true,
            Err(e) => {
                warn!("send of {} failed: {}", message.kind(), e);
                false
            }
        }
    }

    /// Receives the next inbound message, if any.
    ///
    /// After `close()` this returns `Err(NotConnected)`; no message is
    /// ever delivered past an acknowledged close.
    pub fn receive(&mut self) -> TransportResult<Option<ServerMessage>> {
        if !self.is_open() {
            return Err(NetworkError::NotConnected);
        }
        self.transport.receive()
    }

    /// Checks for pending inbound messages without blocking.
    pub fn has_pending(&self) -> bool {
        self.transport.has_pending()
    }

    /// Closes the session.
    pub fn close(&mut self, code: u16, reason: &str) -> TransportResult<()> {
        self.transport.disconnect(code, reason)
    }

    /// Returns true if connected and ready.
    pub fn is_open(&self) -> bool {
        self.transport.state() == ConnectionState::Open
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
