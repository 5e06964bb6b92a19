// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! Scripted in-memory transport for testing the session, supervisor,
//! router, and client layers without a network.

use std::collections::VecDeque;

use super::error::NetworkError;
use super::message::{ClientMessage, ServerMessage};
use super::transport::{ConnectionState, Transport, TransportConfig, TransportResult};

/// Mock transport recording sent messages and replaying queued ones.
#[derive(Default)]
pub struct MockTransport {
    state: ConnectionState,
    sent: Vec<ClientMessage>,
    incoming: VecDeque<ServerMessage>,
    /// Number of upcoming connect calls that should fail.
    fail_connects: u32,
    /// When true, every send fails with `SendFailed`.
    fail_sends: bool,
    connect_calls: u32,
    disconnect_codes: Vec<u16>,
}

impl MockTransport {
    /// Creates a disconnected mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a message to be returned by `receive`.
    pub fn queue_receive(&mut self, message: ServerMessage) {
        self.incoming.push_back(message);
    }

    /// Messages sent through this transport, in order.
    pub fn sent_messages(&self) -> &[ClientMessage] {
        &self.sent
    }

    /// Clears the sent-message log.
    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Forces the connection state (to simulate server-side drops).
    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    /// Makes the next `n` connect calls fail.
    pub fn fail_next_connects(&mut self, n: u32) {
        self.fail_connects = n;
    }

    /// Makes every send fail until cleared.
    pub fn fail_sends(&mut self, fail: bool) {
        self.fail_sends = fail;
    }

    /// Total number of connect calls observed.
    pub fn connect_attempts(&self) -> u32 {
        self.connect_calls
    }

    /// Close codes passed to `disconnect`, in order.
    pub fn disconnect_codes(&self) -> &[u16] {
        &self.disconnect_codes
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _config: &TransportConfig) -> TransportResult<()> {
        self.connect_calls += 1;
        if self.fail_connects > 0 {
            self.fail_connects -= 1;
            self.state = ConnectionState::Closed;
            return Err(NetworkError::ConnectionFailed("scripted failure".into()));
        }
        self.state = ConnectionState::Open;
        Ok(())
    }

    fn disconnect(&mut self, code: u16, _reason: &str) -> TransportResult<()> {
        self.disconnect_codes.push(code);
        self.state = ConnectionState::Closed;
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn send(&mut self, message: &ClientMessage) -> TransportResult<()> {
        if self.state != ConnectionState::Open {
            return Err(NetworkError::NotConnected);
        }
        if self.fail_sends {
            return Err(NetworkError::SendFailed("scripted failure".into()));
        }
        self.sent.push(message.clone());
        Ok(())
    }

    fn receive(&mut self) -> TransportResult<Option<ServerMessage>> {
        if self.state != ConnectionState::Open {
            return Err(NetworkError::NotConnected);
        }
        Ok(self.incoming.pop_front())
    }

    fn has_pending(&self) -> bool {
        self.state == ConnectionState::Open && !self.incoming.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_connect_send_receive() {
        let mut transport = MockTransport::new();
        assert_eq!(transport.state(), ConnectionState::Closed);

        transport.connect(&TransportConfig::default()).unwrap();
        assert_eq!(transport.state(), ConnectionState::Open);

        transport.send(&ClientMessage::Ping).unwrap();
        assert_eq!(transport.sent_messages(), &[ClientMessage::Ping]);

        transport.queue_receive(ServerMessage::Pong);
        assert!(transport.has_pending());
        assert_eq!(transport.receive().unwrap(), Some(ServerMessage::Pong));
        assert_eq!(transport.receive().unwrap(), None);
    }

    #[test]
    fn test_mock_scripted_connect_failures() {
        let mut transport = MockTransport::new();
        transport.fail_next_connects(2);

        assert!(transport.connect(&TransportConfig::default()).is_err());
        assert!(transport.connect(&TransportConfig::default()).is_err());
        assert!(transport.connect(&TransportConfig::default()).is_ok());
        assert_eq!(transport.connect_attempts(), 3);
    }

    #[test]
    fn test_mock_send_when_closed_errors() {
        let mut transport = MockTransport::new();
        let result = transport.send(&ClientMessage::Ping);
        assert!(matches!(result, Err(NetworkError::NotConnected)));
    }
}
