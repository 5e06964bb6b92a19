// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Lifecycle Integration Tests
//!
//! Verifies the supervised session against flaky-network behavior:
//! identity announcement ordering, single-flight opens, retry with
//! exponential backoff, and clean-vs-abnormal close handling.

use std::time::Duration;

use resq_core::network::{ManualClock, MockTransport, Supervisor};
use resq_core::{ClientMessage, ConnectionState, Role, SessionIdentity, TransportConfig};

fn identity() -> SessionIdentity {
    SessionIdentity::new(7, Role::Driver, "secret-token")
}

fn supervisor(transport: MockTransport) -> Supervisor<MockTransport, ManualClock> {
    Supervisor::new(transport, TransportConfig::default(), ManualClock::new())
}

// ============================================================
// Identity announcement
// ============================================================

#[test]
fn test_announce_is_first_frame() {
    let mut sup = supervisor(MockTransport::new());
    sup.connect(&identity()).unwrap();

    let sent = sup.session().transport().sent_messages();
    assert!(!sent.is_empty(), "open must announce identity");
    match &sent[0] {
        ClientMessage::NewClient(announce) => {
            assert_eq!(announce.id, 7);
            assert_eq!(announce.role, Role::Driver);
            assert_eq!(announce.token, "secret-token");
        }
        other => panic!("first frame was {:?}, expected new-client", other),
    }
}

#[test]
fn test_missing_token_rejected_before_dialing() {
    let mut sup = supervisor(MockTransport::new());
    let anonymous = SessionIdentity::new(7, Role::Driver, "");

    assert!(sup.connect(&anonymous).is_err());
    assert_eq!(
        sup.session().transport().connect_attempts(),
        0,
        "invalid identity must not open a socket"
    );
}

// ============================================================
// Retry with backoff
// Scenario: abnormal close schedules 3 reconnects at ~2s, 4s, 8s
// ============================================================

#[test]
fn test_reconnect_backoff_schedule() {
    let mut transport = MockTransport::new();
    transport.fail_next_connects(10);
    let mut sup = supervisor(transport);

    assert!(sup.connect(&identity()).is_err());

    assert_eq!(sup.session().transport().connect_attempts(), 4);
    assert_eq!(
        sup.clock().slept(),
        vec![
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8),
        ]
    );
}

#[test]
fn test_exhausted_retries_leave_closed_not_poisoned() {
    let mut transport = MockTransport::new();
    transport.fail_next_connects(4);
    let mut sup = supervisor(transport);

    assert!(sup.connect(&identity()).is_err());
    assert_eq!(sup.state(), ConnectionState::Closed);

    // A fresh manual connect is still eligible.
    assert!(sup.connect(&identity()).unwrap());
    assert!(sup.is_open());
}

// ============================================================
// Close handling
// ============================================================

#[test]
fn test_clean_close_stays_closed() {
    let mut sup = supervisor(MockTransport::new());
    sup.connect(&identity()).unwrap();
    sup.session_mut().close(1000, "done").unwrap();

    assert!(!sup.handle_close(1000, &identity()).unwrap());
    assert_eq!(sup.session().transport().connect_attempts(), 1);
}

#[test]
fn test_abnormal_close_triggers_reconnect() {
    let mut sup = supervisor(MockTransport::new());
    sup.connect(&identity()).unwrap();
    sup.session_mut()
        .transport_mut()
        .set_state(ConnectionState::Closed);

    assert!(sup.handle_close(1006, &identity()).unwrap());
    assert_eq!(sup.session().transport().connect_attempts(), 2);
}

// ============================================================
// Single-flight
// ============================================================

#[test]
fn test_open_while_connecting_is_rejected() {
    let mut sup = supervisor(MockTransport::new());
    sup.session_mut()
        .transport_mut()
        .set_state(ConnectionState::Connecting);

    // The session-level guard refuses a second open for the same
    // identity while one is in flight.
    assert!(sup.session_mut().open(&identity()).is_err());
    assert_eq!(sup.session().transport().connect_attempts(), 0);
}

#[test]
fn test_send_retries_follow_short_schedule() {
    let mut sup = supervisor(MockTransport::new());

    // Closed session: every try fails, backoff is 1s, 2s, 4s capped.
    assert!(!sup.send_with_retries(&ClientMessage::Ping, 4));
    assert_eq!(
        sup.clock().slept(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(4),
        ]
    );
}
