// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Retry/Backoff Supervisor
//!
//! Wraps a [`Session`] and decides when to (re)connect: capped attempts,
//! exponential backoff through an injected clock, and its own
//! single-flight guard on top of the session's (defense in depth).
//! Exhausting retries is not fatal to the process — the caller is left
//! in `Closed` state and may try a fresh manual connect.

use log::{debug, warn};

use super::backoff::{BackoffSchedule, Clock};
use super::error::NetworkError;
use super::message::ClientMessage;
use super::session::{is_clean_close, Session};
use super::transport::{ConnectionState, Transport, TransportConfig};
use crate::identity::SessionIdentity;

/// Supervises one session's connection lifecycle.
pub struct Supervisor<T: Transport, C: Clock> {
    session: Session<T>,
    clock: C,
    reconnect_schedule: BackoffSchedule,
    send_schedule: BackoffSchedule,
    /// Extra attempts after the first failure (so N+1 total).
    max_retries: u32,
    /// Supervisor-level single-flight guard.
    connecting: bool,
}

impl<T: Transport, C: Clock> Supervisor<T, C> {
    /// Creates a supervisor around a fresh session.
    pub fn new(transport: T, config: TransportConfig, clock: C) -> Self {
        let reconnect_schedule = BackoffSchedule::from_millis(
            config.reconnect_base_delay_ms,
            config.reconnect_max_delay_ms,
        );
        let send_schedule =
            BackoffSchedule::from_millis(config.send_base_delay_ms, config.send_max_delay_ms);
        let max_retries = config.max_reconnect_attempts;
        Supervisor {
            session: Session::new(transport, config),
            clock,
            reconnect_schedule,
            send_schedule,
            max_retries,
            connecting: false,
        }
    }

    /// Connects with retries and backoff.
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` when another connect
    /// is already in flight (the attempt is suppressed, not queued).
    /// Authentication failures are surfaced immediately, never retried.
    pub fn connect(&mut self, identity: &SessionIdentity) -> Result<bool, NetworkError> {
        if self.connecting {
            debug!("connect suppressed: attempt already in progress");
            return Ok(false);
        }

        self.connecting = true;
        let result = self.connect_with_retries(identity);
        self.connecting = false;
        result.map(|()| true)
    }

    fn connect_with_retries(&mut self, identity: &SessionIdentity) -> Result<(), NetworkError> {
        for attempt in 0..=self.max_retries {
            match self.session.open(identity) {
                Ok(()) => {
                    debug!("connected on attempt {}", attempt + 1);
                    return Ok(());
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(
                        "connect attempt {}/{} failed: {}",
                        attempt + 1,
                        self.max_retries + 1,
                        e
                    );
                    if attempt < self.max_retries {
                        self.clock.sleep(self.reconnect_schedule.delay_for(attempt));
                    }
                }
            }
        }
        Err(NetworkError::MaxRetriesExceeded)
    }

    /// Reacts to a close event.
    ///
    /// Reconnects only when the closure was abnormal; a clean shutdown
    /// (1000/1001) stays closed. Returns whether a connection is open
    /// afterwards.
    pub fn handle_close(
        &mut self,
        close_code: u16,
        identity: &SessionIdentity,
    ) -> Result<bool, NetworkError> {
        if is_clean_close(close_code) {
            debug!("clean close ({}), not reconnecting", close_code);
            return Ok(false);
        }
        warn!("abnormal close ({}), reconnecting", close_code);
        self.connect(identity)
    }

    /// Sends with in-session retries on the short backoff schedule.
    ///
    /// Each retry waits `min(1s * 2^n, 4s)` and re-checks readiness.
    /// Returns `false` once retries are exhausted; never errors.
    pub fn send_with_retries(&mut self, message: &ClientMessage, max_retries: u32) -> bool {
        for attempt in 0..=max_retries {
            if self.session.try_send(message) {
                return true;
            }
            if attempt < max_retries {
                self.clock.sleep(self.send_schedule.delay_for(attempt));
            }
        }
        false
    }

    /// Returns true if the session is open.
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    /// Returns the session's connection state.
    pub fn state(&self) -> ConnectionState {
        self.session.state()
    }

    /// Returns a reference to the supervised session.
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Returns a mutable reference to the supervised session.
    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// Returns the injected clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
