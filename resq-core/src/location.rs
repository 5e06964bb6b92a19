// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Location Acquisition
//!
//! Seam for the platform's positioning sensor. Acquisition can fail
//! (denied permission, timeout, no fix) and those failures propagate to
//! the caller untouched; no fallback coordinate is ever fabricated.

use std::time::Duration;

use thiserror::Error;

/// Default acquisition timeout before giving up.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Location acquisition failures. Surfaced to the caller; never
/// retried or papered over here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location acquisition timed out")]
    Timeout,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// A sensor fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Platform positioning sensor.
pub trait LocationProvider {
    /// Acquires the current position, failing after `timeout` rather
    /// than hanging.
    fn current_position(&mut self, timeout: Duration) -> Result<Coordinates, LocationError>;
}

/// Scripted provider for tests.
#[derive(Debug, Default)]
pub struct MockLocationProvider {
    fixes: std::collections::VecDeque<Result<Coordinates, LocationError>>,
}

impl MockLocationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful fix.
    pub fn push_fix(&mut self, latitude: f64, longitude: f64) {
        self.fixes.push_back(Ok(Coordinates {
            latitude,
            longitude,
        }));
    }

    /// Queues a failure.
    pub fn push_error(&mut self, error: LocationError) {
        self.fixes.push_back(Err(error));
    }
}

impl LocationProvider for MockLocationProvider {
    fn current_position(&mut self, _timeout: Duration) -> Result<Coordinates, LocationError> {
        self.fixes
            .pop_front()
            .unwrap_or(Err(LocationError::Unavailable("no scripted fix".into())))
    }
}
