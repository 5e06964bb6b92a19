// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Negotiation error types

use thiserror::Error;

/// Errors from negotiation transitions.
///
/// These indicate a logic or ordering problem and are never retried;
/// the state machine stays unchanged when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NegotiationError {
    /// A non-terminal request already exists for this rider.
    #[error("request {req_id} already active")]
    RequestExists { req_id: u64 },

    /// Event references a request this machine does not track.
    #[error("unknown request {req_id}")]
    UnknownRequest { req_id: u64 },

    /// Event references a bid that was never offered.
    #[error("no bid from driver {driver_id} for request {req_id}")]
    UnknownBid { driver_id: u64, req_id: u64 },

    /// A different driver already won this request.
    #[error("request {req_id} already accepted for driver {accepted_driver}")]
    AcceptConflict { req_id: u64, accepted_driver: u64 },

    /// The request reached a terminal state and cannot change.
    #[error("request {req_id} already settled")]
    AlreadySettled { req_id: u64 },
}
