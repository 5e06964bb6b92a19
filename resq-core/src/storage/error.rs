// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Storage error types.

use thiserror::Error;

use crate::network::ClientMessage;

/// Storage error types.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The payload is negotiation-critical and must fail loudly instead
    /// of being silently deferred.
    #[error("payload {0} is not deferrable")]
    NotQueueable(String),
}

/// A queued outbound payload awaiting replay.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxEntry {
    pub payload: ClientMessage,
    /// Unix milliseconds when the payload was queued.
    pub enqueued_at: u64,
}
