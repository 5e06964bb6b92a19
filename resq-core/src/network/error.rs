// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network error types.

use thiserror::Error;

/// Network error types.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection attempt already in progress")]
    ConnectionInProgress,

    #[error("Not connected")]
    NotConnected,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection timed out")]
    Timeout,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Maximum retry attempts exceeded")]
    MaxRetriesExceeded,
}

impl NetworkError {
    /// Returns true if a retry might succeed.
    ///
    /// Authentication failures and protocol violations are never
    /// retried; transport failures are, up to the configured cap.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NetworkError::ConnectionFailed(_)
                | NetworkError::ConnectionClosed
                | NetworkError::Timeout
                | NetworkError::SendFailed(_)
                | NetworkError::ReceiveFailed(_)
                | NetworkError::NotConnected
        )
    }
}
