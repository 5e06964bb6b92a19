// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Identity
//!
//! Who is talking to the dispatch server: a user ID, a role, and the
//! bearer token issued by the auth layer. Immutable for the lifetime
//! of a connection.

use serde::{Deserialize, Serialize};

use crate::network::NetworkError;

/// Role of a connected user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Requests emergency transport.
    Rider,
    /// Provides emergency transport.
    Driver,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Rider => write!(f, "rider"),
            Role::Driver => write!(f, "driver"),
        }
    }
}

/// Identity presented when opening a transport session.
///
/// Required to open a session; announced to the server in the first
/// frame (`new-client`) before any other traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Server-assigned user ID.
    pub user_id: u64,
    /// Rider or driver.
    pub role: Role,
    /// Bearer token from the auth layer.
    pub auth_token: String,
}

impl SessionIdentity {
    /// Creates a new session identity.
    pub fn new(user_id: u64, role: Role, auth_token: impl Into<String>) -> Self {
        SessionIdentity {
            user_id,
            role,
            auth_token: auth_token.into(),
        }
    }

    /// Validates the identity before a connection attempt.
    ///
    /// A missing token is an authentication problem, not a transport
    /// problem: it is surfaced to the caller and never retried.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.auth_token.trim().is_empty() {
            return Err(NetworkError::AuthenticationFailed(
                "missing auth token".into(),
            ));
        }
        if self.user_id == 0 {
            return Err(NetworkError::AuthenticationFailed("missing user id".into()));
        }
        Ok(())
    }
}
