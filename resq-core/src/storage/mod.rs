// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persistent Storage Module
//!
//! SQLite-backed durability for the offline outbox. Queued payloads
//! survive process restarts so a driver's last location push is not
//! lost across a crash or app kill.

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod outbox;
#[cfg(not(feature = "testing"))]
mod outbox;

pub use error::{OutboxEntry, StorageError};
pub use outbox::{Outbox, OUTBOX_CAPACITY};

use rusqlite::Connection;
use std::path::Path;

/// SQLite-based storage implementation.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens or creates a storage database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let storage = Storage { conn };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Creates an in-memory storage (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let storage = Storage { conn };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS outbox (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                payload TEXT NOT NULL,
                enqueued_at INTEGER NOT NULL
            );",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_creates_schema() {
        let storage = Storage::in_memory().unwrap();
        assert_eq!(storage.outbox_len().unwrap(), 0);
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resq.db");

        {
            let storage = Storage::open(&path).unwrap();
            storage
                .outbox_push(&crate::network::ClientMessage::Ping, 1_000)
                .unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.outbox_len().unwrap(), 1);
    }
}
