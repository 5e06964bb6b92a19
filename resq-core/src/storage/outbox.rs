// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Offline outbox storage operations.
//!
//! Bounded, durable queue of undelivered payloads replayed after a
//! reconnect. Only delay-tolerant payloads (location pushes) qualify;
//! negotiation-critical messages are refused so their failures stay
//! visible to the caller.

use log::{debug, warn};
use rusqlite::params;

use super::error::{OutboxEntry, StorageError};
use super::Storage;
use crate::network::ClientMessage;

/// Most recent entries kept; the oldest is evicted first.
pub const OUTBOX_CAPACITY: usize = 10;

impl Storage {
    // === Outbox Operations ===

    /// Appends one payload row. Capacity is the caller's concern.
    pub fn outbox_push(
        &self,
        payload: &ClientMessage,
        enqueued_at: u64,
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(payload)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.conn.execute(
            "INSERT INTO outbox (payload, enqueued_at) VALUES (?1, ?2)",
            params![encoded, enqueued_at as i64],
        )?;
        Ok(())
    }

    /// All queued entries, oldest first.
    pub fn outbox_entries(&self) -> Result<Vec<OutboxEntry>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload, enqueued_at FROM outbox ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (encoded, enqueued_at) = row?;
            let payload: ClientMessage = serde_json::from_str(&encoded)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            entries.push(OutboxEntry {
                payload,
                enqueued_at: enqueued_at as u64,
            });
        }
        Ok(entries)
    }

    /// The most recently queued entry, if any.
    pub fn outbox_latest(&self) -> Result<Option<OutboxEntry>, StorageError> {
        Ok(self.outbox_entries()?.pop())
    }

    /// Drops rows beyond the newest `capacity`, oldest first.
    pub fn outbox_trim(&self, capacity: usize) -> Result<usize, StorageError> {
        let evicted = self.conn.execute(
            "DELETE FROM outbox WHERE id NOT IN
             (SELECT id FROM outbox ORDER BY id DESC LIMIT ?1)",
            params![capacity as i64],
        )?;
        Ok(evicted)
    }

    /// Removes everything.
    pub fn outbox_clear(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM outbox", [])?;
        Ok(())
    }

    /// Number of queued entries.
    pub fn outbox_len(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM outbox", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Bounded offline outbox over persistent storage.
pub struct Outbox {
    storage: Storage,
    capacity: usize,
}

impl Outbox {
    /// Wraps storage with the default capacity.
    pub fn new(storage: Storage) -> Self {
        Outbox {
            storage,
            capacity: OUTBOX_CAPACITY,
        }
    }

    /// Wraps storage with an explicit capacity (tests mostly).
    pub fn with_capacity(storage: Storage, capacity: usize) -> Self {
        Outbox { storage, capacity }
    }

    /// Queues one delay-tolerant payload, evicting the oldest beyond
    /// capacity.
    ///
    /// Refuses negotiation-critical payloads with
    /// [`StorageError::NotQueueable`].
    pub fn enqueue(&self, payload: &ClientMessage, now_ms: u64) -> Result<(), StorageError> {
        if !payload.is_deferrable() {
            return Err(StorageError::NotQueueable(payload.kind().to_string()));
        }
        self.storage.outbox_push(payload, now_ms)?;
        let evicted = self.storage.outbox_trim(self.capacity)?;
        if evicted > 0 {
            debug!("outbox evicted {} oldest entries", evicted);
        }
        Ok(())
    }

    /// Replays the queue through `send`.
    ///
    /// Only the single most recent entry is sent; a stale location
    /// history is worthless once a fresher fix exists. The queue is
    /// cleared on success and left intact when the send fails, so a
    /// later drain can retry.
    pub fn drain<F>(&self, mut send: F) -> Result<usize, StorageError>
    where
        F: FnMut(&ClientMessage) -> bool,
    {
        let Some(latest) = self.storage.outbox_latest()? else {
            return Ok(0);
        };
        if !send(&latest.payload) {
            warn!("outbox drain failed, keeping {} entries", self.len()?);
            return Ok(0);
        }
        self.storage.outbox_clear()?;
        Ok(1)
    }

    /// Queued entries, oldest first.
    pub fn entries(&self) -> Result<Vec<OutboxEntry>, StorageError> {
        self.storage.outbox_entries()
    }

    /// Number of queued entries.
    pub fn len(&self) -> Result<usize, StorageError> {
        self.storage.outbox_len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.storage.outbox_len()? == 0)
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
