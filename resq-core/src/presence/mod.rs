// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Presence Registry
//!
//! Eventually-consistent map of driver identities to last-known
//! position, refreshed by push messages and pruned only on explicit
//! disconnect notices. Consumers render from snapshots; filtering (for
//! example to the single counterpart driver during an ongoing trip) is
//! a presentation-layer concern layered on top, never done here.
//!
//! There is no liveness sweep: staleness is an explicit, opt-in query
//! over record timestamps (`stale_ids`), and the registry never removes
//! an entry by itself.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Driver availability as carried in presence records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Available,
    Busy,
}

/// Last-known location/status of one driver.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceRecord {
    pub driver_id: u64,
    pub latitude: f64,
    pub longitude: f64,
    /// Unix milliseconds of the last update.
    pub timestamp: u64,
    pub name: String,
    pub status: DriverStatus,
}

/// A presence update as received from the wire; optional fields merge
/// over the existing record instead of blanking it.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceUpdate {
    pub driver_id: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: u64,
    pub name: Option<String>,
    pub status: Option<DriverStatus>,
}

/// Change notifications emitted by the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenceEvent {
    /// One driver was inserted or updated.
    Updated { driver_id: u64 },
    /// One driver was removed on an explicit disconnect notice.
    Removed { driver_id: u64 },
    /// The whole registry was replaced by a bulk resync.
    Replaced { count: usize },
}

/// Presence change handler.
///
/// Execution is cooperative/single-threaded (see the concurrency model),
/// so handlers need no thread-safety bounds.
pub trait PresenceHandler {
    /// Called after the registry mutated.
    fn on_event(&self, event: &PresenceEvent);
}

impl<F: Fn(&PresenceEvent)> PresenceHandler for F {
    fn on_event(&self, event: &PresenceEvent) {
        self(event)
    }
}

/// In-memory keyed store of driver presence records.
pub struct PresenceRegistry {
    drivers: HashMap<u64, PresenceRecord>,
    /// Unix milliseconds of the last mutation.
    last_updated: Option<u64>,
    /// Explicit staleness policy; `None` (the default) disables it.
    stale_after: Option<Duration>,
    handlers: Vec<Box<dyn PresenceHandler>>,
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceRegistry {
    /// Creates an empty registry with staleness detection disabled.
    pub fn new() -> Self {
        PresenceRegistry {
            drivers: HashMap::new(),
            last_updated: None,
            stale_after: None,
            handlers: Vec::new(),
        }
    }

    /// Creates a registry with an explicit staleness threshold.
    pub fn with_stale_after(stale_after: Duration) -> Self {
        PresenceRegistry {
            stale_after: Some(stale_after),
            ..Self::new()
        }
    }

    /// Registers a change handler.
    pub fn subscribe(&mut self, handler: Box<dyn PresenceHandler>) {
        self.handlers.push(handler);
    }

    /// Inserts or updates one driver.
    ///
    /// Idempotent: applying the same update twice yields the same state.
    /// A partial update (missing `name`/`status`) merges over the
    /// existing entry; for a first sighting the name defaults to
    /// `Driver <id>` and the status to available.
    pub fn upsert(&mut self, update: PresenceUpdate) {
        let driver_id = update.driver_id;
        match self.drivers.get_mut(&driver_id) {
            Some(existing) => {
                existing.latitude = update.latitude;
                existing.longitude = update.longitude;
                existing.timestamp = update.timestamp;
                if let Some(name) = update.name {
                    existing.name = name;
                }
                if let Some(status) = update.status {
                    existing.status = status;
                }
            }
            None => {
                self.drivers.insert(driver_id, record_from(update));
            }
        }
        self.last_updated = Some(self.drivers[&driver_id].timestamp);
        self.notify(&PresenceEvent::Updated { driver_id });
    }

    /// Removes one driver on an explicit disconnect notice.
    ///
    /// Returns whether the driver was present.
    pub fn remove(&mut self, driver_id: u64) -> bool {
        let removed = self.drivers.remove(&driver_id).is_some();
        if removed {
            self.notify(&PresenceEvent::Removed { driver_id });
        }
        removed
    }

    /// Replaces the entire registry with a bulk resync.
    ///
    /// Full-replace semantics, not a merge: entries absent from
    /// `records` are dropped.
    pub fn replace_all(&mut self, records: Vec<PresenceUpdate>) {
        self.drivers = records
            .into_iter()
            .map(|u| (u.driver_id, record_from(u)))
            .collect();
        let count = self.drivers.len();
        self.last_updated = self.drivers.values().map(|r| r.timestamp).max();
        self.notify(&PresenceEvent::Replaced { count });
    }

    /// Clears the registry on session teardown. No events are emitted;
    /// the owning scope is going away with it.
    pub fn clear(&mut self) {
        self.drivers.clear();
        self.last_updated = None;
    }

    /// Read-only view of all records, keyed by driver ID.
    pub fn snapshot(&self) -> &HashMap<u64, PresenceRecord> {
        &self.drivers
    }

    /// Looks up one driver.
    pub fn get(&self, driver_id: u64) -> Option<&PresenceRecord> {
        self.drivers.get(&driver_id)
    }

    /// Number of drivers currently known.
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Returns true if no drivers are known.
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Unix milliseconds of the last mutation, if any.
    pub fn last_updated(&self) -> Option<u64> {
        self.last_updated
    }

    /// Drivers whose records are older than the configured threshold.
    ///
    /// A derived query only — callers decide what to do with the result.
    /// Empty when no `stale_after` policy was configured.
    pub fn stale_ids(&self, now_ms: u64) -> Vec<u64> {
        let Some(stale_after) = self.stale_after else {
            return Vec::new();
        };
        let threshold = stale_after.as_millis() as u64;
        let mut ids: Vec<u64> = self
            .drivers
            .values()
            .filter(|r| now_ms.saturating_sub(r.timestamp) > threshold)
            .map(|r| r.driver_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn notify(&self, event: &PresenceEvent) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

fn record_from(update: PresenceUpdate) -> PresenceRecord {
    PresenceRecord {
        driver_id: update.driver_id,
        latitude: update.latitude,
        longitude: update.longitude,
        timestamp: update.timestamp,
        name: update
            .name
            .unwrap_or_else(|| format!("Driver {}", update.driver_id)),
        status: update.status.unwrap_or(DriverStatus::Available),
    }
}
