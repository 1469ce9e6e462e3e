//! Correlation table for outstanding launches.
//!
//! # Responsibility
//! - Track pending launches keyed by correlation tag.
//! - Enforce the table capacity on reservation.
//!
//! # Invariants
//! - `len() <= capacity()` at all times.
//! - Capacity is one: the coordinator is single-flight.
//! - Release after a failed launch only removes the entry it reserved.

use crate::model::result::LaunchResult;
use std::collections::BTreeMap;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Number of launches a table admits at once.
pub const SINGLE_FLIGHT_CAPACITY: usize = 1;

/// One accepted launch awaiting its completion notification.
#[derive(Debug)]
pub(crate) struct PendingLaunch {
    pub(crate) launch_id: Uuid,
    pub(crate) action: String,
    pub(crate) completion: oneshot::Sender<LaunchResult>,
}

/// Reservation rejected because the table is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotOccupied {
    pub(crate) correlation_tag: i32,
}

/// Outstanding launches keyed by correlation tag.
#[derive(Debug)]
pub struct CorrelationTable {
    capacity: usize,
    entries: BTreeMap<i32, PendingLaunch>,
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self {
            capacity: SINGLE_FLIGHT_CAPACITY,
            entries: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, correlation_tag: i32) -> bool {
        self.entries.contains_key(&correlation_tag)
    }

    /// Returns tags of all outstanding launches in ascending order.
    pub fn tags(&self) -> Vec<i32> {
        self.entries.keys().copied().collect()
    }

    /// First occupied tag when no further reservation is possible.
    pub(crate) fn occupied(&self, correlation_tag: i32) -> Option<SlotOccupied> {
        if self.contains(correlation_tag) {
            return Some(SlotOccupied { correlation_tag });
        }
        if self.entries.len() >= self.capacity {
            let occupied_tag = self
                .entries
                .keys()
                .next()
                .copied()
                .unwrap_or(correlation_tag);
            return Some(SlotOccupied {
                correlation_tag: occupied_tag,
            });
        }
        None
    }

    /// Check-and-set: stores `pending` under `correlation_tag` if room remains.
    pub(crate) fn reserve(
        &mut self,
        correlation_tag: i32,
        pending: PendingLaunch,
    ) -> Result<(), SlotOccupied> {
        if let Some(occupied) = self.occupied(correlation_tag) {
            return Err(occupied);
        }
        self.entries.insert(correlation_tag, pending);
        Ok(())
    }

    /// Read-and-clear for result delivery.
    pub(crate) fn take(&mut self, correlation_tag: i32) -> Option<PendingLaunch> {
        self.entries.remove(&correlation_tag)
    }

    /// Removes the entry only if it still belongs to `launch_id`.
    pub(crate) fn release(
        &mut self,
        correlation_tag: i32,
        launch_id: Uuid,
    ) -> Option<PendingLaunch> {
        match self.entries.get(&correlation_tag) {
            Some(pending) if pending.launch_id == launch_id => {
                self.entries.remove(&correlation_tag)
            }
            _ => None,
        }
    }
}
