// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer registry and dispatch.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::record::DeviceRecord;

/// Unique identifier for a registered observer.
///
/// Returned by [`ObserverRegistry::register`] and used to unregister later.
/// IDs are unique within a binding's lifetime and increase in registration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Obs({})", self.0)
    }
}

/// Type alias for device-change callbacks.
type DeviceObserver = Arc<dyn Fn(&DeviceRecord) + Send + Sync>;

/// Registry of device-change observers.
///
/// # Thread Safety
///
/// Fully thread-safe: registration never blocks on a notification in
/// progress, and an observer may register or unregister others from inside
/// its callback without deadlocking.
pub struct ObserverRegistry {
    next_id: AtomicU64,
    /// Observers in registration order. The `Vec` keeps delivery ordered;
    /// ids are strictly increasing so order never needs re-sorting.
    observers: RwLock<Vec<(ObserverId, DeviceObserver)>>,
}

impl ObserverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Registers a callback invoked once per changed device record.
    pub fn register<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&DeviceRecord) + Send + Sync + 'static,
    {
        let id = ObserverId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, Arc::new(observer)));
        id
    }

    /// Unregisters a callback by its ID.
    ///
    /// Idempotent: returns `true` if the observer was found and removed,
    /// `false` if it was already gone.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    /// Returns `true` if no observer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Removes all observers. Called on disposal.
    pub fn clear(&self) {
        self.observers.write().clear();
    }

    /// Delivers a changed record to every registered observer.
    ///
    /// Observers are invoked in registration order, against a snapshot of
    /// the list; callbacks run outside the lock. A panicking observer is
    /// caught and logged; delivery continues with the remaining observers.
    pub fn notify(&self, record: &DeviceRecord) {
        let snapshot: Vec<(ObserverId, DeviceObserver)> = self.observers.read().clone();

        for (id, observer) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| observer(record))).is_err() {
                tracing::warn!(
                    observer = %id,
                    device_id = record.device_id(),
                    "observer panicked during notification"
                );
            }
        }
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observer_count", &self.len())
            .finish()
    }
}
