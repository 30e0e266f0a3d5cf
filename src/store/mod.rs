// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known-state store and differ.
//!
//! The [`StateStore`] keeps the latest [`DeviceRecord`] per device identifier
//! and reports, on every [`apply`](StateStore::apply), whether the record
//! actually changed. A record is only replaced when the incoming value is
//! structurally different, so the map always reflects the most recently
//! completed fetch cycle.
//!
//! # Examples
//!
//! ```
//! use homewatch_lib::record::{BroadbandRecord, DeviceRecord};
//! use homewatch_lib::store::StateStore;
//!
//! let store = StateStore::new();
//! let record = DeviceRecord::Broadband(BroadbandRecord {
//!     device_id: "broadband_123".into(),
//!     connected: true,
//!     tested_at: None,
//!     site_id: 123,
//!     site_name: "Home".into(),
//! });
//!
//! assert!(store.apply(record.clone()));   // first sighting
//! assert!(!store.apply(record));          // unchanged
//! ```

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::record::DeviceRecord;

/// Mapping from device identifier to the latest observed record.
///
/// Reads are safe to call concurrently with `apply`; the lock is internal
/// and never held across an observer callback or a fetch.
#[derive(Debug, Default)]
pub struct StateStore {
    records: RwLock<HashMap<String, DeviceRecord>>,
}

impl StateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a record, keyed by its (already-normalized) identifier.
    ///
    /// Returns `true` when the record was absent or structurally different
    /// from the stored one; the store is updated and the caller should
    /// notify observers. Returns `false` and leaves the store untouched when
    /// the incoming record equals the stored one.
    pub fn apply(&self, record: DeviceRecord) -> bool {
        let mut records = self.records.write();
        match records.get(record.device_id()) {
            Some(existing) if *existing == record => false,
            _ => {
                records.insert(record.device_id().to_string(), record);
                true
            }
        }
    }

    /// Returns the latest record for a device, if known.
    #[must_use]
    pub fn get(&self, device_id: &str) -> Option<DeviceRecord> {
        self.records.read().get(device_id).cloned()
    }

    /// Returns a snapshot of all records.
    #[must_use]
    pub fn all(&self) -> HashMap<String, DeviceRecord> {
        self.records.read().clone()
    }

    /// Returns the number of known devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if no device has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Removes all records. Called on disposal.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ClimateRecord, ContactState, DoorWindowRecord};

    fn climate(id: &str, temperature: f32) -> DeviceRecord {
        DeviceRecord::Climate(ClimateRecord {
            device_id: id.into(),
            area: "Hallway".into(),
            temperature: Some(temperature),
            humidity: None,
            reported_at: None,
            site_id: 123,
            site_name: "Home".into(),
        })
    }

    #[test]
    fn first_apply_reports_changed() {
        let store = StateStore::new();
        assert!(store.apply(climate("A_1", 20.0)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn reapplying_identical_record_reports_unchanged() {
        let store = StateStore::new();
        store.apply(climate("A_1", 20.0));
        assert!(!store.apply(climate("A_1", 20.0)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn field_change_reports_changed() {
        let store = StateStore::new();
        store.apply(climate("A_1", 20.0));
        assert!(store.apply(climate("A_1", 20.5)));

        let DeviceRecord::Climate(stored) = store.get("A_1").unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(stored.temperature, Some(20.5));
    }

    #[test]
    fn store_holds_last_write_per_device() {
        let store = StateStore::new();
        store.apply(climate("A_1", 20.0));
        store.apply(climate("B_2", 18.0));
        store.apply(climate("A_1", 22.0));

        assert_eq!(store.len(), 2);
        let DeviceRecord::Climate(a) = store.get("A_1").unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(a.temperature, Some(22.0));
    }

    #[test]
    fn variant_swap_for_same_id_is_a_change() {
        let store = StateStore::new();
        store.apply(climate("A_1", 20.0));

        let contact = DeviceRecord::DoorWindow(DoorWindowRecord {
            device_id: "A_1".into(),
            area: "Hallway".into(),
            state: ContactState::Closed,
            reported_at: None,
            site_id: 123,
            site_name: "Home".into(),
        });
        assert!(store.apply(contact));
    }

    #[test]
    fn get_unknown_returns_none() {
        let store = StateStore::new();
        assert!(store.get("missing").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_the_store() {
        let store = StateStore::new();
        store.apply(climate("A_1", 20.0));
        store.clear();
        assert!(store.is_empty());
    }
}
