// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device records and resource kinds.
//!
//! A [`DeviceRecord`] is the library's view of one vendor device at one point
//! in time: a tagged union with a variant per device category, each carrying
//! the vendor fields plus the denormalized `site_id`/`site_name` pair.
//! Structural equality over all fields is the basis for change detection.
//!
//! # Examples
//!
//! ```
//! use homewatch_lib::record::normalize_device_id;
//!
//! assert_eq!(normalize_device_id("abc-123 def"), "abc_123_def");
//! ```

mod device_record;
mod merge;
mod states;

pub use device_record::{
    AlarmRecord, BroadbandRecord, ClimateRecord, DeviceRecord, DoorWindowRecord, SmartLockRecord,
    SmartPlugRecord,
};
pub use merge::overlay;
pub use states::{AlarmState, ContactState, LockState, LockVolume};

/// The resource collections a poll cycle fetches from the vendor backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Site arm state (one record per installation).
    Alarm,
    /// Door locks (stub listing enriched with per-lock detail).
    SmartLock,
    /// Door and window contact sensors.
    DoorWindow,
    /// Temperature/humidity sensors.
    Climate,
    /// Switchable smart plugs.
    SmartPlug,
    /// Broadband connection status (one record per installation).
    Broadband,
}

impl ResourceKind {
    /// All resource kinds, in the order a poll cycle visits them.
    pub const ALL: [Self; 6] = [
        Self::Alarm,
        Self::SmartLock,
        Self::DoorWindow,
        Self::Climate,
        Self::SmartPlug,
        Self::Broadband,
    ];

    /// Returns a stable lowercase name, used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alarm => "alarm",
            Self::SmartLock => "smartlock",
            Self::DoorWindow => "doorwindow",
            Self::Climate => "climate",
            Self::SmartPlug => "smartplug",
            Self::Broadband => "broadband",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes a raw vendor identifier into a state-store key.
///
/// Every run of characters outside `[A-Za-z0-9_]` collapses to a single `_`.
/// Applied before a record identifier is used as a store key, so lookups and
/// notifications agree on one spelling.
#[must_use]
pub fn normalize_device_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_run = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}
