// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device record union.

use chrono::{DateTime, Utc};

use super::states::{AlarmState, ContactState, LockState, LockVolume};
use super::ResourceKind;

/// Site arm state.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmRecord {
    /// Normalized store key.
    pub device_id: String,
    /// Current arm state.
    pub state: AlarmState,
    /// Who triggered the last change, when the vendor reports it.
    pub changed_by: Option<String>,
    /// When the state last changed.
    pub changed_at: Option<DateTime<Utc>>,
    /// Vendor site identifier.
    pub site_id: u64,
    /// Site alias.
    pub site_name: String,
}

/// A door lock, listed as a stub and enriched with per-lock detail.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartLockRecord {
    /// Normalized store key.
    pub device_id: String,
    /// Room/area label.
    pub area: String,
    /// Current bolt state.
    pub state: LockState,
    /// Who triggered the last change.
    pub changed_by: Option<String>,
    /// When the state last changed.
    pub changed_at: Option<DateTime<Utc>>,
    /// Low-battery warning.
    pub low_battery: Option<bool>,
    /// Auto-relock configuration, from the detail endpoint.
    pub auto_relock: Option<bool>,
    /// Sound level, from the detail endpoint.
    pub volume: Option<LockVolume>,
    /// Vendor site identifier.
    pub site_id: u64,
    /// Site alias.
    pub site_name: String,
}

/// A door/window contact sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct DoorWindowRecord {
    /// Normalized store key.
    pub device_id: String,
    /// Room/area label.
    pub area: String,
    /// Current contact state.
    pub state: ContactState,
    /// When the sensor last reported.
    pub reported_at: Option<DateTime<Utc>>,
    /// Vendor site identifier.
    pub site_id: u64,
    /// Site alias.
    pub site_name: String,
}

/// A temperature/humidity sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateRecord {
    /// Normalized store key.
    pub device_id: String,
    /// Room/area label.
    pub area: String,
    /// Temperature in degrees Celsius.
    pub temperature: Option<f32>,
    /// Relative humidity in percent.
    pub humidity: Option<f32>,
    /// When the sensor last reported.
    pub reported_at: Option<DateTime<Utc>>,
    /// Vendor site identifier.
    pub site_id: u64,
    /// Site alias.
    pub site_name: String,
}

/// A switchable smart plug.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartPlugRecord {
    /// Normalized store key.
    pub device_id: String,
    /// Room/area label.
    pub area: String,
    /// `Some(true)` when switched on; `None` while the vendor reports a
    /// transitional state.
    pub on: Option<bool>,
    /// Vendor site identifier.
    pub site_id: u64,
    /// Site alias.
    pub site_name: String,
}

/// Broadband connection status of the site gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadbandRecord {
    /// Normalized store key.
    pub device_id: String,
    /// Whether the gateway currently reaches the vendor over broadband.
    pub connected: bool,
    /// When connectivity was last tested.
    pub tested_at: Option<DateTime<Utc>>,
    /// Vendor site identifier.
    pub site_id: u64,
    /// Site alias.
    pub site_name: String,
}

/// One vendor device at one point in time.
///
/// Structural equality (`PartialEq`) over every field, vendor fields plus
/// `site_id`/`site_name`, is what the state store diffs on: a change in any
/// field counts as a change.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceRecord {
    /// Site arm state.
    Alarm(AlarmRecord),
    /// Door lock.
    SmartLock(SmartLockRecord),
    /// Door/window contact sensor.
    DoorWindow(DoorWindowRecord),
    /// Temperature/humidity sensor.
    Climate(ClimateRecord),
    /// Smart plug.
    SmartPlug(SmartPlugRecord),
    /// Broadband connection status.
    Broadband(BroadbandRecord),
}

impl DeviceRecord {
    /// Returns the normalized device identifier (the state-store key).
    #[must_use]
    pub fn device_id(&self) -> &str {
        match self {
            Self::Alarm(r) => &r.device_id,
            Self::SmartLock(r) => &r.device_id,
            Self::DoorWindow(r) => &r.device_id,
            Self::Climate(r) => &r.device_id,
            Self::SmartPlug(r) => &r.device_id,
            Self::Broadband(r) => &r.device_id,
        }
    }

    /// Returns the resource kind this record belongs to.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Alarm(_) => ResourceKind::Alarm,
            Self::SmartLock(_) => ResourceKind::SmartLock,
            Self::DoorWindow(_) => ResourceKind::DoorWindow,
            Self::Climate(_) => ResourceKind::Climate,
            Self::SmartPlug(_) => ResourceKind::SmartPlug,
            Self::Broadband(_) => ResourceKind::Broadband,
        }
    }

    /// Returns the vendor site identifier.
    #[must_use]
    pub fn site_id(&self) -> u64 {
        match self {
            Self::Alarm(r) => r.site_id,
            Self::SmartLock(r) => r.site_id,
            Self::DoorWindow(r) => r.site_id,
            Self::Climate(r) => r.site_id,
            Self::SmartPlug(r) => r.site_id,
            Self::Broadband(r) => r.site_id,
        }
    }

    /// Returns the site alias.
    #[must_use]
    pub fn site_name(&self) -> &str {
        match self {
            Self::Alarm(r) => &r.site_name,
            Self::SmartLock(r) => &r.site_name,
            Self::DoorWindow(r) => &r.site_name,
            Self::Climate(r) => &r.site_name,
            Self::SmartPlug(r) => &r.site_name,
            Self::Broadband(r) => &r.site_name,
        }
    }
}
