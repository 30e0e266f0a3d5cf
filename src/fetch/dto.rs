// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire DTOs for the vendor resource endpoints.
//!
//! Timestamps arrive as strings and are parsed tolerantly: a malformed date
//! degrades to `None` instead of failing the record.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::record::{
    AlarmRecord, AlarmState, BroadbandRecord, ClimateRecord, ContactState, DeviceRecord,
    DoorWindowRecord, LockState, LockVolume, SmartLockRecord, SmartPlugRecord,
    normalize_device_id,
};
use crate::session::InstallationRef;

pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!(raw, error = %e, "unparseable vendor timestamp");
            None
        }
    }
}

/// One entry of the installations listing.
#[derive(Debug, Deserialize)]
pub struct InstallationDto {
    /// Vendor-wide site identifier.
    pub giid: u64,
    /// Site alias.
    pub alias: String,
    /// Instance number.
    #[serde(default)]
    pub instance: u32,
}

impl InstallationDto {
    pub(crate) fn into_ref(self) -> InstallationRef {
        InstallationRef::new(self.alias, self.instance, self.giid)
    }
}

/// Arm-state payload (one object per installation).
#[derive(Debug, Deserialize)]
pub struct ArmStateDto {
    #[serde(rename = "statusType")]
    status_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl ArmStateDto {
    pub(crate) fn into_record(self, installation: &InstallationRef) -> DeviceRecord {
        DeviceRecord::Alarm(AlarmRecord {
            device_id: normalize_device_id(&format!("alarm {}", installation.giid)),
            state: AlarmState::parse(&self.status_type),
            changed_by: self.name,
            changed_at: parse_timestamp(self.date.as_deref()),
            site_id: installation.giid,
            site_name: installation.alias.clone(),
        })
    }
}

/// One entry of the door-lock listing.
#[derive(Debug, Deserialize)]
pub struct DoorLockDto {
    /// Raw vendor device label, also the key for the detail endpoint.
    #[serde(rename = "deviceLabel")]
    pub device_label: String,
    #[serde(default)]
    area: Option<String>,
    #[serde(rename = "lockedState", default)]
    locked_state: Option<String>,
    #[serde(rename = "userString", default)]
    user_string: Option<String>,
    #[serde(rename = "eventTime", default)]
    event_time: Option<String>,
    #[serde(rename = "lowBattery", default)]
    low_battery: Option<bool>,
}

impl DoorLockDto {
    pub(crate) fn into_record(self, installation: &InstallationRef) -> DeviceRecord {
        DeviceRecord::SmartLock(SmartLockRecord {
            device_id: normalize_device_id(&self.device_label),
            area: self.area.unwrap_or_default(),
            state: self
                .locked_state
                .as_deref()
                .map_or(LockState::Unknown, LockState::parse),
            changed_by: self.user_string,
            changed_at: parse_timestamp(self.event_time.as_deref()),
            low_battery: self.low_battery,
            auto_relock: None,
            volume: None,
            site_id: installation.giid,
            site_name: installation.alias.clone(),
        })
    }
}

/// Per-lock detail payload, merged onto the listing stub.
#[derive(Debug, Deserialize)]
pub struct DoorLockDetailDto {
    #[serde(rename = "autoRelockEnabled", default)]
    auto_relock_enabled: Option<bool>,
    #[serde(default)]
    volume: Option<String>,
    #[serde(rename = "lockedState", default)]
    locked_state: Option<String>,
}

impl DoorLockDetailDto {
    pub(crate) fn into_record(
        self,
        device_label: &str,
        installation: &InstallationRef,
    ) -> DeviceRecord {
        DeviceRecord::SmartLock(SmartLockRecord {
            device_id: normalize_device_id(device_label),
            area: String::new(),
            state: self
                .locked_state
                .as_deref()
                .map_or(LockState::Unknown, LockState::parse),
            changed_by: None,
            changed_at: None,
            low_battery: None,
            auto_relock: self.auto_relock_enabled,
            volume: self.volume.as_deref().and_then(LockVolume::parse),
            site_id: installation.giid,
            site_name: installation.alias.clone(),
        })
    }
}

/// Door/window listing wrapper.
#[derive(Debug, Deserialize)]
pub struct DoorWindowListDto {
    #[serde(rename = "doorWindowDevice", default)]
    pub devices: Vec<DoorWindowDto>,
}

/// One door/window contact sensor.
#[derive(Debug, Deserialize)]
pub struct DoorWindowDto {
    #[serde(rename = "deviceLabel")]
    device_label: String,
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(rename = "reportTime", default)]
    report_time: Option<String>,
}

impl DoorWindowDto {
    pub(crate) fn into_record(self, installation: &InstallationRef) -> DeviceRecord {
        DeviceRecord::DoorWindow(DoorWindowRecord {
            device_id: normalize_device_id(&self.device_label),
            area: self.area.unwrap_or_default(),
            state: self
                .state
                .as_deref()
                .map_or(ContactState::Unknown, ContactState::parse),
            reported_at: parse_timestamp(self.report_time.as_deref()),
            site_id: installation.giid,
            site_name: installation.alias.clone(),
        })
    }
}

/// One climate sensor reading.
#[derive(Debug, Deserialize)]
pub struct ClimateDto {
    #[serde(rename = "deviceLabel")]
    device_label: String,
    #[serde(rename = "deviceArea", default)]
    device_area: Option<String>,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    humidity: Option<f32>,
    #[serde(default)]
    time: Option<String>,
}

impl ClimateDto {
    pub(crate) fn into_record(self, installation: &InstallationRef) -> DeviceRecord {
        DeviceRecord::Climate(ClimateRecord {
            device_id: normalize_device_id(&self.device_label),
            area: self.device_area.unwrap_or_default(),
            temperature: self.temperature,
            humidity: self.humidity,
            reported_at: parse_timestamp(self.time.as_deref()),
            site_id: installation.giid,
            site_name: installation.alias.clone(),
        })
    }
}

/// One smart plug.
#[derive(Debug, Deserialize)]
pub struct SmartPlugDto {
    #[serde(rename = "deviceLabel")]
    device_label: String,
    #[serde(default)]
    area: Option<String>,
    #[serde(rename = "currentState", default)]
    current_state: Option<String>,
}

impl SmartPlugDto {
    pub(crate) fn into_record(self, installation: &InstallationRef) -> DeviceRecord {
        let on = match self.current_state.as_deref() {
            Some("ON") => Some(true),
            Some("OFF") => Some(false),
            _ => None,
        };
        DeviceRecord::SmartPlug(SmartPlugRecord {
            device_id: normalize_device_id(&self.device_label),
            area: self.area.unwrap_or_default(),
            on,
            site_id: installation.giid,
            site_name: installation.alias.clone(),
        })
    }
}

/// Broadband status payload (one object per installation).
#[derive(Debug, Deserialize)]
pub struct BroadbandDto {
    #[serde(rename = "isBroadbandConnected", default)]
    is_broadband_connected: bool,
    #[serde(rename = "testDate", default)]
    test_date: Option<String>,
}

impl BroadbandDto {
    pub(crate) fn into_record(self, installation: &InstallationRef) -> DeviceRecord {
        DeviceRecord::Broadband(BroadbandRecord {
            device_id: normalize_device_id(&format!("broadband {}", installation.giid)),
            connected: self.is_broadband_connected,
            tested_at: parse_timestamp(self.test_date.as_deref()),
            site_id: installation.giid,
            site_name: installation.alias.clone(),
        })
    }
}
