// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-resource record enrichment.

use super::device_record::DeviceRecord;
use super::states::LockState;

/// Overlays fields from `secondary` onto `primary`.
///
/// The merged record keeps the primary's variant, identity, and site scope;
/// only fields the secondary actually carries (`Some` values, or a known
/// state) are taken. Mismatched variants leave the primary untouched.
///
/// Used when a resource kind needs a sibling fetch to complete its records,
/// e.g. the door-lock listing enriched with per-lock detail fields.
#[must_use]
pub fn overlay(primary: DeviceRecord, secondary: &DeviceRecord) -> DeviceRecord {
    match (primary, secondary) {
        (DeviceRecord::SmartLock(mut p), DeviceRecord::SmartLock(s)) => {
            if s.state != LockState::Unknown {
                p.state = s.state;
            }
            if s.changed_by.is_some() {
                p.changed_by.clone_from(&s.changed_by);
            }
            if s.changed_at.is_some() {
                p.changed_at = s.changed_at;
            }
            if s.low_battery.is_some() {
                p.low_battery = s.low_battery;
            }
            if s.auto_relock.is_some() {
                p.auto_relock = s.auto_relock;
            }
            if s.volume.is_some() {
                p.volume = s.volume;
            }
            DeviceRecord::SmartLock(p)
        }
        (DeviceRecord::Alarm(mut p), DeviceRecord::Alarm(s)) => {
            if s.changed_by.is_some() {
                p.changed_by.clone_from(&s.changed_by);
            }
            if s.changed_at.is_some() {
                p.changed_at = s.changed_at;
            }
            DeviceRecord::Alarm(p)
        }
        (primary, _) => primary,
    }
}
