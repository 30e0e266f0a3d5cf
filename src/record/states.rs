// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state enums.
//!
//! Vendor payloads carry these as uppercase strings; parsing is tolerant:
//! an unrecognized value decodes to the conservative variant instead of
//! failing the whole payload.

use std::fmt;

/// Arm state of a site alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmState {
    /// Fully disarmed.
    Disarmed,
    /// Perimeter armed, interior sensors off.
    ArmedHome,
    /// Fully armed.
    ArmedAway,
    /// Transitioning or unrecognized vendor value.
    Pending,
}

impl AlarmState {
    /// Parses the vendor status string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "DISARMED" => Self::Disarmed,
            "ARMED_HOME" => Self::ArmedHome,
            "ARMED_AWAY" => Self::ArmedAway,
            _ => Self::Pending,
        }
    }

    /// Returns the vendor string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disarmed => "DISARMED",
            Self::ArmedHome => "ARMED_HOME",
            Self::ArmedAway => "ARMED_AWAY",
            Self::Pending => "PENDING",
        }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a door lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockState {
    /// Bolt extended.
    Locked,
    /// Bolt retracted.
    Unlocked,
    /// Motor running or unrecognized vendor value.
    Unknown,
}

impl LockState {
    /// Parses the vendor status string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "LOCKED" => Self::Locked,
            "UNLOCKED" => Self::Unlocked,
            _ => Self::Unknown,
        }
    }
}

/// Configured sound level of a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockVolume {
    /// No audible feedback.
    Silent,
    /// Quiet feedback.
    Low,
    /// Loud feedback.
    High,
}

impl LockVolume {
    /// Parses the vendor volume string, if recognized.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "SILENCE" => Some(Self::Silent),
            "LOW" => Some(Self::Low),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

/// State of a door/window contact sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactState {
    /// Contact open.
    Open,
    /// Contact closed.
    Closed,
    /// Unrecognized vendor value.
    Unknown,
}

impl ContactState {
    /// Parses the vendor state string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "OPEN" => Self::Open,
            "CLOSE" | "CLOSED" => Self::Closed,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alarm_state_round_trip() {
        assert_eq!(AlarmState::parse("ARMED_AWAY"), AlarmState::ArmedAway);
        assert_eq!(AlarmState::parse("DISARMED").as_str(), "DISARMED");
    }

    #[test]
    fn unknown_vendor_values_fall_back() {
        assert_eq!(AlarmState::parse("ARMED_NIGHT"), AlarmState::Pending);
        assert_eq!(LockState::parse("MOTOR_JAM"), LockState::Unknown);
        assert_eq!(ContactState::parse("AJAR"), ContactState::Unknown);
        assert_eq!(LockVolume::parse("MEDIUM"), None);
    }

    #[test]
    fn contact_state_accepts_both_closed_spellings() {
        assert_eq!(ContactState::parse("CLOSE"), ContactState::Closed);
        assert_eq!(ContactState::parse("CLOSED"), ContactState::Closed);
    }
}
