// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device commands.
//!
//! Commands are POSTed to vendor endpoints scoped by installation and
//! authorized by the session's CSRF token; arm and lock commands additionally
//! require the account PIN. Dispatch lives on the
//! [`ResourceFetcher`](crate::fetch::ResourceFetcher); this module only maps
//! each command onto its path and JSON body.

use serde_json::json;

use crate::error::Error;

/// A state change requested for a vendor device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Fully arm the site alarm.
    ArmAway,
    /// Arm the perimeter only.
    ArmHome,
    /// Disarm the site alarm.
    Disarm,
    /// Extend a door lock's bolt.
    Lock {
        /// Raw vendor device label.
        device_label: String,
    },
    /// Retract a door lock's bolt.
    Unlock {
        /// Raw vendor device label.
        device_label: String,
    },
    /// Switch a smart plug.
    SetPlug {
        /// Raw vendor device label.
        device_label: String,
        /// Desired state.
        on: bool,
    },
}

impl DeviceCommand {
    /// Returns `true` when the vendor requires the account PIN.
    #[must_use]
    pub fn requires_pin(&self) -> bool {
        !matches!(self, Self::SetPlug { .. })
    }

    /// Returns the POST path for this command, scoped to an installation.
    #[must_use]
    pub fn path(&self, giid: u64) -> String {
        match self {
            Self::ArmAway | Self::ArmHome | Self::Disarm => {
                format!("/installation/{giid}/armstate/code")
            }
            Self::Lock { device_label } => format!(
                "/installation/{giid}/device/{}/lock",
                urlencoding::encode(device_label)
            ),
            Self::Unlock { device_label } => format!(
                "/installation/{giid}/device/{}/unlock",
                urlencoding::encode(device_label)
            ),
            Self::SetPlug { .. } => format!("/installation/{giid}/smartplug/state"),
        }
    }

    /// Returns the JSON request body.
    ///
    /// # Errors
    ///
    /// `NotConfigured` when the command requires a PIN and none is available.
    pub fn body(&self, pin: Option<&str>) -> Result<String, Error> {
        let pin_value = || {
            pin.map(str::to_string)
                .ok_or_else(|| Error::NotConfigured(format!("command {self} requires a PIN")))
        };

        let body = match self {
            Self::ArmAway => json!({ "state": "ARMED_AWAY", "code": pin_value()? }),
            Self::ArmHome => json!({ "state": "ARMED_HOME", "code": pin_value()? }),
            Self::Disarm => json!({ "state": "DISARMED", "code": pin_value()? }),
            Self::Lock { .. } | Self::Unlock { .. } => json!({ "code": pin_value()? }),
            Self::SetPlug { device_label, on } => {
                json!({ "deviceLabel": device_label, "state": on })
            }
        };
        Ok(body.to_string())
    }
}

impl std::fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArmAway => write!(f, "arm-away"),
            Self::ArmHome => write!(f, "arm-home"),
            Self::Disarm => write!(f, "disarm"),
            Self::Lock { device_label } => write!(f, "lock {device_label}"),
            Self::Unlock { device_label } => write!(f, "unlock {device_label}"),
            Self::SetPlug { device_label, on } => {
                write!(f, "plug {device_label} {}", if *on { "on" } else { "off" })
            }
        }
    }
}
