// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The host-facing binding.
//!
//! A [`CloudBinding`] is one account's worth of the library: it owns the
//! session, the poll scheduler, the state store, and the observer registry,
//! and exposes the small surface a host platform drives:
//!
//! - [`initialize`](CloudBinding::initialize) starts the periodic schedule
//!   (first cycle runs immediately and performs the login).
//! - [`refresh_now`](CloudBinding::refresh_now) asks for an out-of-band
//!   cycle; redundant requests coalesce into the periodic schedule.
//! - [`register_observer`](CloudBinding::register_observer) /
//!   [`unregister_observer`](CloudBinding::unregister_observer) manage the
//!   callbacks invoked once per changed device record.
//! - [`send_command`](CloudBinding::send_command) dispatches arm/lock/plug
//!   commands and schedules a short-delay refresh to pick up the result.
//! - [`dispose`](CloudBinding::dispose) cancels all scheduled work and
//!   clears the session. Terminal.
//!
//! # Examples
//!
//! ```no_run
//! use homewatch_lib::auth::Credentials;
//! use homewatch_lib::binding::{BindingConfig, CloudBinding};
//! use std::time::Duration;
//!
//! # fn main() -> homewatch_lib::Result<()> {
//! let config = BindingConfig::new(
//!     "https://cloud.example.com",
//!     Credentials::new("user@example.com", "hunter2").with_pin("1234"),
//! )
//! .with_poll_interval(Duration::from_secs(300));
//!
//! let binding = CloudBinding::new(config)?;
//! binding.register_observer(|record| {
//!     println!("{} changed", record.device_id());
//! });
//! binding.initialize();
//! # Ok(())
//! # }
//! ```

mod cloud_binding;
mod config;
mod cycle;

pub use cloud_binding::CloudBinding;
pub use config::BindingConfig;

use std::fmt;

use uuid::Uuid;

use crate::scheduler::OfflineReason;

/// Unique identifier for a binding instance, used in log output.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(Uuid);

impl BindingId {
    /// Creates a new unique binding identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show only first 8 characters for readability
        let short = &self.0.to_string()[..8];
        write!(f, "BindingId({short}...)")
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection status the binding reports to the host platform.
///
/// The host sees a degraded status with a reason, never an exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStatus {
    /// No cycle has completed yet.
    Idle,
    /// The last cycle completed against a live session.
    Online,
    /// The last cycle failed; the next periodic cycle retries.
    Offline(OfflineReason),
}
