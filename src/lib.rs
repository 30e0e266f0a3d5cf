// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `HomeWatch` Lib - A Rust library to poll home-security vendor clouds.
//!
//! This library owns the part of a device binding that is actual
//! engineering: keeping an authenticated session against a vendor backend,
//! polling its resource endpoints on a schedule, diffing the results against
//! the last-known device state, and notifying observers only on change,
//! while out-of-band "refresh now" requests coalesce with the periodic
//! schedule instead of racing it.
//!
//! # What it does
//!
//! - **Session lifecycle**: CSRF-based login handshake, cheap logged-in
//!   probe, transparent re-login with bounded retries.
//! - **Polling**: one cycle per period visits every configured resource kind
//!   for every installation on the account; per-kind failures never take
//!   down the cycle.
//! - **Change detection**: records are compared structurally and replaced
//!   only on difference, so observers hear exactly once per actual change.
//! - **Refresh coalescing**: `refresh_now` requests are dropped when the
//!   periodic run already covers them, and at most one immediate run is
//!   pending at a time. Cycles never overlap for one session.
//!
//! # Quick Start
//!
//! ```no_run
//! use homewatch_lib::auth::Credentials;
//! use homewatch_lib::binding::{BindingConfig, CloudBinding};
//! use homewatch_lib::record::DeviceRecord;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> homewatch_lib::Result<()> {
//!     let config = BindingConfig::new(
//!         "https://cloud.example.com",
//!         Credentials::new("user@example.com", "hunter2").with_pin("1234"),
//!     );
//!
//!     let binding = CloudBinding::new(config)?;
//!     binding.register_observer(|record: &DeviceRecord| {
//!         println!("{} -> {:?}", record.device_id(), record);
//!     });
//!
//!     // First cycle runs immediately and performs the login.
//!     binding.initialize();
//!
//!     // Ask for fresh data ahead of schedule; redundant requests coalesce.
//!     binding.refresh_now(Duration::from_secs(5));
//!
//!     // ... later
//!     binding.dispose();
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! ```no_run
//! use homewatch_lib::command::DeviceCommand;
//! # use homewatch_lib::binding::CloudBinding;
//!
//! # async fn example(binding: CloudBinding) -> homewatch_lib::Result<()> {
//! binding
//!     .send_command("Home", &DeviceCommand::Lock {
//!         device_label: "3C4D 5E6F".into(),
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod binding;
pub mod command;
pub mod error;
pub mod fetch;
pub mod observer;
pub mod record;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod transport;

pub use auth::{Credentials, RetryPolicy};
pub use binding::{BindingConfig, BindingId, BindingStatus, CloudBinding};
pub use command::DeviceCommand;
pub use error::{DecodeError, Error, Result, TransportError};
pub use fetch::ResourceFetcher;
pub use observer::{ObserverId, ObserverRegistry};
pub use record::{DeviceRecord, ResourceKind, normalize_device_id};
pub use scheduler::{
    CycleKind, CycleOutcome, CycleToken, OfflineReason, PollJob, PollScheduler, RefreshDecision,
    SchedulerState,
};
pub use session::{InstallationRef, Session};
pub use store::StateStore;
pub use transport::{HttpConfig, HttpTransport, Transport, WireResponse};
