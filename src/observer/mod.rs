// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change notification.
//!
//! The [`ObserverRegistry`] holds the callbacks registered by external code
//! and delivers each changed [`DeviceRecord`](crate::record::DeviceRecord)
//! to every observer, in registration order. Registration and removal are
//! safe while a notification is in flight: dispatch runs against a snapshot
//! of the list taken under a short read lock, and the callbacks are invoked
//! outside it.

mod registry;

pub use registry::{ObserverId, ObserverRegistry};
