// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session authentication.
//!
//! The [`Authenticator`] owns the login handshake against the vendor backend:
//! it fetches a CSRF token, POSTs form-encoded credentials, and stores the
//! resulting tokens on the [`Session`](crate::session::Session). Whether a
//! live session still counts as logged in is decided by a cheap HEAD probe
//! interpreted through a [`ProbePolicy`]; vendors disagree on what a
//! logged-out probe looks like, so the interpretation is pluggable.
//!
//! Neither `login` nor `is_authenticated` ever propagates an error: the
//! caller always receives a boolean, and failures are logged.

mod authenticator;
mod probe;

pub use authenticator::Authenticator;
pub use probe::{ProbePolicy, ProbeVerdict, StatusProbe};

use std::time::Duration;

/// Account credentials supplied by the host platform at binding setup.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account username (usually an email address).
    pub username: String,
    /// Account password.
    pub password: String,
    /// Numeric PIN authorizing arm/disarm and lock commands.
    pub pin: Option<String>,
}

impl Credentials {
    /// Creates credentials without a command PIN.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            pin: None,
        }
    }

    /// Sets the command PIN.
    #[must_use]
    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }
}

/// Retry policy for the ensure-authenticated step of a poll cycle.
///
/// # Examples
///
/// ```
/// use homewatch_lib::auth::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 3);
/// assert_eq!(policy.backoff, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum login attempts per cycle.
    pub max_attempts: u32,
    /// Delay between consecutive attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Sets the maximum number of attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay between attempts.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}
