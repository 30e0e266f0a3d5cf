// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binding configuration.

use std::time::Duration;

use crate::auth::{Credentials, RetryPolicy};
use crate::record::ResourceKind;
use crate::transport::HttpConfig;

/// Configuration for a [`CloudBinding`](super::CloudBinding).
///
/// # Examples
///
/// ```
/// use homewatch_lib::auth::Credentials;
/// use homewatch_lib::binding::BindingConfig;
/// use homewatch_lib::record::ResourceKind;
/// use std::time::Duration;
///
/// let config = BindingConfig::new(
///     "https://cloud.example.com",
///     Credentials::new("user@example.com", "hunter2"),
/// )
/// .with_poll_interval(Duration::from_secs(120))
/// .with_resource_kinds(vec![ResourceKind::Alarm, ResourceKind::Climate]);
/// ```
#[derive(Debug, Clone)]
pub struct BindingConfig {
    /// Vendor backend base URL.
    pub base_url: String,
    /// Account credentials.
    pub credentials: Credentials,
    /// Fixed period of the polling schedule.
    pub poll_interval: Duration,
    /// Resource kinds visited each cycle, in order.
    pub resource_kinds: Vec<ResourceKind>,
    /// Per-request transport timeout.
    pub request_timeout: Duration,
    /// Login retry policy per cycle.
    pub retry: RetryPolicy,
}

impl BindingConfig {
    /// Default polling period.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

    /// Creates a configuration polling all resource kinds at the default
    /// interval.
    #[must_use]
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            resource_kinds: ResourceKind::ALL.to_vec(),
            request_timeout: HttpConfig::DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the polling period.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Restricts the cycle to the given resource kinds.
    #[must_use]
    pub fn with_resource_kinds(mut self, resource_kinds: Vec<ResourceKind>) -> Self {
        self.resource_kinds = resource_kinds;
        self
    }

    /// Sets the per-request transport timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Sets the login retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
