// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport abstraction.
//!
//! The vendor backend is reached through the [`Transport`] trait: plain
//! GET/POST/HEAD calls returning status, headers, and body. Retry and backoff
//! are deliberately NOT implemented here; the authenticator and scheduler
//! own that policy. The production implementation is [`HttpTransport`];
//! tests inject scripted stand-ins.

mod http;

pub use http::{HttpConfig, HttpTransport};

use std::future::Future;

use crate::error::TransportError;

/// A raw HTTP response: status code, headers, and body.
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers as (name, value) pairs.
    pub headers: Vec<(String, String)>,
    /// The response body.
    pub body: String,
}

impl WireResponse {
    /// Creates a response with the given status and body and no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Returns the first header with the given name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for transports that can reach the vendor backend.
///
/// The returned futures are `Send` so that poll cycles can run on the
/// scheduler's worker tasks.
pub trait Transport: Send + Sync + 'static {
    /// Issues a GET request against `path` (relative to the base URL).
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on network-level failure. Non-2xx statuses
    /// are NOT errors at this layer; callers interpret the status code.
    fn get(&self, path: &str) -> impl Future<Output = Result<WireResponse, TransportError>> + Send;

    /// Issues a POST request with the given headers and body.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on network-level failure.
    fn post(
        &self,
        path: &str,
        headers: &[(String, String)],
        body: String,
    ) -> impl Future<Output = Result<WireResponse, TransportError>> + Send;

    /// Issues a HEAD request and returns only the status code.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` on network-level failure.
    fn head(&self, path: &str) -> impl Future<Output = Result<u16, TransportError>> + Send;
}
