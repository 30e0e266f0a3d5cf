// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `HomeWatch` library.
//!
//! This module provides the error hierarchy for failures across the library:
//! authentication, transport, payload decoding, and configuration.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The vendor backend rejected the login handshake.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The session probe reported a logged-out session.
    #[error("session expired")]
    SessionExpired,

    /// Error occurred during HTTP communication.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error occurred while decoding a response payload.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A required installation or resource mapping is missing.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The binding has been disposed; no further work is accepted.
    #[error("binding disposed")]
    Disposed,
}

impl Error {
    /// Returns `true` when this error aborts the whole poll cycle.
    ///
    /// Transport and decode failures are confined to a single resource kind;
    /// authentication failures invalidate the session every fetch depends on.
    #[must_use]
    pub fn aborts_cycle(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_) | Self::SessionExpired)
    }
}

/// Errors related to HTTP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP request failed (network, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an unexpected status code.
    #[error("unexpected status {status} for {path}")]
    Status {
        /// The HTTP status code received.
        status: u16,
        /// The request path that produced it.
        path: String,
    },

    /// The configured base URL or a derived request URL is invalid.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors related to decoding vendor response payloads.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        let err = TransportError::Status {
            status: 503,
            path: "/installation/1/climate".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected status 503 for /installation/1/climate"
        );
    }

    #[test]
    fn error_from_decode_error() {
        let decode_err = DecodeError::MissingField("deviceLabel".to_string());
        let err: Error = decode_err.into();
        assert!(matches!(err, Error::Decode(DecodeError::MissingField(_))));
    }

    #[test]
    fn auth_errors_abort_the_cycle() {
        assert!(Error::AuthenticationFailed("bad credentials".into()).aborts_cycle());
        assert!(Error::SessionExpired.aborts_cycle());
    }

    #[test]
    fn resource_errors_do_not_abort_the_cycle() {
        let transport: Error = TransportError::Status {
            status: 500,
            path: "/x".into(),
        }
        .into();
        let decode: Error = DecodeError::UnexpectedFormat("not a list".into()).into();

        assert!(!transport.aborts_cycle());
        assert!(!decode.aborts_cycle());
        assert!(!Error::NotConfigured("no installations".into()).aborts_cycle());
    }
}
