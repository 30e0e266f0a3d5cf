// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The login handshake.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::Error;
use crate::session::Session;
use crate::transport::Transport;

use super::probe::{ProbePolicy, ProbeVerdict, StatusProbe};
use super::{Credentials, RetryPolicy};

/// Login-page endpoint; the response carries the CSRF token header.
const CSRF_PATH: &str = "/auth/csrf";
/// Credential POST endpoint.
const LOGIN_PATH: &str = "/auth/login";
/// Authenticated-only resource probed by HEAD to test the session.
const PROBE_PATH: &str = "/auth/session";

/// Header carrying the CSRF token, on the login page and on our POSTs.
const CSRF_HEADER: &str = "X-CSRF-Token";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "accessToken", default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Performs and maintains the vendor login.
///
/// Session tokens are mutated only here, under the session's internal lock.
pub struct Authenticator<T> {
    transport: Arc<T>,
    session: Arc<Session>,
    credentials: Credentials,
    probe: Box<dyn ProbePolicy>,
}

impl<T: Transport> Authenticator<T> {
    /// Creates an authenticator with the default [`StatusProbe`] policy.
    #[must_use]
    pub fn new(transport: Arc<T>, session: Arc<Session>, credentials: Credentials) -> Self {
        Self {
            transport,
            session,
            credentials,
            probe: Box::new(StatusProbe),
        }
    }

    /// Replaces the probe interpretation strategy.
    #[must_use]
    pub fn with_probe(mut self, probe: Box<dyn ProbePolicy>) -> Self {
        self.probe = probe;
        self
    }

    /// Performs the vendor login handshake.
    ///
    /// Returns `true` iff the backend confirmed success. Side effect: stores
    /// the auth and CSRF tokens on the session. Network errors and malformed
    /// responses yield `false`; nothing escapes.
    pub async fn login(&self) -> bool {
        match self.attempt_login().await {
            Ok(()) => {
                tracing::debug!("login succeeded");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                false
            }
        }
    }

    async fn attempt_login(&self) -> Result<(), Error> {
        let csrf_page = self.transport.get(CSRF_PATH).await.map_err(Error::Transport)?;
        if !csrf_page.is_success() {
            return Err(Error::AuthenticationFailed(format!(
                "CSRF fetch returned HTTP {}",
                csrf_page.status
            )));
        }
        let csrf_token = csrf_page
            .header(CSRF_HEADER)
            .ok_or_else(|| {
                Error::AuthenticationFailed("login page carried no CSRF token".to_string())
            })?
            .to_string();

        let form = format!(
            "username={}&password={}",
            urlencoding::encode(&self.credentials.username),
            urlencoding::encode(&self.credentials.password),
        );
        let headers = vec![
            (
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ),
            (CSRF_HEADER.to_string(), csrf_token.clone()),
        ];

        let response = self
            .transport
            .post(LOGIN_PATH, &headers, form)
            .await
            .map_err(Error::Transport)?;

        if !response.is_success() {
            return Err(Error::AuthenticationFailed(format!(
                "login returned HTTP {}",
                response.status
            )));
        }

        // A 2xx with an error body is still a rejection; a 2xx with an
        // unparseable body is accepted (the session cookie is already set).
        let parsed: Option<LoginResponse> = serde_json::from_str(&response.body).ok();
        if let Some(error) = parsed.as_ref().and_then(|r| r.error.clone()) {
            return Err(Error::AuthenticationFailed(error));
        }

        let auth_token = parsed.and_then(|r| r.access_token);
        self.session.set_tokens(auth_token, Some(csrf_token));
        Ok(())
    }

    /// Probes whether the backend still recognizes the session.
    ///
    /// Transport failures and unknown verdicts classify as logged out.
    pub async fn is_authenticated(&self) -> bool {
        match self.transport.head(PROBE_PATH).await {
            Ok(status) => self.probe.classify(status) == ProbeVerdict::LoggedIn,
            Err(e) => {
                tracing::debug!(error = %e, "session probe failed");
                false
            }
        }
    }

    /// Makes sure the session is live, logging in if needed.
    ///
    /// Performs up to `retry.max_attempts` logins with `retry.backoff`
    /// between consecutive attempts. Returns `false` once attempts are
    /// exhausted; the caller maps that to an offline cycle.
    pub async fn ensure_authenticated(&self, retry: &RetryPolicy) -> bool {
        if self.session.is_logged_in() && self.is_authenticated().await {
            return true;
        }
        self.session.mark_logged_out();

        for attempt in 1..=retry.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(retry.backoff).await;
            }
            tracing::debug!(attempt, max_attempts = retry.max_attempts, "logging in");
            if self.login().await {
                return true;
            }
        }

        tracing::warn!(
            attempts = retry.max_attempts,
            "authentication attempts exhausted"
        );
        false
    }
}

impl<T> std::fmt::Debug for Authenticator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("username", &self.credentials.username)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::WireResponse;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Transport stub answering from scripted per-endpoint responses.
    #[derive(Default)]
    struct ScriptedTransport {
        login_statuses: Mutex<VecDeque<u16>>,
        post_count: Mutex<u32>,
        head_status: Mutex<Option<u16>>,
    }

    impl ScriptedTransport {
        fn with_login_statuses(statuses: &[u16]) -> Self {
            Self {
                login_statuses: Mutex::new(statuses.iter().copied().collect()),
                ..Self::default()
            }
        }

        fn posts(&self) -> u32 {
            *self.post_count.lock()
        }
    }

    impl Transport for ScriptedTransport {
        async fn get(&self, path: &str) -> Result<WireResponse, TransportError> {
            assert_eq!(path, CSRF_PATH);
            let mut response = WireResponse::new(200, "");
            response
                .headers
                .push((CSRF_HEADER.to_string(), "csrf-abc".to_string()));
            Ok(response)
        }

        async fn post(
            &self,
            path: &str,
            headers: &[(String, String)],
            body: String,
        ) -> Result<WireResponse, TransportError> {
            assert_eq!(path, LOGIN_PATH);
            assert!(body.contains("username="));
            assert!(
                headers
                    .iter()
                    .any(|(n, v)| n == CSRF_HEADER && v == "csrf-abc")
            );
            *self.post_count.lock() += 1;
            let status = self.login_statuses.lock().pop_front().unwrap_or(200);
            Ok(WireResponse::new(
                status,
                r#"{"accessToken":"vid-123"}"#,
            ))
        }

        async fn head(&self, _path: &str) -> Result<u16, TransportError> {
            Ok(self.head_status.lock().unwrap_or(401))
        }
    }

    fn authenticator(transport: Arc<ScriptedTransport>) -> Authenticator<ScriptedTransport> {
        Authenticator::new(
            transport,
            Arc::new(Session::new()),
            Credentials::new("user@example.com", "hunter2"),
        )
    }

    #[tokio::test]
    async fn successful_login_stores_tokens() {
        let transport = Arc::new(ScriptedTransport::default());
        let session = Arc::new(Session::new());
        let auth = Authenticator::new(
            Arc::clone(&transport),
            Arc::clone(&session),
            Credentials::new("user@example.com", "hunter2"),
        );

        assert!(auth.login().await);
        assert!(session.is_logged_in());
        assert_eq!(session.auth_token().as_deref(), Some("vid-123"));
        assert_eq!(session.csrf_token().as_deref(), Some("csrf-abc"));
    }

    #[tokio::test]
    async fn rejected_login_returns_false() {
        let transport = Arc::new(ScriptedTransport::with_login_statuses(&[401]));
        let auth = authenticator(Arc::clone(&transport));

        assert!(!auth.login().await);
    }

    #[tokio::test(start_paused = true)]
    async fn ensure_authenticated_retries_with_backoff() {
        // Fails twice, succeeds on the third attempt.
        let transport = Arc::new(ScriptedTransport::with_login_statuses(&[500, 500, 200]));
        let auth = authenticator(Arc::clone(&transport));

        let started = tokio::time::Instant::now();
        let ok = auth.ensure_authenticated(&RetryPolicy::default()).await;

        assert!(ok);
        assert_eq!(transport.posts(), 3);
        // Two backoff sleeps of 2 s between the three attempts.
        assert!(started.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn ensure_authenticated_gives_up_after_max_attempts() {
        let transport = Arc::new(ScriptedTransport::with_login_statuses(&[500, 500, 500, 500]));
        let auth = authenticator(Arc::clone(&transport));

        let ok = auth.ensure_authenticated(&RetryPolicy::default()).await;

        assert!(!ok);
        assert_eq!(transport.posts(), 3);
    }

    #[tokio::test]
    async fn live_session_short_circuits() {
        let transport = Arc::new(ScriptedTransport::default());
        *transport.head_status.lock() = Some(200);
        let session = Arc::new(Session::new());
        session.set_tokens(Some("vid".into()), Some("csrf".into()));
        let auth = Authenticator::new(
            Arc::clone(&transport),
            session,
            Credentials::new("user@example.com", "hunter2"),
        );

        assert!(auth.ensure_authenticated(&RetryPolicy::default()).await);
        assert_eq!(transport.posts(), 0);
    }
}
