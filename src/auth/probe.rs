// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Logged-in probe interpretation.

/// Outcome of classifying a session-probe response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeVerdict {
    /// The backend recognized the session.
    LoggedIn,
    /// The backend rejected or redirected the request.
    LoggedOut,
    /// The response fits neither pattern. Treated as logged out.
    Unknown,
}

/// Strategy for interpreting the HEAD probe against an authenticated-only
/// resource.
///
/// Vendors differ on how a dead session answers: 401, a 302 to the login
/// page, even a 200 serving the login form. The default [`StatusProbe`]
/// covers the common status-code cases; vendors with page-content heuristics
/// supply their own policy.
pub trait ProbePolicy: Send + Sync {
    /// Classifies a probe status code.
    fn classify(&self, status: u16) -> ProbeVerdict;
}

/// Default status-code-based probe interpretation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusProbe;

impl ProbePolicy for StatusProbe {
    fn classify(&self, status: u16) -> ProbeVerdict {
        match status {
            200..=299 => ProbeVerdict::LoggedIn,
            302 | 401 | 403 => ProbeVerdict::LoggedOut,
            _ => ProbeVerdict::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_are_logged_in() {
        assert_eq!(StatusProbe.classify(200), ProbeVerdict::LoggedIn);
        assert_eq!(StatusProbe.classify(204), ProbeVerdict::LoggedIn);
    }

    #[test]
    fn rejection_statuses_are_logged_out() {
        assert_eq!(StatusProbe.classify(302), ProbeVerdict::LoggedOut);
        assert_eq!(StatusProbe.classify(401), ProbeVerdict::LoggedOut);
        assert_eq!(StatusProbe.classify(403), ProbeVerdict::LoggedOut);
    }

    #[test]
    fn anything_else_is_unknown() {
        assert_eq!(StatusProbe.classify(404), ProbeVerdict::Unknown);
        assert_eq!(StatusProbe.classify(500), ProbeVerdict::Unknown);
    }
}
