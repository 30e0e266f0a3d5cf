// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor session state.
//!
//! A [`Session`] owns the mutable authentication state of one binding
//! instance: the auth and CSRF tokens handed out by the login handshake and
//! the installations (sites) discovered for the account. The interior lock is
//! never exposed; every read returns a clone, and token writes go through the
//! authenticator only.

use parking_lot::Mutex;

/// An account site the vendor scopes device resources under.
///
/// Created during installation discovery, immutable thereafter, and looked up
/// by alias when dispatching commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationRef {
    /// Human-readable site name chosen by the account owner.
    pub alias: String,
    /// Vendor instance number (disambiguates sites sharing an alias).
    pub instance: u32,
    /// Vendor-wide numeric site identifier.
    pub giid: u64,
}

impl InstallationRef {
    /// Creates a new installation reference.
    #[must_use]
    pub fn new(alias: impl Into<String>, instance: u32, giid: u64) -> Self {
        Self {
            alias: alias.into(),
            instance,
            giid,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    auth_token: Option<String>,
    csrf_token: Option<String>,
    logged_in: bool,
    installations: Vec<InstallationRef>,
}

/// Mutable session state for one binding instance.
///
/// Created at binding startup, populated by the login handshake, cleared at
/// disposal.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    /// Creates a new, logged-out session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the tokens from a successful login and marks the session live.
    pub fn set_tokens(&self, auth_token: Option<String>, csrf_token: Option<String>) {
        let mut state = self.state.lock();
        state.auth_token = auth_token;
        state.csrf_token = csrf_token;
        state.logged_in = true;
    }

    /// Marks the session logged out, keeping discovered installations.
    pub fn mark_logged_out(&self) {
        let mut state = self.state.lock();
        state.auth_token = None;
        state.csrf_token = None;
        state.logged_in = false;
    }

    /// Returns `true` if a login has succeeded and not been invalidated.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.state.lock().logged_in
    }

    /// Returns the current auth token, if any.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        self.state.lock().auth_token.clone()
    }

    /// Returns the current CSRF token, if any.
    #[must_use]
    pub fn csrf_token(&self) -> Option<String> {
        self.state.lock().csrf_token.clone()
    }

    /// Replaces the discovered installations.
    pub fn set_installations(&self, installations: Vec<InstallationRef>) {
        self.state.lock().installations = installations;
    }

    /// Returns a snapshot of the discovered installations.
    #[must_use]
    pub fn installations(&self) -> Vec<InstallationRef> {
        self.state.lock().installations.clone()
    }

    /// Looks up an installation by its alias.
    #[must_use]
    pub fn installation_by_alias(&self, alias: &str) -> Option<InstallationRef> {
        self.state
            .lock()
            .installations
            .iter()
            .find(|i| i.alias == alias)
            .cloned()
    }

    /// Clears all session state. Called on disposal.
    pub fn clear(&self) {
        *self.state.lock() = SessionState::default();
    }
}
