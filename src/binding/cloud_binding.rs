// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The binding façade.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::auth::Authenticator;
use crate::command::DeviceCommand;
use crate::error::{Error, Result};
use crate::fetch::ResourceFetcher;
use crate::observer::{ObserverId, ObserverRegistry};
use crate::record::DeviceRecord;
use crate::scheduler::{PollScheduler, RefreshDecision, SchedulerState};
use crate::session::Session;
use crate::store::StateStore;
use crate::transport::{HttpConfig, HttpTransport, Transport};

use super::cycle::CycleRunner;
use super::{BindingConfig, BindingId, BindingStatus};

/// Delay of the refresh scheduled after a successful command, giving the
/// vendor time to apply the change before we read it back.
const COMMAND_REFRESH_DELAY: Duration = Duration::from_secs(2);

/// One account's binding: session, scheduler, state store, and observers.
///
/// See the [module docs](super) for the lifecycle and an example.
pub struct CloudBinding<T: Transport = HttpTransport> {
    id: BindingId,
    session: Arc<Session>,
    store: Arc<StateStore>,
    observers: Arc<ObserverRegistry>,
    fetcher: Arc<ResourceFetcher<T>>,
    scheduler: PollScheduler<CycleRunner<T>>,
    status_rx: watch::Receiver<BindingStatus>,
    pin: Option<String>,
}

impl CloudBinding<HttpTransport> {
    /// Creates a binding over an HTTP transport built from the config.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(config: BindingConfig) -> Result<Self> {
        let transport = HttpConfig::new(&config.base_url)
            .with_timeout(config.request_timeout)
            .into_transport()
            .map_err(Error::Transport)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> CloudBinding<T> {
    /// Creates a binding over an injected transport. Used by tests to drive
    /// the full pipeline against a scripted backend.
    #[must_use]
    pub fn with_transport(config: BindingConfig, transport: T) -> Self {
        let transport = Arc::new(transport);
        let id = BindingId::new();
        let session = Arc::new(Session::new());
        let store = Arc::new(StateStore::new());
        let observers = Arc::new(ObserverRegistry::new());
        let fetcher = Arc::new(ResourceFetcher::new(
            Arc::clone(&transport),
            Arc::clone(&session),
        ));
        let auth = Authenticator::new(
            Arc::clone(&transport),
            Arc::clone(&session),
            config.credentials.clone(),
        );
        let (status_tx, status_rx) = watch::channel(BindingStatus::Idle);

        let runner = CycleRunner::new(
            id,
            auth,
            Arc::clone(&fetcher),
            Arc::clone(&session),
            Arc::clone(&store),
            Arc::clone(&observers),
            config.resource_kinds.clone(),
            config.retry.clone(),
            status_tx,
        );
        let scheduler = PollScheduler::new(runner, config.poll_interval);

        Self {
            id,
            session,
            store,
            observers,
            fetcher,
            scheduler,
            status_rx,
            pin: config.credentials.pin,
        }
    }

    /// Returns this binding's identifier.
    #[must_use]
    pub fn id(&self) -> BindingId {
        self.id
    }

    /// Starts polling: the first cycle runs immediately (performing the
    /// login), then every poll interval. Idempotent; a no-op after disposal.
    pub fn initialize(&self) {
        tracing::debug!(binding = %self.id, "initializing");
        self.scheduler.activate();
    }

    /// Requests an out-of-band poll cycle after `delay`.
    ///
    /// Redundant requests coalesce: if the periodic cycle is due sooner, or
    /// an immediate cycle is already pending, nothing new is scheduled.
    pub fn refresh_now(&self, delay: Duration) -> RefreshDecision {
        self.scheduler.request_refresh(delay)
    }

    /// Cancels all scheduled work and clears session, store, and observers.
    ///
    /// Terminal: subsequent `initialize`/`refresh_now` calls are rejected.
    /// A cycle already executing discards its results.
    pub fn dispose(&self) {
        tracing::debug!(binding = %self.id, "disposing");
        self.scheduler.dispose();
        self.observers.clear();
        self.store.clear();
        self.session.clear();
    }

    /// Registers an observer invoked once per changed device record.
    pub fn register_observer<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&DeviceRecord) + Send + Sync + 'static,
    {
        self.observers.register(observer)
    }

    /// Unregisters an observer. Idempotent.
    pub fn unregister_observer(&self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    /// Returns the current binding status.
    #[must_use]
    pub fn status(&self) -> BindingStatus {
        *self.status_rx.borrow()
    }

    /// Returns a receiver notified on every status change.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<BindingStatus> {
        self.status_rx.clone()
    }

    /// Returns the scheduler's lifecycle state.
    #[must_use]
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Returns the latest record for a device, if known.
    #[must_use]
    pub fn record(&self, device_id: &str) -> Option<DeviceRecord> {
        self.store.get(device_id)
    }

    /// Returns a snapshot of all known records.
    #[must_use]
    pub fn records(&self) -> HashMap<String, DeviceRecord> {
        self.store.all()
    }

    /// Dispatches a command to a device of the named installation, then
    /// schedules a short-delay refresh so the next cycle picks up the result.
    ///
    /// # Errors
    ///
    /// `Disposed` after disposal, `NotConfigured` for an unknown installation
    /// alias or a missing PIN, `SessionExpired`/`Transport` from dispatch.
    pub async fn send_command(&self, site_alias: &str, command: &DeviceCommand) -> Result<()> {
        if self.scheduler.state() == SchedulerState::Disposed {
            return Err(Error::Disposed);
        }
        let installation = self.session.installation_by_alias(site_alias).ok_or_else(|| {
            Error::NotConfigured(format!("unknown installation alias: {site_alias}"))
        })?;

        self.fetcher
            .send_command(&installation, command, self.pin.as_deref())
            .await?;

        self.refresh_now(COMMAND_REFRESH_DELAY);
        Ok(())
    }
}

impl<T: Transport> std::fmt::Debug for CloudBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudBinding")
            .field("id", &self.id)
            .field("status", &self.status())
            .field("scheduler", &self.scheduler_state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::error::TransportError;
    use crate::transport::WireResponse;

    /// Transport that answers 404 to everything.
    struct NullTransport;

    impl Transport for NullTransport {
        async fn get(&self, _path: &str) -> std::result::Result<WireResponse, TransportError> {
            Ok(WireResponse::new(404, ""))
        }

        async fn post(
            &self,
            _path: &str,
            _headers: &[(String, String)],
            _body: String,
        ) -> std::result::Result<WireResponse, TransportError> {
            Ok(WireResponse::new(404, ""))
        }

        async fn head(&self, _path: &str) -> std::result::Result<u16, TransportError> {
            Ok(404)
        }
    }

    fn binding() -> CloudBinding<NullTransport> {
        let config = BindingConfig::new(
            "https://cloud.example.com",
            Credentials::new("user@example.com", "hunter2"),
        );
        CloudBinding::with_transport(config, NullTransport)
    }

    #[tokio::test]
    async fn new_binding_is_idle() {
        let binding = binding();
        assert_eq!(binding.status(), BindingStatus::Idle);
        assert_eq!(binding.scheduler_state(), SchedulerState::Idle);
        assert!(binding.records().is_empty());
    }

    #[tokio::test]
    async fn observers_register_and_unregister() {
        let binding = binding();
        let id = binding.register_observer(|_| {});

        assert!(binding.unregister_observer(id));
        assert!(!binding.unregister_observer(id));
    }

    #[tokio::test]
    async fn command_with_unknown_alias_is_not_configured() {
        let binding = binding();

        let result = binding
            .send_command("Nowhere", &DeviceCommand::ArmAway)
            .await;

        assert!(matches!(result, Err(Error::NotConfigured(_))));
    }

    #[tokio::test]
    async fn disposed_binding_rejects_work() {
        let binding = binding();
        binding.dispose();

        assert_eq!(binding.scheduler_state(), SchedulerState::Disposed);
        assert_eq!(
            binding.refresh_now(Duration::from_secs(1)),
            RefreshDecision::Disposed
        );
        let result = binding.send_command("Home", &DeviceCommand::Disarm).await;
        assert!(matches!(result, Err(Error::Disposed)));
    }
}
