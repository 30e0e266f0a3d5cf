// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The poll-cycle runner.
//!
//! One cycle: ensure-authenticated → (discover installations if none) → for
//! each resource kind and installation: fetch → apply → notify-on-change.
//! Per-kind transport and decode failures are logged and tolerated; an
//! invalid session aborts the cycle and degrades the binding status. No
//! error escapes the job boundary.

use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::{Authenticator, RetryPolicy};
use crate::fetch::ResourceFetcher;
use crate::observer::ObserverRegistry;
use crate::record::ResourceKind;
use crate::scheduler::{CycleKind, CycleOutcome, CycleToken, OfflineReason, PollJob};
use crate::session::Session;
use crate::store::StateStore;
use crate::transport::Transport;

use super::{BindingId, BindingStatus};

pub(crate) struct CycleRunner<T> {
    binding_id: BindingId,
    auth: Authenticator<T>,
    fetcher: Arc<ResourceFetcher<T>>,
    session: Arc<Session>,
    store: Arc<StateStore>,
    observers: Arc<ObserverRegistry>,
    kinds: Vec<ResourceKind>,
    retry: RetryPolicy,
    status_tx: watch::Sender<BindingStatus>,
}

impl<T: Transport> CycleRunner<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        binding_id: BindingId,
        auth: Authenticator<T>,
        fetcher: Arc<ResourceFetcher<T>>,
        session: Arc<Session>,
        store: Arc<StateStore>,
        observers: Arc<ObserverRegistry>,
        kinds: Vec<ResourceKind>,
        retry: RetryPolicy,
        status_tx: watch::Sender<BindingStatus>,
    ) -> Self {
        Self {
            binding_id,
            auth,
            fetcher,
            session,
            store,
            observers,
            kinds,
            retry,
            status_tx,
        }
    }

    fn set_status(&self, status: BindingStatus) {
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    fn go_offline(&self, reason: OfflineReason) -> CycleOutcome {
        self.set_status(BindingStatus::Offline(reason));
        CycleOutcome::Offline(reason)
    }
}

impl<T: Transport> PollJob for CycleRunner<T> {
    async fn poll_cycle(&self, kind: CycleKind, token: CycleToken) -> CycleOutcome {
        tracing::debug!(binding = %self.binding_id, ?kind, "starting poll cycle");

        if !self.auth.ensure_authenticated(&self.retry).await {
            return self.go_offline(OfflineReason::AuthenticationFailed);
        }
        if !token.is_live() {
            return CycleOutcome::Discarded;
        }

        let mut installations = self.session.installations();
        if installations.is_empty() {
            match self.fetcher.discover_installations().await {
                Ok(found) => installations = found,
                Err(e) => {
                    tracing::warn!(binding = %self.binding_id, error = %e, "installation discovery failed");
                    return self.go_offline(OfflineReason::CommunicationError);
                }
            }
            if !token.is_live() {
                return CycleOutcome::Discarded;
            }
            if installations.is_empty() {
                tracing::warn!(binding = %self.binding_id, "account has no installations");
            }
        }

        let mut fetched = 0;
        let mut changed = 0;
        for resource_kind in &self.kinds {
            for installation in &installations {
                match self.fetcher.fetch(*resource_kind, installation).await {
                    Ok(records) => {
                        if !token.is_live() {
                            return CycleOutcome::Discarded;
                        }
                        fetched += records.len();
                        for record in records {
                            if self.store.apply(record.clone()) {
                                changed += 1;
                                self.observers.notify(&record);
                            }
                        }
                    }
                    Err(e) if e.aborts_cycle() => {
                        tracing::warn!(
                            binding = %self.binding_id,
                            kind = %resource_kind,
                            error = %e,
                            "session rejected mid-cycle"
                        );
                        self.session.mark_logged_out();
                        return self.go_offline(OfflineReason::CommunicationError);
                    }
                    Err(e) => {
                        // Confined to this kind; the rest of the cycle goes on.
                        tracing::warn!(
                            binding = %self.binding_id,
                            kind = %resource_kind,
                            giid = installation.giid,
                            error = %e,
                            "resource fetch failed"
                        );
                    }
                }
            }
        }

        if !token.is_live() {
            return CycleOutcome::Discarded;
        }
        self.set_status(BindingStatus::Online);
        CycleOutcome::Completed {
            records: fetched,
            changed,
        }
    }
}

impl<T> std::fmt::Debug for CycleRunner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleRunner")
            .field("binding_id", &self.binding_id)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}
