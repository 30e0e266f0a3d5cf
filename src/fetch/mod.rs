// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resource fetching.
//!
//! The [`ResourceFetcher`] turns one [`ResourceKind`] × installation pair
//! into typed [`DeviceRecord`]s: one GET against the kind's resource path,
//! JSON decoding, and (for door locks) a secondary per-device detail fetch
//! merged onto the listing stub via [`overlay`](crate::record::overlay).
//!
//! All fetches share the binding's [`Session`]: a fetch refuses to proceed
//! while the session is logged out, and a 401/302/403 from the backend maps
//! to [`Error::SessionExpired`] so the scheduler re-authenticates before the
//! next attempt.

mod dto;

pub use dto::InstallationDto;

use std::sync::Arc;

use crate::command::DeviceCommand;
use crate::error::{DecodeError, Error, TransportError};
use crate::record::{DeviceRecord, ResourceKind, overlay};
use crate::session::{InstallationRef, Session};
use crate::transport::Transport;

use dto::{
    ArmStateDto, BroadbandDto, ClimateDto, DoorLockDetailDto, DoorLockDto, DoorWindowListDto,
    SmartPlugDto,
};

/// Installations listing endpoint.
const INSTALLATIONS_PATH: &str = "/installations";

fn resource_path(kind: ResourceKind, giid: u64) -> String {
    match kind {
        ResourceKind::Alarm => format!("/installation/{giid}/armstate"),
        ResourceKind::SmartLock => format!("/installation/{giid}/doorlocks"),
        ResourceKind::DoorWindow => format!("/installation/{giid}/doorwindow"),
        ResourceKind::Climate => format!("/installation/{giid}/climate"),
        ResourceKind::SmartPlug => format!("/installation/{giid}/smartplugs"),
        ResourceKind::Broadband => format!("/installation/{giid}/broadband"),
    }
}

fn lock_detail_path(giid: u64, device_label: &str) -> String {
    format!(
        "/installation/{giid}/doorlock/{}",
        urlencoding::encode(device_label)
    )
}

/// Retrieves vendor resource collections for an authenticated session.
pub struct ResourceFetcher<T> {
    transport: Arc<T>,
    session: Arc<Session>,
}

impl<T: Transport> ResourceFetcher<T> {
    /// Creates a fetcher sharing the binding's transport and session.
    #[must_use]
    pub fn new(transport: Arc<T>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    /// Fetches the account's installations and stores them on the session.
    ///
    /// # Errors
    ///
    /// `SessionExpired` when the session is logged out or rejected,
    /// `Transport`/`Decode` on communication or payload failures.
    pub async fn discover_installations(&self) -> Result<Vec<InstallationRef>, Error> {
        let body = self.get_json(INSTALLATIONS_PATH).await?;
        let dtos: Vec<InstallationDto> =
            serde_json::from_str(&body).map_err(DecodeError::Json)?;

        let installations: Vec<InstallationRef> =
            dtos.into_iter().map(InstallationDto::into_ref).collect();
        tracing::debug!(count = installations.len(), "discovered installations");

        self.session.set_installations(installations.clone());
        Ok(installations)
    }

    /// Fetches one resource kind for one installation.
    ///
    /// # Errors
    ///
    /// `SessionExpired` aborts the caller's cycle; `Transport` and `Decode`
    /// are confined to this kind and tolerated by the cycle runner.
    pub async fn fetch(
        &self,
        kind: ResourceKind,
        installation: &InstallationRef,
    ) -> Result<Vec<DeviceRecord>, Error> {
        match kind {
            ResourceKind::Alarm => {
                let body = self
                    .get_json(&resource_path(kind, installation.giid))
                    .await?;
                let dto: ArmStateDto = serde_json::from_str(&body).map_err(DecodeError::Json)?;
                Ok(vec![dto.into_record(installation)])
            }
            ResourceKind::SmartLock => self.fetch_locks(installation).await,
            ResourceKind::DoorWindow => {
                let body = self
                    .get_json(&resource_path(kind, installation.giid))
                    .await?;
                let list: DoorWindowListDto =
                    serde_json::from_str(&body).map_err(DecodeError::Json)?;
                Ok(list
                    .devices
                    .into_iter()
                    .map(|d| d.into_record(installation))
                    .collect())
            }
            ResourceKind::Climate => {
                let body = self
                    .get_json(&resource_path(kind, installation.giid))
                    .await?;
                let dtos: Vec<ClimateDto> =
                    serde_json::from_str(&body).map_err(DecodeError::Json)?;
                Ok(dtos
                    .into_iter()
                    .map(|d| d.into_record(installation))
                    .collect())
            }
            ResourceKind::SmartPlug => {
                let body = self
                    .get_json(&resource_path(kind, installation.giid))
                    .await?;
                let dtos: Vec<SmartPlugDto> =
                    serde_json::from_str(&body).map_err(DecodeError::Json)?;
                Ok(dtos
                    .into_iter()
                    .map(|d| d.into_record(installation))
                    .collect())
            }
            ResourceKind::Broadband => {
                let body = self
                    .get_json(&resource_path(kind, installation.giid))
                    .await?;
                let dto: BroadbandDto = serde_json::from_str(&body).map_err(DecodeError::Json)?;
                Ok(vec![dto.into_record(installation)])
            }
        }
    }

    /// Fetches the lock listing and enriches each stub with detail fields.
    ///
    /// A failed detail fetch degrades to the stub (a stale config field
    /// beats a vanished device) unless the failure invalidates the session.
    async fn fetch_locks(
        &self,
        installation: &InstallationRef,
    ) -> Result<Vec<DeviceRecord>, Error> {
        let body = self
            .get_json(&resource_path(ResourceKind::SmartLock, installation.giid))
            .await?;
        let dtos: Vec<DoorLockDto> = serde_json::from_str(&body).map_err(DecodeError::Json)?;

        let mut records = Vec::with_capacity(dtos.len());
        for dto in dtos {
            let device_label = dto.device_label.clone();
            let stub = dto.into_record(installation);
            let record = match self.fetch_lock_detail(installation, &device_label).await {
                Ok(detail) => overlay(stub, &detail),
                Err(e) if e.aborts_cycle() => return Err(e),
                Err(e) => {
                    tracing::warn!(device_label, error = %e, "lock detail fetch failed");
                    stub
                }
            };
            records.push(record);
        }
        Ok(records)
    }

    async fn fetch_lock_detail(
        &self,
        installation: &InstallationRef,
        device_label: &str,
    ) -> Result<DeviceRecord, Error> {
        let body = self
            .get_json(&lock_detail_path(installation.giid, device_label))
            .await?;
        let dto: DoorLockDetailDto = serde_json::from_str(&body).map_err(DecodeError::Json)?;
        Ok(dto.into_record(device_label, installation))
    }

    /// Dispatches a device command, authorized by the current CSRF token.
    ///
    /// # Errors
    ///
    /// `SessionExpired` when the session is logged out or rejected,
    /// `NotConfigured` when the command needs a PIN none was supplied for,
    /// `Transport` on communication failures.
    pub async fn send_command(
        &self,
        installation: &InstallationRef,
        command: &DeviceCommand,
        pin: Option<&str>,
    ) -> Result<(), Error> {
        if !self.session.is_logged_in() {
            return Err(Error::SessionExpired);
        }
        let csrf_token = self.session.csrf_token().ok_or(Error::SessionExpired)?;

        let path = command.path(installation.giid);
        let body = command.body(pin)?;
        let headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-CSRF-Token".to_string(), csrf_token),
        ];

        tracing::debug!(command = %command, giid = installation.giid, "dispatching command");

        let response = self
            .transport
            .post(&path, &headers, body)
            .await
            .map_err(Error::Transport)?;

        match response.status {
            200..=299 => Ok(()),
            302 | 401 | 403 => Err(Error::SessionExpired),
            status => Err(Error::Transport(TransportError::Status { status, path })),
        }
    }

    async fn get_json(&self, path: &str) -> Result<String, Error> {
        if !self.session.is_logged_in() {
            return Err(Error::SessionExpired);
        }

        let response = self.transport.get(path).await.map_err(Error::Transport)?;
        match response.status {
            200..=299 => Ok(response.body),
            302 | 401 | 403 => Err(Error::SessionExpired),
            status => Err(Error::Transport(TransportError::Status {
                status,
                path: path.to_string(),
            })),
        }
    }
}

impl<T> std::fmt::Debug for ResourceFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceFetcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LockState, LockVolume};
    use crate::transport::WireResponse;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Transport stub answering GETs from a path-keyed table.
    #[derive(Default)]
    struct TableTransport {
        responses: Mutex<HashMap<String, WireResponse>>,
        requests: Mutex<Vec<String>>,
    }

    impl TableTransport {
        fn insert(&self, path: &str, status: u16, body: &str) {
            self.responses
                .lock()
                .insert(path.to_string(), WireResponse::new(status, body));
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    impl Transport for TableTransport {
        async fn get(&self, path: &str) -> Result<WireResponse, TransportError> {
            self.requests.lock().push(path.to_string());
            Ok(self
                .responses
                .lock()
                .get(path)
                .cloned()
                .unwrap_or_else(|| WireResponse::new(404, "")))
        }

        async fn post(
            &self,
            path: &str,
            _headers: &[(String, String)],
            _body: String,
        ) -> Result<WireResponse, TransportError> {
            self.requests.lock().push(format!("POST {path}"));
            Ok(self
                .responses
                .lock()
                .get(path)
                .cloned()
                .unwrap_or_else(|| WireResponse::new(200, "{}")))
        }

        async fn head(&self, _path: &str) -> Result<u16, TransportError> {
            Ok(200)
        }
    }

    fn logged_in_fetcher(transport: Arc<TableTransport>) -> ResourceFetcher<TableTransport> {
        let session = Arc::new(Session::new());
        session.set_tokens(Some("vid".into()), Some("csrf".into()));
        ResourceFetcher::new(transport, session)
    }

    fn home() -> InstallationRef {
        InstallationRef::new("Home", 1, 123)
    }

    #[tokio::test]
    async fn fetch_climate_returns_typed_records() {
        let transport = Arc::new(TableTransport::default());
        transport.insert(
            "/installation/123/climate",
            200,
            r#"[{"deviceLabel":"C1 02","deviceArea":"Hallway","temperature":21.5,"humidity":40.0}]"#,
        );
        let fetcher = logged_in_fetcher(Arc::clone(&transport));

        let records = fetcher.fetch(ResourceKind::Climate, &home()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].device_id(), "C1_02");
        assert_eq!(records[0].site_name(), "Home");
    }

    #[tokio::test]
    async fn fetch_refuses_without_login() {
        let transport = Arc::new(TableTransport::default());
        let fetcher = ResourceFetcher::new(Arc::clone(&transport), Arc::new(Session::new()));

        let result = fetcher.fetch(ResourceKind::Climate, &home()).await;

        assert!(matches!(result, Err(Error::SessionExpired)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn rejected_status_maps_to_session_expired() {
        let transport = Arc::new(TableTransport::default());
        transport.insert("/installation/123/climate", 401, "");
        let fetcher = logged_in_fetcher(transport);

        let result = fetcher.fetch(ResourceKind::Climate, &home()).await;
        assert!(matches!(result, Err(Error::SessionExpired)));
    }

    #[tokio::test]
    async fn malformed_payload_maps_to_decode_error() {
        let transport = Arc::new(TableTransport::default());
        transport.insert("/installation/123/climate", 200, "not json");
        let fetcher = logged_in_fetcher(transport);

        let result = fetcher.fetch(ResourceKind::Climate, &home()).await;
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn lock_listing_is_enriched_with_detail() {
        let transport = Arc::new(TableTransport::default());
        transport.insert(
            "/installation/123/doorlocks",
            200,
            r#"[{"deviceLabel":"3C4D 5E6F","area":"Front Door","lockedState":"LOCKED"}]"#,
        );
        transport.insert(
            "/installation/123/doorlock/3C4D%205E6F",
            200,
            r#"{"autoRelockEnabled":true,"volume":"HIGH"}"#,
        );
        let fetcher = logged_in_fetcher(transport);

        let records = fetcher
            .fetch(ResourceKind::SmartLock, &home())
            .await
            .unwrap();

        let DeviceRecord::SmartLock(lock) = &records[0] else {
            panic!("wrong variant");
        };
        assert_eq!(lock.device_id, "3C4D_5E6F");
        assert_eq!(lock.state, LockState::Locked);
        assert_eq!(lock.auto_relock, Some(true));
        assert_eq!(lock.volume, Some(LockVolume::High));
    }

    #[tokio::test]
    async fn failed_detail_fetch_degrades_to_stub() {
        let transport = Arc::new(TableTransport::default());
        transport.insert(
            "/installation/123/doorlocks",
            200,
            r#"[{"deviceLabel":"3C4D 5E6F","lockedState":"UNLOCKED"}]"#,
        );
        // No detail mock: the detail endpoint answers 404.
        let fetcher = logged_in_fetcher(transport);

        let records = fetcher
            .fetch(ResourceKind::SmartLock, &home())
            .await
            .unwrap();

        let DeviceRecord::SmartLock(lock) = &records[0] else {
            panic!("wrong variant");
        };
        assert_eq!(lock.state, LockState::Unlocked);
        assert!(lock.auto_relock.is_none());
    }

    #[tokio::test]
    async fn discover_installations_populates_session() {
        let transport = Arc::new(TableTransport::default());
        transport.insert(
            "/installations",
            200,
            r#"[{"giid":123,"alias":"Home","instance":1},{"giid":456,"alias":"Cabin","instance":2}]"#,
        );
        let session = Arc::new(Session::new());
        session.set_tokens(None, None);
        let fetcher = ResourceFetcher::new(transport, Arc::clone(&session));

        let installations = fetcher.discover_installations().await.unwrap();

        assert_eq!(installations.len(), 2);
        assert_eq!(session.installation_by_alias("Cabin").unwrap().giid, 456);
    }

    #[tokio::test]
    async fn command_requires_csrf_token() {
        let transport = Arc::new(TableTransport::default());
        let session = Arc::new(Session::new());
        session.set_tokens(Some("vid".into()), None);
        let fetcher = ResourceFetcher::new(transport, session);

        let result = fetcher
            .send_command(&home(), &DeviceCommand::ArmAway, Some("1234"))
            .await;

        assert!(matches!(result, Err(Error::SessionExpired)));
    }
}
