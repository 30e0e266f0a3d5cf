// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reqwest-backed transport implementation.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::TransportError;
use crate::transport::{Transport, WireResponse};

/// Configuration for the HTTP transport.
///
/// # Examples
///
/// ```
/// use homewatch_lib::transport::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("https://cloud.example.com")
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_url: String,
    timeout: Duration,
}

impl HttpConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a new configuration for the given vendor base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the per-request timeout.
    ///
    /// Every blocking call a poll cycle makes is bounded by this timeout,
    /// which is what guarantees the scheduler thread is eventually released.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an [`HttpTransport`] from this configuration.
    ///
    /// The client carries a cookie jar: the vendor session cookie set by the
    /// login endpoint rides along on every subsequent request.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the client cannot be built.
    pub fn into_transport(self) -> Result<HttpTransport, TransportError> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", self.base_url)))?;

        // Redirects stay visible: a 302 from the backend is a logged-out
        // signal for the probe, not something to follow.
        let client = Client::builder()
            .timeout(self.timeout)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(TransportError::Http)?;

        Ok(HttpTransport { base_url, client })
    }
}

/// HTTP transport for communicating with a vendor cloud backend.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport for the given base URL with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        HttpConfig::new(base_url).into_transport()
    }

    /// Returns the base URL of the vendor backend.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn build_url(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn read_response(response: reqwest::Response) -> Result<WireResponse, TransportError> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(TransportError::Http)?;

        Ok(WireResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<WireResponse, TransportError> {
        let url = self.build_url(path)?;

        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(TransportError::Http)?;
        Self::read_response(response).await
    }

    async fn post(
        &self,
        path: &str,
        headers: &[(String, String)],
        body: String,
    ) -> Result<WireResponse, TransportError> {
        let url = self.build_url(path)?;

        tracing::debug!(url = %url, "POST");

        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(TransportError::Http)?;
        Self::read_response(response).await
    }

    async fn head(&self, path: &str) -> Result<u16, TransportError> {
        let url = self.build_url(path)?;

        tracing::debug!(url = %url, "HEAD");

        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(TransportError::Http)?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = HttpConfig::new("https://cloud.example.com");
        assert_eq!(config.base_url(), "https://cloud.example.com");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn config_with_timeout() {
        let config =
            HttpConfig::new("https://cloud.example.com").with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn into_transport_rejects_invalid_url() {
        let result = HttpConfig::new("not a url").into_transport();
        assert!(result.is_err());
    }

    #[test]
    fn build_url_joins_absolute_paths() {
        let transport = HttpTransport::new("https://cloud.example.com").unwrap();
        let url = transport.build_url("/installation/123/climate").unwrap();
        assert_eq!(
            url.as_str(),
            "https://cloud.example.com/installation/123/climate"
        );
    }
}

