// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The injectable network boundary. Reference adapters are generic over
//! [`HttpFetch`] rather than calling `reqwest` directly, so tests can
//! substitute a failing/timing-out/garbage fetcher without a network
//! (`spec.md` §8 Scenario 4).

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
}

#[async_trait::async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Default [`HttpFetch`] backed by `reqwest`. Adapter-level timeouts are
/// enforced by [`crate::harvester::ProviderHarvester`] wrapping the whole
/// `fetch` call, not by this client, so no per-request timeout is set here.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    #[must_use]
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl Default for ReqwestFetch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HttpFetch for ReqwestFetch {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request { url: url.to_owned(), source })?;
        if !response.status().is_success() {
            return Err(FetchError::Status { url: url.to_owned(), status: response.status().as_u16() });
        }
        response
            .text()
            .await
            .map_err(|source| FetchError::Request { url: url.to_owned(), source })
    }
}
