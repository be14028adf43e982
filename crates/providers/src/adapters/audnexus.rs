// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Reference adapter for the `Audiobook` domain. Requires an ASIN; makes
//! zero network calls without one (`spec.md` §4.G: "Audnexus without an
//! ASIN makes zero network calls").

use tanaste_core::claim::{field_key, MetadataClaim};
use tanaste_core_api::provider_request::ProviderLookupRequest;

use crate::adapter::{build_claim, ProviderAdapter};
use crate::fetch::HttpFetch;

const PROVIDER_NAME: &str = "audnexus";

pub struct AudnexusAdapter<F> {
    fetch: F,
}

impl<F: HttpFetch> AudnexusAdapter<F> {
    pub const fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

#[async_trait::async_trait]
impl<F: HttpFetch> ProviderAdapter for AudnexusAdapter<F> {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch(&self, request: &ProviderLookupRequest) -> Vec<MetadataClaim> {
        let Some(asin) = request.asin.as_deref() else {
            return Vec::new();
        };
        let url = format!("{}/books/{asin}", request.base_url.trim_end_matches('/'));

        let body = match self.fetch.get(&url).await {
            Ok(body) => body,
            Err(error) => {
                tracing::debug!(%error, "audnexus request failed");
                return Vec::new();
            }
        };
        let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&body) else {
            return Vec::new();
        };

        let mut claims = Vec::new();
        if let Some(title) = parsed.get("title").and_then(|v| v.as_str()) {
            claims.push(build_claim(request, field_key::TITLE, title.to_owned(), PROVIDER_NAME));
        }
        if let Some(narrator) = parsed
            .get("narrators")
            .and_then(|v| v.as_array())
            .and_then(|narrators| narrators.first())
            .and_then(|narrator| narrator.get("name"))
            .and_then(|v| v.as_str())
        {
            claims.push(build_claim(request, field_key::NARRATOR, narrator.to_owned(), PROVIDER_NAME));
        }
        claims
    }
}
