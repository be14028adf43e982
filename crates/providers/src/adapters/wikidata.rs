// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Reference adapter for the `Universal` domain, keyed on title or person
//! name via Wikidata's `wbsearchentities` action.

use tanaste_core::claim::{field_key, MetadataClaim};
use tanaste_core_api::provider_request::ProviderLookupRequest;

use crate::adapter::{build_claim, ProviderAdapter};
use crate::fetch::HttpFetch;

const PROVIDER_NAME: &str = "wikidata";

pub struct WikidataAdapter<F> {
    fetch: F,
}

impl<F: HttpFetch> WikidataAdapter<F> {
    pub const fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

fn search_url(base_url: &str, query: &str) -> Option<String> {
    let mut url = url::Url::parse(base_url).ok()?;
    url.query_pairs_mut()
        .append_pair("action", "wbsearchentities")
        .append_pair("search", query)
        .append_pair("language", "en")
        .append_pair("format", "json");
    Some(url.into())
}

#[async_trait::async_trait]
impl<F: HttpFetch> ProviderAdapter for WikidataAdapter<F> {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch(&self, request: &ProviderLookupRequest) -> Vec<MetadataClaim> {
        let Some(query) = request.person_name.as_deref().or(request.title.as_deref()) else {
            return Vec::new();
        };
        let Some(url) = search_url(&request.base_url, query) else {
            return Vec::new();
        };

        let body = match self.fetch.get(&url).await {
            Ok(body) => body,
            Err(error) => {
                tracing::debug!(%error, "wikidata request failed");
                return Vec::new();
            }
        };
        let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&body) else {
            return Vec::new();
        };
        let Some(first) = parsed.get("search").and_then(|v| v.as_array()).and_then(|results| results.first()) else {
            return Vec::new();
        };

        let mut claims = Vec::new();
        if let Some(label) = first.get("label").and_then(|v| v.as_str()) {
            let field = if request.person_name.is_some() { "name" } else { field_key::TITLE };
            claims.push(build_claim(request, field, label.to_owned(), PROVIDER_NAME));
        }
        if let Some(id) = first.get("id").and_then(|v| v.as_str()) {
            claims.push(build_claim(request, "wikidata_qid", id.to_owned(), PROVIDER_NAME));
        }
        claims
    }
}

#[cfg(test)]
mod tests {
    use tanaste_core::entity::{EntityKind, EntityRef, EntityUid};
    use tanaste_core::media_asset::MediaType;
    use tanaste_core_api::provider_request::EntityType;

    use super::*;
    use crate::fetch::FetchError;

    struct StaticFetch(&'static str);

    #[async_trait::async_trait]
    impl HttpFetch for StaticFetch {
        async fn get(&self, _url: &str) -> Result<String, FetchError> {
            Ok(self.0.to_owned())
        }
    }

    struct FailingFetch;

    #[async_trait::async_trait]
    impl HttpFetch for FailingFetch {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            Err(FetchError::Status { url: url.to_owned(), status: 503 })
        }
    }

    fn request(title: Option<&str>) -> ProviderLookupRequest {
        ProviderLookupRequest {
            entity: EntityRef::new(EntityKind::Hub, EntityUid::new()),
            entity_type: EntityType::Hub,
            media_type: MediaType::Epub,
            title: title.map(str::to_owned),
            author: None,
            narrator: None,
            asin: None,
            isbn: None,
            person_name: None,
            person_role: None,
            base_url: "https://www.wikidata.org".to_owned(),
        }
    }

    #[tokio::test]
    async fn parses_label_and_qid_from_the_first_result() {
        let body = r#"{"search":[{"id":"Q15228","label":"The Hobbit"}]}"#;
        let adapter = WikidataAdapter::new(StaticFetch(body));
        let claims = adapter.fetch(&request(Some("The Hobbit"))).await;
        assert_eq!(claims.len(), 2);
        assert!(claims.iter().any(|c| c.field_key == field_key::TITLE && c.value == "The Hobbit"));
        assert!(claims.iter().any(|c| c.field_key == "wikidata_qid" && c.value == "Q15228"));
    }

    #[tokio::test]
    async fn short_circuits_without_title_or_person_name() {
        let adapter = WikidataAdapter::new(StaticFetch("{}"));
        let claims = adapter.fetch(&request(None)).await;
        assert!(claims.is_empty());
    }

    #[tokio::test]
    async fn degrades_gracefully_on_http_errors() {
        let adapter = WikidataAdapter::new(FailingFetch);
        let claims = adapter.fetch(&request(Some("The Hobbit"))).await;
        assert!(claims.is_empty());
    }

    #[tokio::test]
    async fn degrades_gracefully_on_garbage_responses() {
        let adapter = WikidataAdapter::new(StaticFetch("not json"));
        let claims = adapter.fetch(&request(Some("The Hobbit"))).await;
        assert!(claims.is_empty());
    }
}
