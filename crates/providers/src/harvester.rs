// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Concurrency-capped dispatch across every enabled, domain-matching
//! provider. Mirrors the teacher's `Gatekeeper`: a global cap plus a
//! per-resource cap, each enforced with a [`tokio::sync::Semaphore`], and
//! a bounded wait (here, per-call timeout) instead of unbounded blocking.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tanaste_core::provider::ProviderConfig;
use tanaste_core::util::clock;
use tanaste_core_api::provider_request::ProviderLookupRequest;
use tokio::sync::Semaphore;

use crate::adapter::ProviderAdapter;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HarvesterConfig {
    pub global_concurrency: usize,
    pub per_provider_concurrency: usize,
    pub adapter_timeout: Duration,
}

impl HarvesterConfig {
    const fn default_global_concurrency() -> usize {
        16
    }
    const fn default_per_provider_concurrency() -> usize {
        4
    }
    const fn default_adapter_timeout() -> Duration {
        Duration::from_secs(10)
    }
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            global_concurrency: Self::default_global_concurrency(),
            per_provider_concurrency: Self::default_per_provider_concurrency(),
            adapter_timeout: Self::default_adapter_timeout(),
        }
    }
}

/// One enabled provider paired with the adapter that implements its
/// lookups.
pub struct RegisteredProvider {
    pub config: ProviderConfig,
    pub adapter: Arc<dyn ProviderAdapter>,
}

impl std::fmt::Debug for RegisteredProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredProvider").field("config", &self.config).finish_non_exhaustive()
    }
}

pub struct ProviderHarvester {
    providers: Vec<RegisteredProvider>,
    global_semaphore: Arc<Semaphore>,
    per_provider_semaphores: HashMap<String, Arc<Semaphore>>,
    timeout: Duration,
}

impl std::fmt::Debug for ProviderHarvester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHarvester")
            .field("providers", &self.providers.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderHarvester {
    #[must_use]
    pub fn new(providers: Vec<RegisteredProvider>, config: HarvesterConfig) -> Self {
        let per_provider_semaphores = providers
            .iter()
            .map(|provider| (provider.config.name.clone(), Arc::new(Semaphore::new(config.per_provider_concurrency))))
            .collect();
        Self {
            providers,
            global_semaphore: Arc::new(Semaphore::new(config.global_concurrency)),
            per_provider_semaphores,
            timeout: config.adapter_timeout,
        }
    }

    /// Dispatches `request` to every enabled provider whose domain matches
    /// the request's media type, aggregates the returned claims, and
    /// stamps `observed_at = now` on all of them uniformly.
    pub async fn harvest(&self, request: &ProviderLookupRequest) -> Vec<tanaste_core::claim::MetadataClaim> {
        let eligible = self
            .providers
            .iter()
            .filter(|provider| provider.config.enabled && provider.config.domain.matches(request.media_type));

        let mut tasks = Vec::new();
        for provider in eligible {
            let adapter = Arc::clone(&provider.adapter);
            let global_semaphore = Arc::clone(&self.global_semaphore);
            let per_provider_semaphore = Arc::clone(
                self.per_provider_semaphores
                    .get(&provider.config.name)
                    .expect("a semaphore is registered for every provider passed to new()"),
            );
            let timeout = self.timeout;
            let mut request = request.clone();
            if !provider.config.base_url.is_empty() {
                request.base_url = provider.config.base_url.clone();
            }
            let provider_name = provider.config.name.clone();
            tasks.push(tokio::spawn(async move {
                let _global_permit = global_semaphore.acquire().await.expect("semaphore is never closed");
                let _provider_permit = per_provider_semaphore.acquire().await.expect("semaphore is never closed");
                match tokio::time::timeout(timeout, adapter.fetch(&request)).await {
                    Ok(claims) => claims,
                    Err(_) => {
                        tracing::warn!(provider = %provider_name, "provider adapter timed out");
                        Vec::new()
                    }
                }
            }));
        }

        let now = clock::now();
        let mut claims = Vec::new();
        for task in tasks {
            match task.await {
                Ok(fetched) => claims.extend(fetched),
                Err(join_error) => tracing::warn!(%join_error, "provider adapter task panicked"),
            }
        }
        for claim in &mut claims {
            claim.observed_at = now;
        }
        claims
    }
}

#[cfg(test)]
mod tests {
    use tanaste_core::entity::{EntityKind, EntityRef, EntityUid};
    use tanaste_core::media_asset::MediaType;
    use tanaste_core::provider::ProviderDomain;
    use tanaste_core_api::provider_request::EntityType;

    use super::*;

    struct StubAdapter {
        name: &'static str,
        claims: Vec<tanaste_core::claim::MetadataClaim>,
    }

    #[async_trait::async_trait]
    impl ProviderAdapter for StubAdapter {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _request: &ProviderLookupRequest) -> Vec<tanaste_core::claim::MetadataClaim> {
            self.claims.clone()
        }
    }

    struct HangingAdapter;

    #[async_trait::async_trait]
    impl ProviderAdapter for HangingAdapter {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn fetch(&self, _request: &ProviderLookupRequest) -> Vec<tanaste_core::claim::MetadataClaim> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Vec::new()
        }
    }

    fn sample_request() -> ProviderLookupRequest {
        ProviderLookupRequest {
            entity: EntityRef::new(EntityKind::Work, EntityUid::new()),
            entity_type: EntityType::Work,
            media_type: MediaType::Epub,
            title: Some("Dune".to_owned()),
            author: None,
            narrator: None,
            asin: None,
            isbn: None,
            person_name: None,
            person_role: None,
            base_url: "https://example.invalid".to_owned(),
        }
    }

    fn sample_claim(entity: EntityRef) -> tanaste_core::claim::MetadataClaim {
        tanaste_core::claim::MetadataClaim {
            id: EntityUid::new(),
            entity,
            field_key: "title".to_owned(),
            value: "Dune".to_owned(),
            provider_name: "stub".to_owned(),
            observed_at: clock::now(),
            is_user_locked: false,
        }
    }

    #[tokio::test]
    async fn skips_disabled_and_non_matching_providers() {
        let request = sample_request();
        let claim = sample_claim(request.entity);
        let providers = vec![
            RegisteredProvider {
                config: ProviderConfig {
                    name: "disabled".to_owned(),
                    enabled: false,
                    default_weight: 1.0,
                    field_weights: Default::default(),
                    domain: ProviderDomain::Universal,
                    capability_tags: vec![],
                    base_url: String::new(),
                },
                adapter: Arc::new(StubAdapter { name: "disabled", claims: vec![claim.clone()] }),
            },
            RegisteredProvider {
                config: ProviderConfig {
                    name: "wrong-domain".to_owned(),
                    enabled: true,
                    default_weight: 1.0,
                    field_weights: Default::default(),
                    domain: ProviderDomain::Audiobook,
                    capability_tags: vec![],
                    base_url: String::new(),
                },
                adapter: Arc::new(StubAdapter { name: "wrong-domain", claims: vec![claim.clone()] }),
            },
            RegisteredProvider {
                config: ProviderConfig {
                    name: "stub".to_owned(),
                    enabled: true,
                    default_weight: 1.0,
                    field_weights: Default::default(),
                    domain: ProviderDomain::Universal,
                    capability_tags: vec![],
                    base_url: String::new(),
                },
                adapter: Arc::new(StubAdapter { name: "stub", claims: vec![claim] }),
            },
        ];
        let harvester = ProviderHarvester::new(providers, HarvesterConfig::default());

        let claims = harvester.harvest(&request).await;

        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].provider_name, "stub");
    }

    #[tokio::test]
    async fn a_hanging_adapter_times_out_without_blocking_the_rest() {
        let request = sample_request();
        let claim = sample_claim(request.entity);
        let providers = vec![
            RegisteredProvider {
                config: ProviderConfig {
                    name: "hanging".to_owned(),
                    enabled: true,
                    default_weight: 1.0,
                    field_weights: Default::default(),
                    domain: ProviderDomain::Universal,
                    capability_tags: vec![],
                    base_url: String::new(),
                },
                adapter: Arc::new(HangingAdapter),
            },
            RegisteredProvider {
                config: ProviderConfig {
                    name: "stub".to_owned(),
                    enabled: true,
                    default_weight: 1.0,
                    field_weights: Default::default(),
                    domain: ProviderDomain::Universal,
                    capability_tags: vec![],
                    base_url: String::new(),
                },
                adapter: Arc::new(StubAdapter { name: "stub", claims: vec![claim] }),
            },
        ];
        let harvester = ProviderHarvester::new(
            providers,
            HarvesterConfig { adapter_timeout: Duration::from_millis(50), ..HarvesterConfig::default() },
        );

        let claims = tokio::time::timeout(Duration::from_secs(5), harvester.harvest(&request)).await.unwrap();

        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].provider_name, "stub");
    }
}
