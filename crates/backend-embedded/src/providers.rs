// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Turns the manifest's `providers` list into the concrete registry the
//! Provider Harvester (4.G) dispatches against. Adapter selection is a
//! name lookup: a manifest entry names the provider ("wikidata",
//! "audnexus") and this module resolves it to the adapter that
//! implements it, carrying the entry's tuning (weights, capability tags)
//! along as plain data per Design Note "Provider registry as data" —
//! unrecognised provider names are skipped with a warning rather than
//! failing startup, since a manifest may list providers from a future
//! release this binary doesn't ship an adapter for yet.

use std::collections::HashMap;
use std::sync::Arc;

use tanaste_core::provider::ProviderConfig;
use tanaste_core_api::config::{MasterConfig, ProviderEntry};
use tanaste_providers::adapter::ProviderAdapter;
use tanaste_providers::adapters::audnexus::AudnexusAdapter;
use tanaste_providers::adapters::wikidata::WikidataAdapter;
use tanaste_providers::fetch::ReqwestFetch;
use tanaste_providers::harvester::RegisteredProvider;

fn provider_config(entry: &ProviderEntry, base_url: Option<&String>) -> ProviderConfig {
    ProviderConfig {
        name: entry.name.clone(),
        enabled: entry.enabled,
        default_weight: entry.weight,
        field_weights: entry.field_weights.clone(),
        domain: entry.domain,
        capability_tags: entry.capability_tags.clone(),
        base_url: base_url.cloned().unwrap_or_default(),
    }
}

fn adapter_for(name: &str) -> Option<Arc<dyn ProviderAdapter>> {
    match name {
        "wikidata" => Some(Arc::new(WikidataAdapter::new(ReqwestFetch::new()))),
        "audnexus" => Some(Arc::new(AudnexusAdapter::new(ReqwestFetch::new()))),
        _ => None,
    }
}

/// Builds the harvester's provider list plus a by-name lookup of the same
/// `ProviderConfig`s, used by the scanner and the scoring engine without
/// having to thread the registered adapters through them too.
#[must_use]
pub fn registered_providers(master: &MasterConfig) -> (Vec<RegisteredProvider>, HashMap<String, ProviderConfig>) {
    let mut registered = Vec::new();
    let mut configs = HashMap::new();
    for entry in &master.providers {
        if !entry.enabled {
            continue;
        }
        let config = provider_config(entry, master.provider_endpoints.get(&entry.name));
        let Some(adapter) = adapter_for(&entry.name) else {
            tracing::warn!(provider = %entry.name, "no adapter registered for this provider name, skipping");
            continue;
        };
        configs.insert(entry.name.clone(), config.clone());
        registered.push(RegisteredProvider { config, adapter });
    }
    (registered, configs)
}
