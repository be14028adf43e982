// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::claim::MetadataClaim;
use tanaste_core::entity::EntityUid;
use tanaste_core::util::clock;
use tanaste_core_api::provider_request::ProviderLookupRequest;

/// The uniform contract every provider satisfies. `fetch` must never
/// propagate an error: network failures, timeouts, non-2xx statuses and
/// unparseable responses are all the adapter's own problem to swallow,
/// returning an empty list instead (the graceful-degradation contract of
/// `spec.md` §4.G).
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, request: &ProviderLookupRequest) -> Vec<MetadataClaim>;
}

/// Builds a claim stamped against the request's entity. `observed_at` is a
/// placeholder here: [`crate::harvester::ProviderHarvester::harvest`]
/// overwrites it uniformly for every claim it aggregates, per
/// `spec.md` §4.G ("stamps `observed_at = now`").
pub(crate) fn build_claim(
    request: &ProviderLookupRequest,
    field_key: &str,
    value: String,
    provider_name: &str,
) -> MetadataClaim {
    MetadataClaim {
        id: EntityUid::new(),
        entity: request.entity,
        field_key: field_key.to_owned(),
        value,
        provider_name: provider_name.to_owned(),
        observed_at: clock::now(),
        is_user_locked: false,
    }
}
