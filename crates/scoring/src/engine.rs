// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use tanaste_core::claim::{CanonicalValue, CanonicalValueKey, MetadataClaim};
use tanaste_core::entity::EntityRef;
use tanaste_core::provider::ProviderConfig;
use tanaste_core::util::clock::Timestamp;
use tanaste_core_api::config::ScoringConfig;
use unicode_normalization::UnicodeNormalization;

/// Trims and NFC-normalises a claim value for "byte-exact after NFC
/// normalisation and trim" equality (`spec.md` §4.H step 1). Unlike the
/// Arbiter's token comparison, this deliberately does not lowercase:
/// competing claims with different capitalisation are different values.
fn normalize(value: &str) -> String {
    value.trim().nfc().collect()
}

struct Group {
    representative_value: String,
    total_weight: f64,
    most_recent_observed_at: Timestamp,
    winning_provider: String,
}

fn effective_weight(
    claim: &MetadataClaim,
    provider_configs: &HashMap<String, ProviderConfig>,
    config: &ScoringConfig,
    now: Timestamp,
) -> f64 {
    if claim.is_user_locked {
        return f64::INFINITY;
    }
    let base = provider_configs
        .get(&claim.provider_name)
        .and_then(|provider| provider.field_weight(&claim.field_key))
        .unwrap_or(config.default_provider_weight);
    let age_days = (now.as_millisecond() - claim.observed_at.as_millisecond()) as f64 / 86_400_000.0;
    if age_days > f64::from(config.stale_claim_decay_days) {
        base * config.stale_claim_decay_factor
    } else {
        base
    }
}

/// Scores one field's competing claims into its winning [`CanonicalValue`].
/// `claims` must all share the same `entity` and `field_key`.
fn score_field(
    entity: EntityRef,
    field_key: &str,
    claims: &[&MetadataClaim],
    provider_configs: &HashMap<String, ProviderConfig>,
    config: &ScoringConfig,
    now: Timestamp,
) -> CanonicalValue {
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    for claim in claims {
        let weight = effective_weight(claim, provider_configs, config, now);
        let normalized = normalize(&claim.value);
        let group = groups.entry(normalized).or_insert_with(|| Group {
            representative_value: claim.value.clone(),
            total_weight: 0.0,
            most_recent_observed_at: claim.observed_at,
            winning_provider: claim.provider_name.clone(),
        });
        group.total_weight += weight;
        let more_recent = claim.observed_at > group.most_recent_observed_at;
        let same_instant_earlier_provider =
            claim.observed_at == group.most_recent_observed_at && claim.provider_name < group.winning_provider;
        if more_recent || same_instant_earlier_provider {
            group.representative_value = claim.value.clone();
            group.most_recent_observed_at = claim.observed_at;
            group.winning_provider = claim.provider_name.clone();
        }
    }

    let total_weight: f64 = groups.values().map(|group| group.total_weight).sum();
    let mut ranked: Vec<&Group> = groups.values().collect();
    ranked.sort_by(|a, b| {
        b.total_weight
            .partial_cmp(&a.total_weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.most_recent_observed_at.cmp(&a.most_recent_observed_at))
            .then_with(|| a.winning_provider.cmp(&b.winning_provider))
    });

    let winner = ranked[0];
    let is_conflicted = if winner.total_weight.is_infinite() {
        ranked.get(1).is_some_and(|runner_up| runner_up.total_weight.is_infinite())
    } else {
        ranked.get(1).is_some_and(|runner_up| {
            let winner_share = winner.total_weight / total_weight;
            let runner_up_share = runner_up.total_weight / total_weight;
            winner_share - runner_up_share <= config.conflict_epsilon
        })
    };

    CanonicalValue {
        key: CanonicalValueKey { entity, field_key: field_key.to_owned() },
        value: winner.representative_value.clone(),
        last_scored_at: now,
        is_conflicted,
    }
}

/// Resolves competing [`MetadataClaim`]s into their winning
/// [`CanonicalValue`]s, one per distinct `field_key`. `claims` must all
/// belong to the same entity; an empty slice scores to no canonical
/// values. Zero I/O, so a fixed claim set, configuration and `now`
/// timestamp always scores to the bytewise same output.
#[must_use]
pub fn score(
    claims: &[MetadataClaim],
    provider_configs: &HashMap<String, ProviderConfig>,
    config: &ScoringConfig,
    now: Timestamp,
) -> Vec<CanonicalValue> {
    let Some(entity) = claims.first().map(|claim| claim.entity) else {
        return Vec::new();
    };

    let mut by_field: BTreeMap<&str, Vec<&MetadataClaim>> = BTreeMap::new();
    for claim in claims {
        by_field.entry(claim.field_key.as_str()).or_default().push(claim);
    }

    by_field
        .into_iter()
        .map(|(field_key, field_claims)| score_field(entity, field_key, &field_claims, provider_configs, config, now))
        .collect()
}
