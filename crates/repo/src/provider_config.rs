// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::provider::ProviderConfig;

use crate::RepoResult;

/// Backs both the `provider_registry` and `provider_config` tables
/// (`spec.md` §6): the registry is the static catalogue of known
/// providers, `provider_config` is the mutable per-provider override a
/// profile can edit (`enabled`, `weight`, `field_weights`).
pub trait ProviderConfigRepo {
    fn upsert_provider_config(&mut self, config: &ProviderConfig) -> RepoResult<()>;

    fn load_provider_config(&mut self, name: &str) -> RepoResult<Option<ProviderConfig>>;

    fn list_provider_configs(&mut self) -> RepoResult<Vec<ProviderConfig>>;
}
