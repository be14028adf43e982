// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::BTreeMap;

use tanaste_core::provider::ProviderConfig;
use tanaste_repo::provider_config::ProviderConfigRepo;

use crate::prelude::*;
use crate::schema::provider_config;

#[derive(Queryable, Insertable)]
#[diesel(table_name = provider_config)]
struct Record {
    name: String,
    enabled: bool,
    default_weight: f64,
    field_weights: String,
    domain: String,
    capability_tags: String,
    base_url: String,
}

impl TryFrom<Record> for ProviderConfig {
    type Error = anyhow::Error;

    fn try_from(from: Record) -> anyhow::Result<Self> {
        let field_weights: BTreeMap<String, f64> = serde_json::from_str(&from.field_weights)?;
        let capability_tags: Vec<String> = serde_json::from_str(&from.capability_tags)?;
        Ok(ProviderConfig {
            name: from.name,
            enabled: from.enabled,
            default_weight: from.default_weight,
            field_weights,
            domain: from.domain.parse().map_err(|_| anyhow::anyhow!("unknown provider domain {:?}", from.domain))?,
            capability_tags,
            base_url: from.base_url,
        })
    }
}

impl Record {
    fn bind(config: &ProviderConfig) -> anyhow::Result<Self> {
        Ok(Self {
            name: config.name.clone(),
            enabled: config.enabled,
            default_weight: config.default_weight,
            field_weights: serde_json::to_string(&config.field_weights)?,
            domain: config.domain.to_string(),
            capability_tags: serde_json::to_string(&config.capability_tags)?,
            base_url: config.base_url.clone(),
        })
    }
}

impl ProviderConfigRepo for Connection<'_> {
    fn upsert_provider_config(&mut self, config: &ProviderConfig) -> RepoResult<()> {
        let record = Record::bind(config).map_err(RepoError::Other)?;
        diesel::insert_into(provider_config::table)
            .values(&record)
            .on_conflict(provider_config::name)
            .do_update()
            .set((
                provider_config::enabled.eq(&record.enabled),
                provider_config::default_weight.eq(record.default_weight),
                provider_config::field_weights.eq(&record.field_weights),
                provider_config::domain.eq(&record.domain),
                provider_config::capability_tags.eq(&record.capability_tags),
                provider_config::base_url.eq(&record.base_url),
            ))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }

    fn load_provider_config(&mut self, name: &str) -> RepoResult<Option<ProviderConfig>> {
        provider_config::table
            .filter(provider_config::name.eq(name))
            .first::<Record>(self.as_mut())
            .optional()
            .map_err(repo_error)?
            .map(TryInto::try_into)
            .transpose()
            .map_err(RepoError::Other)
    }

    fn list_provider_configs(&mut self) -> RepoResult<Vec<ProviderConfig>> {
        provider_config::table
            .load::<Record>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }
}
