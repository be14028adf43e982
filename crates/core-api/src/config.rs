// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! `tanaste_master.json`, the configuration manifest read once at startup
//! (`spec.md` §6). Deliberately does not `deny_unknown_fields`: forward
//! compatibility with newer manifests is preferred, matching the teacher's
//! own permissive config deserialization.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use tanaste_core::provider::ProviderDomain;

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    pub version: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub weight: f64,
    pub domain: ProviderDomain,
    #[serde(default)]
    pub capability_tags: Vec<String>,
    #[serde(default)]
    pub field_weights: BTreeMap<String, f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "ScoringConfig::default_auto_link_threshold")]
    pub auto_link_threshold: f64,
    #[serde(default = "ScoringConfig::default_conflict_threshold")]
    pub conflict_threshold: f64,
    #[serde(default = "ScoringConfig::default_conflict_epsilon")]
    pub conflict_epsilon: f64,
    #[serde(default = "ScoringConfig::default_stale_claim_decay_days")]
    pub stale_claim_decay_days: u32,
    #[serde(default = "ScoringConfig::default_stale_claim_decay_factor")]
    pub stale_claim_decay_factor: f64,
    /// Global fallback weight used when neither a per-field nor a
    /// per-provider default weight is configured (Open Question #1).
    #[serde(default = "ScoringConfig::default_default_provider_weight")]
    pub default_provider_weight: f64,
}

impl ScoringConfig {
    const fn default_auto_link_threshold() -> f64 {
        0.85
    }
    const fn default_conflict_threshold() -> f64 {
        0.60
    }
    const fn default_conflict_epsilon() -> f64 {
        0.05
    }
    const fn default_stale_claim_decay_days() -> u32 {
        90
    }
    const fn default_stale_claim_decay_factor() -> f64 {
        0.8
    }
    const fn default_default_provider_weight() -> f64 {
        1.0
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            auto_link_threshold: Self::default_auto_link_threshold(),
            conflict_threshold: Self::default_conflict_threshold(),
            conflict_epsilon: Self::default_conflict_epsilon(),
            stale_claim_decay_days: Self::default_stale_claim_decay_days(),
            stale_claim_decay_factor: Self::default_stale_claim_decay_factor(),
            default_provider_weight: Self::default_default_provider_weight(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    #[serde(default = "MaintenanceConfig::default_max_transaction_log_entries")]
    pub max_transaction_log_entries: u64,
    #[serde(default)]
    pub vacuum_on_startup: bool,
}

impl MaintenanceConfig {
    const fn default_max_transaction_log_entries() -> u64 {
        10_000
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            max_transaction_log_entries: Self::default_max_transaction_log_entries(),
            vacuum_on_startup: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MasterConfig {
    pub schema_version: u32,
    pub database_path: PathBuf,
    pub data_root: PathBuf,
    pub watch_directory: PathBuf,
    pub library_root: PathBuf,
    pub organization_template: String,
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub provider_endpoints: BTreeMap<String, String>,
    /// Gates the File Organizer's moves (`spec.md` §4.C "Guard"). Absent
    /// from the manifest field list in `spec.md` §6 — defaulting to
    /// `false` keeps a manifest with no opinion on the matter fail-closed,
    /// matching `OrganizerPolicy::default()`.
    #[serde(default)]
    pub auto_organize: bool,
    /// Gates the File Organizer's sidecar/tag write-back, same
    /// fail-closed default as `auto_organize`.
    #[serde(default)]
    pub write_back: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read manifest at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("manifest field {field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl MasterConfig {
    /// Loads and validates the manifest at `path`, resolving every path
    /// field relative to the manifest's own directory. Fails fast (no
    /// partial start) per `spec.md` §7.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.database_path = base.join(&config.database_path);
        config.data_root = base.join(&config.data_root);
        config.watch_directory = base.join(&config.watch_directory);
        config.library_root = base.join(&config.library_root);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.organization_template.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "organization_template",
                reason: "must not be empty".to_owned(),
            });
        }
        for provider in &self.providers {
            if !(0.0..=1.0).contains(&provider.weight) {
                return Err(ConfigError::Invalid {
                    field: "providers[].weight",
                    reason: format!("{} is outside [0, 1]", provider.weight),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_minimal_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("tanaste_master.json");
        std::fs::write(
            &manifest_path,
            r#"{
                "schema_version": 1,
                "database_path": "tanaste.sqlite",
                "data_root": "data",
                "watch_directory": "watch",
                "library_root": "library",
                "organization_template": "{Category}/{HubName}"
            }"#,
        )
        .unwrap();
        let config = MasterConfig::load(&manifest_path).unwrap();
        assert_eq!(config.database_path, dir.path().join("tanaste.sqlite"));
        assert_eq!(config.scoring.auto_link_threshold, 0.85);
    }

    #[test]
    fn rejects_empty_template() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("tanaste_master.json");
        std::fs::write(
            &manifest_path,
            r#"{
                "schema_version": 1,
                "database_path": "tanaste.sqlite",
                "data_root": "data",
                "watch_directory": "watch",
                "library_root": "library",
                "organization_template": ""
            }"#,
        )
        .unwrap();
        assert!(matches!(
            MasterConfig::load(&manifest_path),
            Err(ConfigError::Invalid { field: "organization_template", .. })
        ));
    }
}
