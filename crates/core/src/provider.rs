// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-provider tuning. All provider behaviour is configuration, not code
//! (see Design Note "Provider registry as data") — adapters are pure
//! transformers over this struct plus a request.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProviderDomain {
    Universal,
    Ebook,
    Audiobook,
    Video,
}

impl ProviderDomain {
    /// Whether this provider should be consulted for the given media type's
    /// domain. `Universal` providers are always consulted.
    #[must_use]
    pub fn matches(self, media_type: crate::media_asset::MediaType) -> bool {
        use crate::media_asset::MediaType as M;
        match (self, media_type) {
            (Self::Universal, _) => true,
            (Self::Ebook, M::Epub) => true,
            (Self::Audiobook, M::Audiobook) => true,
            (Self::Video, M::Movie) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProviderConfig {
    pub name: String,
    pub enabled: bool,
    /// Fallback weight applied when no per-field weight is configured for
    /// this provider. Clamped to `[0, 1]` by the manifest loader.
    pub default_weight: f64,
    pub field_weights: BTreeMap<String, f64>,
    pub domain: ProviderDomain,
    pub capability_tags: Vec<String>,
    pub base_url: String,
}

impl ProviderConfig {
    /// Resolves the effective weight for `field_key`, falling back to this
    /// provider's default, per "Open Question" #1 in `spec.md` §9 (and
    /// further to a global default of `1.0` if even that is absent, which
    /// is the caller's responsibility since this type cannot see the
    /// scoring configuration's global default).
    #[must_use]
    pub fn field_weight(&self, field_key: &str) -> Option<f64> {
        self.field_weights
            .get(field_key)
            .copied()
            .or(Some(self.default_weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_asset::MediaType;

    #[test]
    fn universal_matches_everything() {
        assert!(ProviderDomain::Universal.matches(MediaType::Epub));
        assert!(ProviderDomain::Universal.matches(MediaType::Movie));
    }

    #[test]
    fn domain_specific_is_exclusive() {
        assert!(ProviderDomain::Audiobook.matches(MediaType::Audiobook));
        assert!(!ProviderDomain::Audiobook.matches(MediaType::Epub));
    }

    #[test]
    fn field_weight_falls_back_to_default() {
        let cfg = ProviderConfig {
            name: "prov".into(),
            enabled: true,
            default_weight: 0.5,
            field_weights: BTreeMap::new(),
            domain: ProviderDomain::Universal,
            capability_tags: vec![],
            base_url: String::new(),
        };
        assert_eq!(cfg.field_weight("title"), Some(0.5));
    }
}
