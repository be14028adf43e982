// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One provider's assertion about one `(entity, field)` pair, and the
//! scored winner derived from a set of such assertions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Well-known field keys. Kept as plain `String` in [`MetadataClaim`] (new
/// providers may assert fields this workspace doesn't know about yet) but
/// exposed here as constants so call sites don't hand-type typo-prone
/// string literals.
pub mod field_key {
    pub const TITLE: &str = "title";
    pub const AUTHOR: &str = "author";
    pub const NARRATOR: &str = "narrator";
    pub const RELEASE_YEAR: &str = "release_year";
    pub const COVER: &str = "cover";
    pub const ISBN: &str = "isbn";
    pub const ASIN: &str = "asin";
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetadataClaim {
    pub id: EntityUid,
    pub entity: EntityRef,
    pub field_key: String,
    pub value: String,
    pub provider_name: String,
    pub observed_at: Timestamp,
    pub is_user_locked: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MetadataClaimInvalidity {
    FieldKeyEmpty,
    ValueEmpty,
    ProviderNameEmpty,
}

impl Validate for MetadataClaim {
    type Invalidity = MetadataClaimInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                self.field_key.trim().is_empty(),
                Self::Invalidity::FieldKeyEmpty,
            )
            .invalidate_if(self.value.trim().is_empty(), Self::Invalidity::ValueEmpty)
            .invalidate_if(
                self.provider_name.trim().is_empty(),
                Self::Invalidity::ProviderNameEmpty,
            )
            .into()
    }
}

/// The composite key `(entity_id, field_key)` identifying one canonical
/// value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanonicalValueKey {
    pub entity: EntityRef,
    pub field_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanonicalValue {
    pub key: CanonicalValueKey,
    pub value: String,
    pub last_scored_at: Timestamp,
    pub is_conflicted: bool,
}
