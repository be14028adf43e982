// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The request a [`tanaste-providers`](../tanaste_providers/index.html)
//! adapter receives, and the provider adapter contract itself (the
//! contract's trait lives in `tanaste-providers` to avoid this crate
//! depending on an async runtime; this module only carries the data).

use serde::{Deserialize, Serialize};
use tanaste_core::entity::EntityRef;
use tanaste_core::media_asset::MediaType;
use tanaste_core::person::PersonRole;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString, Serialize, Deserialize)]
pub enum EntityType {
    Hub,
    Work,
    Edition,
    MediaAsset,
    Person,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLookupRequest {
    pub entity: EntityRef,
    pub entity_type: EntityType,
    pub media_type: MediaType,
    pub title: Option<String>,
    pub author: Option<String>,
    pub narrator: Option<String>,
    pub asin: Option<String>,
    pub isbn: Option<String>,
    pub person_name: Option<String>,
    pub person_role: Option<PersonRole>,
    pub base_url: String,
}
