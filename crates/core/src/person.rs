// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A creator linked to assets: author, narrator, or director.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PersonRole {
    Author,
    Narrator,
    Director,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Person {
    pub id: EntityUid,
    pub name: String,
    pub role: PersonRole,
    pub wikidata_qid: Option<String>,
    pub headshot_url: Option<String>,
    pub biography: Option<String>,
    pub created_at: Timestamp,
    pub enriched_at: Option<Timestamp>,
}
