// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Local user identity. Out of scope: credential-based authentication
//! (`spec.md` Non-goals) — a `Profile` is purely a role assignment.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProfileRole {
    Administrator,
    Curator,
    Viewer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Profile {
    pub id: EntityUid,
    pub display_name: String,
    pub role: ProfileRole,
    /// The seed profile is protected from deletion.
    pub is_seed: bool,
}
