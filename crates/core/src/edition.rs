// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One published form of a [`Work`](crate::work::Work), e.g. "Hardback 1st
//! ed.". Owns 1..N [`MediaAsset`](crate::media_asset::MediaAsset)s.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edition {
    pub id: EntityUid,
    pub work_id: EntityUid,
    pub format: String,
    pub edition_label: String,
}
