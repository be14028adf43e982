// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One creative work (e.g. the novel "Dune"). A [`Hub`](crate::hub::Hub)
//! exposes its works by query, not by containment — see Design Note
//! "Hub <-> Work back-reference".

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Work {
    pub id: EntityUid,
    pub hub_id: EntityUid,
}
