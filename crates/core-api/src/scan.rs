// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The result of a Great Inhale scan (`spec.md` §4.J).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryScanResult {
    pub hubs_seen: usize,
    pub editions_seen: usize,
    pub assets_seen: usize,
    pub user_locks_applied: usize,
    pub files_missing: usize,
}

impl LibraryScanResult {
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.hubs_seen += other.hubs_seen;
        self.editions_seen += other.editions_seen;
        self.assets_seen += other.assets_seen;
        self.user_locks_applied += other.user_locks_applied;
        self.files_missing += other.files_missing;
        self
    }
}
