// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::entity::EntityUid;
use tanaste_core::profile::Profile;

use crate::prelude::*;

pub type ProfileHeader = RecordHeader<RecordId>;

pub trait ProfileRepo {
    fn insert_profile(&mut self, header: ProfileHeader, profile: &Profile) -> RepoResult<RecordId>;

    fn load_profile(&mut self, id: &EntityUid) -> RepoResult<(ProfileHeader, Profile)>;

    fn find_profile_by_display_name(&mut self, display_name: &str) -> RepoResult<Option<(ProfileHeader, Profile)>>;

    fn list_profiles(&mut self) -> RepoResult<Vec<(ProfileHeader, Profile)>>;
}
