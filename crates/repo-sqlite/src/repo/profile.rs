// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::entity::EntityUid;
use tanaste_core::profile::Profile;
use tanaste_repo::profile::{ProfileHeader, ProfileRepo};

use crate::prelude::*;
use crate::schema::profiles;
use crate::util::{entity_uid_to_text, millis_to_timestamp, text_to_entity_uid, timestamp_to_millis};

#[derive(Queryable)]
struct QueryableRecord {
    row_id: i64,
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    display_name: String,
    role: String,
    is_seed: bool,
}

impl TryFrom<QueryableRecord> for (ProfileHeader, Profile) {
    type Error = anyhow::Error;

    fn try_from(from: QueryableRecord) -> anyhow::Result<Self> {
        let header = ProfileHeader {
            id: from.row_id,
            created_at: millis_to_timestamp(from.row_created_ms),
            updated_at: millis_to_timestamp(from.row_updated_ms),
        };
        let profile = Profile {
            id: text_to_entity_uid(&from.entity_uid)?,
            display_name: from.display_name,
            role: from.role.parse().map_err(|_| anyhow::anyhow!("unknown profile role {:?}", from.role))?,
            is_seed: from.is_seed,
        };
        Ok((header, profile))
    }
}

#[derive(Insertable)]
#[diesel(table_name = profiles)]
struct InsertableRecord {
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    display_name: String,
    role: String,
    is_seed: bool,
}

impl InsertableRecord {
    fn bind(header: &ProfileHeader, profile: &Profile) -> Self {
        Self {
            row_created_ms: timestamp_to_millis(header.created_at),
            row_updated_ms: timestamp_to_millis(header.updated_at),
            entity_uid: entity_uid_to_text(profile.id),
            display_name: profile.display_name.clone(),
            role: profile.role.to_string(),
            is_seed: profile.is_seed,
        }
    }
}

impl ProfileRepo for Connection<'_> {
    fn insert_profile(&mut self, header: ProfileHeader, profile: &Profile) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(&header, profile);
        diesel::insert_into(profiles::table)
            .values(&insertable)
            .returning(profiles::row_id)
            .get_result(self.as_mut())
            .map_err(repo_error)
    }

    fn load_profile(&mut self, id: &EntityUid) -> RepoResult<(ProfileHeader, Profile)> {
        profiles::table
            .filter(profiles::entity_uid.eq(entity_uid_to_text(*id)))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .try_into()
            .map_err(RepoError::Other)
    }

    fn find_profile_by_display_name(&mut self, display_name: &str) -> RepoResult<Option<(ProfileHeader, Profile)>> {
        profiles::table
            .filter(profiles::display_name.eq(display_name))
            .first::<QueryableRecord>(self.as_mut())
            .optional()
            .map_err(repo_error)?
            .map(TryInto::try_into)
            .transpose()
            .map_err(RepoError::Other)
    }

    fn list_profiles(&mut self) -> RepoResult<Vec<(ProfileHeader, Profile)>> {
        profiles::table
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }
}
