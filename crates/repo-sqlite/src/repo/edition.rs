// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::edition::Edition;
use tanaste_core::entity::EntityUid;
use tanaste_core::util::Timestamp;
use tanaste_repo::edition::{EditionHeader, EditionRepo};

use crate::prelude::*;
use crate::schema::editions;
use crate::util::{entity_uid_to_text, millis_to_timestamp, text_to_entity_uid, timestamp_to_millis};

#[derive(Queryable)]
struct QueryableRecord {
    row_id: i64,
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    work_uid: String,
    format: String,
    edition_label: String,
}

impl TryFrom<QueryableRecord> for (EditionHeader, Edition) {
    type Error = anyhow::Error;

    fn try_from(from: QueryableRecord) -> anyhow::Result<Self> {
        let header = EditionHeader {
            id: from.row_id,
            created_at: millis_to_timestamp(from.row_created_ms),
            updated_at: millis_to_timestamp(from.row_updated_ms),
        };
        let edition = Edition {
            id: text_to_entity_uid(&from.entity_uid)?,
            work_id: text_to_entity_uid(&from.work_uid)?,
            format: from.format,
            edition_label: from.edition_label,
        };
        Ok((header, edition))
    }
}

#[derive(Insertable)]
#[diesel(table_name = editions)]
struct InsertableRecord {
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    work_uid: String,
    format: String,
    edition_label: String,
}

impl InsertableRecord {
    fn bind(header: &EditionHeader, edition: &Edition) -> Self {
        Self {
            row_created_ms: timestamp_to_millis(header.created_at),
            row_updated_ms: timestamp_to_millis(header.updated_at),
            entity_uid: entity_uid_to_text(edition.id),
            work_uid: entity_uid_to_text(edition.work_id),
            format: edition.format.clone(),
            edition_label: edition.edition_label.clone(),
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = editions)]
struct UpdatableRecord {
    row_updated_ms: i64,
    format: String,
    edition_label: String,
}

impl UpdatableRecord {
    fn bind(updated_at: Timestamp, edition: &Edition) -> Self {
        Self {
            row_updated_ms: timestamp_to_millis(updated_at),
            format: edition.format.clone(),
            edition_label: edition.edition_label.clone(),
        }
    }
}

impl EditionRepo for Connection<'_> {
    fn insert_edition(&mut self, header: EditionHeader, edition: &Edition) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(&header, edition);
        diesel::insert_into(editions::table)
            .values(&insertable)
            .returning(editions::row_id)
            .get_result(self.as_mut())
            .map_err(repo_error)
    }

    fn update_edition(&mut self, id: RecordId, updated_at: Timestamp, edition: &Edition) -> RepoResult<()> {
        let updatable = UpdatableRecord::bind(updated_at, edition);
        diesel::update(editions::table.filter(editions::row_id.eq(id)))
            .set(&updatable)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }

    fn load_edition(&mut self, id: &EntityUid) -> RepoResult<(EditionHeader, Edition)> {
        editions::table
            .filter(editions::entity_uid.eq(entity_uid_to_text(*id)))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .try_into()
            .map_err(RepoError::Other)
    }

    fn load_editions_for_work(&mut self, work_id: &EntityUid) -> RepoResult<Vec<(EditionHeader, Edition)>> {
        editions::table
            .filter(editions::work_uid.eq(entity_uid_to_text(*work_id)))
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }

    fn list_editions(&mut self) -> RepoResult<Vec<(EditionHeader, Edition)>> {
        editions::table
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }

    fn delete_edition(&mut self, id: &EntityUid) -> RepoResult<()> {
        diesel::delete(editions::table.filter(editions::entity_uid.eq(entity_uid_to_text(*id))))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }
}
