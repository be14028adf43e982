// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::entity::EntityUid;
use tanaste_core::work::Work;
use tanaste_repo::work::{WorkHeader, WorkRepo};

use crate::prelude::*;
use crate::schema::works;
use crate::util::{entity_uid_to_text, millis_to_timestamp, text_to_entity_uid, timestamp_to_millis};

#[derive(Queryable)]
struct QueryableRecord {
    row_id: i64,
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    hub_uid: String,
}

impl TryFrom<QueryableRecord> for (WorkHeader, Work) {
    type Error = anyhow::Error;

    fn try_from(from: QueryableRecord) -> anyhow::Result<Self> {
        let header = WorkHeader {
            id: from.row_id,
            created_at: millis_to_timestamp(from.row_created_ms),
            updated_at: millis_to_timestamp(from.row_updated_ms),
        };
        let work = Work {
            id: text_to_entity_uid(&from.entity_uid)?,
            hub_id: text_to_entity_uid(&from.hub_uid)?,
        };
        Ok((header, work))
    }
}

#[derive(Insertable)]
#[diesel(table_name = works)]
struct InsertableRecord {
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    hub_uid: String,
}

impl InsertableRecord {
    fn bind(header: &WorkHeader, work: &Work) -> Self {
        Self {
            row_created_ms: timestamp_to_millis(header.created_at),
            row_updated_ms: timestamp_to_millis(header.updated_at),
            entity_uid: entity_uid_to_text(work.id),
            hub_uid: entity_uid_to_text(work.hub_id),
        }
    }
}

impl WorkRepo for Connection<'_> {
    fn insert_work(&mut self, header: WorkHeader, work: &Work) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(&header, work);
        diesel::insert_into(works::table)
            .values(&insertable)
            .returning(works::row_id)
            .get_result(self.as_mut())
            .map_err(repo_error)
    }

    fn load_work(&mut self, id: &EntityUid) -> RepoResult<(WorkHeader, Work)> {
        works::table
            .filter(works::entity_uid.eq(entity_uid_to_text(*id)))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .try_into()
            .map_err(RepoError::Other)
    }

    fn load_works_for_hub(&mut self, hub_id: &EntityUid) -> RepoResult<Vec<(WorkHeader, Work)>> {
        works::table
            .filter(works::hub_uid.eq(entity_uid_to_text(*hub_id)))
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }

    fn delete_work(&mut self, id: &EntityUid) -> RepoResult<()> {
        diesel::delete(works::table.filter(works::entity_uid.eq(entity_uid_to_text(*id))))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }
}
