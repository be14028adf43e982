// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::entity::EntityUid;
use tanaste_core::hub::Hub;
use tanaste_repo::hub::{HubHeader, HubRepo};

use crate::prelude::*;
use crate::schema::hubs;
use crate::util::{entity_uid_to_text, millis_to_timestamp, text_to_entity_uid, timestamp_to_millis};

#[derive(Queryable)]
struct QueryableRecord {
    row_id: i64,
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    display_name: String,
    display_name_key: String,
    franchise: Option<String>,
    wikidata_qid: Option<String>,
}

impl TryFrom<QueryableRecord> for (HubHeader, Hub) {
    type Error = anyhow::Error;

    fn try_from(from: QueryableRecord) -> anyhow::Result<Self> {
        let QueryableRecord {
            row_id,
            row_created_ms,
            row_updated_ms,
            entity_uid,
            display_name,
            display_name_key: _,
            franchise,
            wikidata_qid,
        } = from;
        let header = HubHeader {
            id: row_id,
            created_at: millis_to_timestamp(row_created_ms),
            updated_at: millis_to_timestamp(row_updated_ms),
        };
        let hub = Hub {
            id: text_to_entity_uid(&entity_uid)?,
            display_name,
            franchise,
            wikidata_qid,
        };
        Ok((header, hub))
    }
}

#[derive(Insertable)]
#[diesel(table_name = hubs)]
struct InsertableRecord {
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    display_name: String,
    display_name_key: String,
    franchise: Option<String>,
    wikidata_qid: Option<String>,
}

impl InsertableRecord {
    fn bind(header: &HubHeader, hub: &Hub) -> Self {
        Self {
            row_created_ms: timestamp_to_millis(header.created_at),
            row_updated_ms: timestamp_to_millis(header.updated_at),
            entity_uid: entity_uid_to_text(hub.id),
            display_name: hub.display_name.clone(),
            display_name_key: hub.display_name_key(),
            franchise: hub.franchise.clone(),
            wikidata_qid: hub.wikidata_qid.clone(),
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = hubs)]
struct UpdatableRecord {
    row_updated_ms: i64,
    display_name: String,
    display_name_key: String,
    franchise: Option<String>,
    wikidata_qid: Option<String>,
}

impl UpdatableRecord {
    fn bind(updated_at: tanaste_core::util::Timestamp, hub: &Hub) -> Self {
        Self {
            row_updated_ms: timestamp_to_millis(updated_at),
            display_name: hub.display_name.clone(),
            display_name_key: hub.display_name_key(),
            franchise: hub.franchise.clone(),
            wikidata_qid: hub.wikidata_qid.clone(),
        }
    }
}

impl HubRepo for Connection<'_> {
    fn insert_hub(&mut self, header: HubHeader, hub: &Hub) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(&header, hub);
        diesel::insert_into(hubs::table)
            .values(&insertable)
            .returning(hubs::row_id)
            .get_result(self.as_mut())
            .map_err(repo_error)
    }

    fn update_hub(&mut self, id: RecordId, updated_at: tanaste_core::util::Timestamp, hub: &Hub) -> RepoResult<()> {
        let updatable = UpdatableRecord::bind(updated_at, hub);
        diesel::update(hubs::table.filter(hubs::row_id.eq(id)))
            .set(&updatable)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }

    fn load_hub(&mut self, id: &EntityUid) -> RepoResult<(HubHeader, Hub)> {
        hubs::table
            .filter(hubs::entity_uid.eq(entity_uid_to_text(*id)))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .try_into()
            .map_err(RepoError::Other)
    }

    fn find_hub_by_display_name_key(&mut self, key: &str) -> RepoResult<Option<(HubHeader, Hub)>> {
        hubs::table
            .filter(hubs::display_name_key.eq(key))
            .first::<QueryableRecord>(self.as_mut())
            .optional()
            .map_err(repo_error)?
            .map(TryInto::try_into)
            .transpose()
            .map_err(RepoError::Other)
    }

    fn list_hubs(&mut self) -> RepoResult<Vec<(HubHeader, Hub)>> {
        hubs::table
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }

    fn delete_hub(&mut self, id: &EntityUid) -> RepoResult<()> {
        diesel::delete(hubs::table.filter(hubs::entity_uid.eq(entity_uid_to_text(*id))))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }
}
