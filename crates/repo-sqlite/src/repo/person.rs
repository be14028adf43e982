// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::entity::EntityUid;
use tanaste_core::person::{Person, PersonRole};
use tanaste_core::util::Timestamp;
use tanaste_repo::person::{PersonHeader, PersonRepo};

use crate::prelude::*;
use crate::schema::persons;
use crate::util::{entity_uid_to_text, millis_to_timestamp, text_to_entity_uid, timestamp_to_millis};

#[derive(Queryable)]
struct QueryableRecord {
    row_id: i64,
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    name: String,
    role: String,
    wikidata_qid: Option<String>,
    headshot_url: Option<String>,
    biography: Option<String>,
    enriched_at_ms: Option<i64>,
}

impl TryFrom<QueryableRecord> for (PersonHeader, Person) {
    type Error = anyhow::Error;

    fn try_from(from: QueryableRecord) -> anyhow::Result<Self> {
        let header = PersonHeader {
            id: from.row_id,
            created_at: millis_to_timestamp(from.row_created_ms),
            updated_at: millis_to_timestamp(from.row_updated_ms),
        };
        let person = Person {
            id: text_to_entity_uid(&from.entity_uid)?,
            name: from.name,
            role: from.role.parse().map_err(|_| anyhow::anyhow!("unknown person role {:?}", from.role))?,
            wikidata_qid: from.wikidata_qid,
            headshot_url: from.headshot_url,
            biography: from.biography,
            created_at: millis_to_timestamp(from.row_created_ms),
            enriched_at: from.enriched_at_ms.map(millis_to_timestamp),
        };
        Ok((header, person))
    }
}

#[derive(Insertable)]
#[diesel(table_name = persons)]
struct InsertableRecord {
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    name: String,
    role: String,
    wikidata_qid: Option<String>,
    headshot_url: Option<String>,
    biography: Option<String>,
    enriched_at_ms: Option<i64>,
}

impl InsertableRecord {
    fn bind(header: &PersonHeader, person: &Person) -> Self {
        Self {
            row_created_ms: timestamp_to_millis(header.created_at),
            row_updated_ms: timestamp_to_millis(header.updated_at),
            entity_uid: entity_uid_to_text(person.id),
            name: person.name.clone(),
            role: person.role.to_string(),
            wikidata_qid: person.wikidata_qid.clone(),
            headshot_url: person.headshot_url.clone(),
            biography: person.biography.clone(),
            enriched_at_ms: person.enriched_at.map(timestamp_to_millis),
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = persons)]
struct UpdatableRecord {
    row_updated_ms: i64,
    name: String,
    role: String,
    wikidata_qid: Option<String>,
    headshot_url: Option<String>,
    biography: Option<String>,
    enriched_at_ms: Option<i64>,
}

impl UpdatableRecord {
    fn bind(updated_at: Timestamp, person: &Person) -> Self {
        Self {
            row_updated_ms: timestamp_to_millis(updated_at),
            name: person.name.clone(),
            role: person.role.to_string(),
            wikidata_qid: person.wikidata_qid.clone(),
            headshot_url: person.headshot_url.clone(),
            biography: person.biography.clone(),
            enriched_at_ms: person.enriched_at.map(timestamp_to_millis),
        }
    }
}

impl PersonRepo for Connection<'_> {
    fn insert_person(&mut self, header: PersonHeader, person: &Person) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(&header, person);
        diesel::insert_into(persons::table)
            .values(&insertable)
            .returning(persons::row_id)
            .get_result(self.as_mut())
            .map_err(repo_error)
    }

    fn update_person(&mut self, id: RecordId, updated_at: Timestamp, person: &Person) -> RepoResult<()> {
        let updatable = UpdatableRecord::bind(updated_at, person);
        diesel::update(persons::table.filter(persons::row_id.eq(id)))
            .set(&updatable)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }

    fn load_person(&mut self, id: &EntityUid) -> RepoResult<(PersonHeader, Person)> {
        persons::table
            .filter(persons::entity_uid.eq(entity_uid_to_text(*id)))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .try_into()
            .map_err(RepoError::Other)
    }

    fn find_person_by_name_and_role(
        &mut self,
        name: &str,
        role: PersonRole,
    ) -> RepoResult<Option<(PersonHeader, Person)>> {
        persons::table
            .filter(persons::name.eq(name))
            .filter(persons::role.eq(role.to_string()))
            .first::<QueryableRecord>(self.as_mut())
            .optional()
            .map_err(repo_error)?
            .map(TryInto::try_into)
            .transpose()
            .map_err(RepoError::Other)
    }

    fn list_persons_needing_enrichment(&mut self) -> RepoResult<Vec<(PersonHeader, Person)>> {
        persons::table
            .filter(persons::enriched_at_ms.is_null())
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }
}
