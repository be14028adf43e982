// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::claim::{CanonicalValue, CanonicalValueKey, MetadataClaim};
use tanaste_core::entity::{EntityKind, EntityRef};
use tanaste_repo::claim::{CanonicalValueRepo, ClaimHeader, ClaimRepo};

use crate::prelude::*;
use crate::schema::{canonical_values, metadata_claims};
use crate::util::{entity_uid_to_text, millis_to_timestamp, text_to_entity_uid, timestamp_to_millis};

fn entity_ref_from_parts(kind: &str, id: &str) -> anyhow::Result<EntityRef> {
    let kind: EntityKind = kind.parse().map_err(|_| anyhow::anyhow!("unknown entity kind {kind:?}"))?;
    Ok(EntityRef::new(kind, text_to_entity_uid(id)?))
}

#[derive(Queryable)]
struct QueryableClaim {
    row_id: i64,
    row_created_ms: i64,
    claim_uid: String,
    entity_kind: String,
    entity_id: String,
    field_key: String,
    value: String,
    provider_name: String,
    observed_at_ms: i64,
    is_user_locked: bool,
}

impl TryFrom<QueryableClaim> for (ClaimHeader, MetadataClaim) {
    type Error = anyhow::Error;

    fn try_from(from: QueryableClaim) -> anyhow::Result<Self> {
        let header = ClaimHeader {
            id: from.row_id,
            created_at: millis_to_timestamp(from.row_created_ms),
            updated_at: millis_to_timestamp(from.row_created_ms),
        };
        let claim = MetadataClaim {
            id: text_to_entity_uid(&from.claim_uid)?,
            entity: entity_ref_from_parts(&from.entity_kind, &from.entity_id)?,
            field_key: from.field_key,
            value: from.value,
            provider_name: from.provider_name,
            observed_at: millis_to_timestamp(from.observed_at_ms),
            is_user_locked: from.is_user_locked,
        };
        Ok((header, claim))
    }
}

#[derive(Insertable)]
#[diesel(table_name = metadata_claims)]
struct InsertableClaim {
    row_created_ms: i64,
    claim_uid: String,
    entity_kind: String,
    entity_id: String,
    field_key: String,
    value: String,
    provider_name: String,
    observed_at_ms: i64,
    is_user_locked: bool,
}

impl InsertableClaim {
    fn bind(header: &ClaimHeader, claim: &MetadataClaim) -> Self {
        Self {
            row_created_ms: timestamp_to_millis(header.created_at),
            claim_uid: entity_uid_to_text(claim.id),
            entity_kind: claim.entity.kind.to_string(),
            entity_id: entity_uid_to_text(claim.entity.id),
            field_key: claim.field_key.clone(),
            value: claim.value.clone(),
            provider_name: claim.provider_name.clone(),
            observed_at_ms: timestamp_to_millis(claim.observed_at),
            is_user_locked: claim.is_user_locked,
        }
    }
}

impl ClaimRepo for Connection<'_> {
    fn insert_claim(&mut self, header: ClaimHeader, claim: &MetadataClaim) -> RepoResult<RecordId> {
        let insertable = InsertableClaim::bind(&header, claim);
        diesel::insert_into(metadata_claims::table)
            .values(&insertable)
            .returning(metadata_claims::row_id)
            .get_result(self.as_mut())
            .map_err(repo_error)
    }

    fn list_claims_for_entity(&mut self, entity: &EntityRef) -> RepoResult<Vec<(ClaimHeader, MetadataClaim)>> {
        metadata_claims::table
            .filter(metadata_claims::entity_id.eq(entity_uid_to_text(entity.id)))
            .filter(metadata_claims::entity_kind.eq(entity.kind.to_string()))
            .load::<QueryableClaim>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }

    fn list_claims_for_field(
        &mut self,
        entity: &EntityRef,
        field_key: &str,
    ) -> RepoResult<Vec<(ClaimHeader, MetadataClaim)>> {
        metadata_claims::table
            .filter(metadata_claims::entity_id.eq(entity_uid_to_text(entity.id)))
            .filter(metadata_claims::entity_kind.eq(entity.kind.to_string()))
            .filter(metadata_claims::field_key.eq(field_key))
            .load::<QueryableClaim>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }

    fn delete_claims_from_provider(&mut self, entity: &EntityRef, provider_name: &str) -> RepoResult<usize> {
        diesel::delete(
            metadata_claims::table
                .filter(metadata_claims::entity_id.eq(entity_uid_to_text(entity.id)))
                .filter(metadata_claims::entity_kind.eq(entity.kind.to_string()))
                .filter(metadata_claims::provider_name.eq(provider_name)),
        )
        .execute(self.as_mut())
        .map_err(repo_error)
    }
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = canonical_values)]
struct CanonicalValueRecord {
    entity_kind: String,
    entity_id: String,
    field_key: String,
    value: String,
    last_scored_at_ms: i64,
    is_conflicted: bool,
}

impl TryFrom<CanonicalValueRecord> for CanonicalValue {
    type Error = anyhow::Error;

    fn try_from(from: CanonicalValueRecord) -> anyhow::Result<Self> {
        Ok(CanonicalValue {
            key: CanonicalValueKey {
                entity: entity_ref_from_parts(&from.entity_kind, &from.entity_id)?,
                field_key: from.field_key,
            },
            value: from.value,
            last_scored_at: millis_to_timestamp(from.last_scored_at_ms),
            is_conflicted: from.is_conflicted,
        })
    }
}

impl CanonicalValueRecord {
    fn bind(value: &CanonicalValue) -> Self {
        Self {
            entity_kind: value.key.entity.kind.to_string(),
            entity_id: entity_uid_to_text(value.key.entity.id),
            field_key: value.key.field_key.clone(),
            value: value.value.clone(),
            last_scored_at_ms: timestamp_to_millis(value.last_scored_at),
            is_conflicted: value.is_conflicted,
        }
    }
}

impl CanonicalValueRepo for Connection<'_> {
    fn upsert_canonical_value(&mut self, value: &CanonicalValue) -> RepoResult<()> {
        let record = CanonicalValueRecord::bind(value);
        diesel::insert_into(canonical_values::table)
            .values(&record)
            .on_conflict((canonical_values::entity_id, canonical_values::field_key))
            .do_update()
            .set((
                canonical_values::value.eq(&record.value),
                canonical_values::last_scored_at_ms.eq(record.last_scored_at_ms),
                canonical_values::is_conflicted.eq(record.is_conflicted),
            ))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }

    fn load_canonical_value(&mut self, key: &CanonicalValueKey) -> RepoResult<Option<CanonicalValue>> {
        canonical_values::table
            .filter(canonical_values::entity_id.eq(entity_uid_to_text(key.entity.id)))
            .filter(canonical_values::field_key.eq(&key.field_key))
            .first::<CanonicalValueRecord>(self.as_mut())
            .optional()
            .map_err(repo_error)?
            .map(TryInto::try_into)
            .transpose()
            .map_err(RepoError::Other)
    }

    fn list_canonical_values_for_entity(&mut self, entity: &EntityRef) -> RepoResult<Vec<CanonicalValue>> {
        canonical_values::table
            .filter(canonical_values::entity_id.eq(entity_uid_to_text(entity.id)))
            .filter(canonical_values::entity_kind.eq(entity.kind.to_string()))
            .load::<CanonicalValueRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }
}
