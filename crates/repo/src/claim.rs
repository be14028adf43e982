// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::claim::{CanonicalValue, CanonicalValueKey, MetadataClaim};
use tanaste_core::entity::EntityRef;

use crate::prelude::*;

pub type ClaimHeader = RecordHeader<RecordId>;

/// `metadata_claims` is append-only (`spec.md` §6): claims are never
/// updated or superseded in place, only inserted and, rarely, deleted when
/// a provider is removed from the registry.
pub trait ClaimRepo {
    fn insert_claim(&mut self, header: ClaimHeader, claim: &MetadataClaim) -> RepoResult<RecordId>;

    fn list_claims_for_entity(&mut self, entity: &EntityRef) -> RepoResult<Vec<(ClaimHeader, MetadataClaim)>>;

    fn list_claims_for_field(
        &mut self,
        entity: &EntityRef,
        field_key: &str,
    ) -> RepoResult<Vec<(ClaimHeader, MetadataClaim)>>;

    fn delete_claims_from_provider(&mut self, entity: &EntityRef, provider_name: &str) -> RepoResult<usize>;
}

pub trait CanonicalValueRepo {
    fn upsert_canonical_value(&mut self, value: &CanonicalValue) -> RepoResult<()>;

    fn load_canonical_value(&mut self, key: &CanonicalValueKey) -> RepoResult<Option<CanonicalValue>>;

    fn list_canonical_values_for_entity(&mut self, entity: &EntityRef) -> RepoResult<Vec<CanonicalValue>>;
}
