// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::entity::EntityUid;
use tanaste_core::person::{Person, PersonRole};
use tanaste_core::util::Timestamp;

use crate::prelude::*;

pub type PersonHeader = RecordHeader<RecordId>;

pub trait PersonRepo {
    fn insert_person(&mut self, header: PersonHeader, person: &Person) -> RepoResult<RecordId>;

    fn update_person(&mut self, id: RecordId, updated_at: Timestamp, person: &Person) -> RepoResult<()>;

    fn load_person(&mut self, id: &EntityUid) -> RepoResult<(PersonHeader, Person)>;

    fn find_person_by_name_and_role(
        &mut self,
        name: &str,
        role: PersonRole,
    ) -> RepoResult<Option<(PersonHeader, Person)>>;

    fn list_persons_needing_enrichment(&mut self) -> RepoResult<Vec<(PersonHeader, Person)>>;
}
