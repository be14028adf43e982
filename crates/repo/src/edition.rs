// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::edition::Edition;
use tanaste_core::entity::EntityUid;
use tanaste_core::util::Timestamp;

use crate::prelude::*;

pub type EditionHeader = RecordHeader<RecordId>;

pub trait EditionRepo {
    fn insert_edition(&mut self, header: EditionHeader, edition: &Edition) -> RepoResult<RecordId>;

    fn update_edition(&mut self, id: RecordId, updated_at: Timestamp, edition: &Edition) -> RepoResult<()>;

    fn load_edition(&mut self, id: &EntityUid) -> RepoResult<(EditionHeader, Edition)>;

    fn load_editions_for_work(&mut self, work_id: &EntityUid) -> RepoResult<Vec<(EditionHeader, Edition)>>;

    fn list_editions(&mut self) -> RepoResult<Vec<(EditionHeader, Edition)>>;

    fn delete_edition(&mut self, id: &EntityUid) -> RepoResult<()>;
}
