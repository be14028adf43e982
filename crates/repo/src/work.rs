// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::entity::EntityUid;
use tanaste_core::work::Work;

use crate::prelude::*;

pub type WorkHeader = RecordHeader<RecordId>;

pub trait WorkRepo {
    fn insert_work(&mut self, header: WorkHeader, work: &Work) -> RepoResult<RecordId>;

    fn load_work(&mut self, id: &EntityUid) -> RepoResult<(WorkHeader, Work)>;

    fn load_works_for_hub(&mut self, hub_id: &EntityUid) -> RepoResult<Vec<(WorkHeader, Work)>>;

    fn delete_work(&mut self, id: &EntityUid) -> RepoResult<()>;
}
