// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::entity::EntityUid;
use tanaste_core::hub::Hub;

use crate::prelude::*;

pub type HubHeader = RecordHeader<RecordId>;

pub trait HubRepo {
    fn insert_hub(&mut self, header: HubHeader, hub: &Hub) -> RepoResult<RecordId>;

    fn update_hub(&mut self, id: RecordId, updated_at: tanaste_core::util::Timestamp, hub: &Hub) -> RepoResult<()>;

    fn load_hub(&mut self, id: &EntityUid) -> RepoResult<(HubHeader, Hub)>;

    /// Looks up a hub by its lowercase `display_name` key, used by the
    /// Arbiter to find candidate hubs before falling back to similarity
    /// scoring.
    fn find_hub_by_display_name_key(&mut self, key: &str) -> RepoResult<Option<(HubHeader, Hub)>>;

    fn list_hubs(&mut self) -> RepoResult<Vec<(HubHeader, Hub)>>;

    fn delete_hub(&mut self, id: &EntityUid) -> RepoResult<()>;
}
