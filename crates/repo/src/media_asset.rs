// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use tanaste_core::entity::EntityUid;
use tanaste_core::media_asset::{ContentHash, MediaAsset};
use tanaste_core::util::Timestamp;

use crate::prelude::*;

pub type MediaAssetHeader = RecordHeader<RecordId>;

pub trait MediaAssetRepo {
    fn insert_media_asset(&mut self, header: MediaAssetHeader, asset: &MediaAsset) -> RepoResult<RecordId>;

    fn update_media_asset(&mut self, id: RecordId, updated_at: Timestamp, asset: &MediaAsset) -> RepoResult<()>;

    fn load_media_asset(&mut self, id: &EntityUid) -> RepoResult<(MediaAssetHeader, MediaAsset)>;

    /// Used by the Deduplicator (`spec.md` §4.F) to decide whether an
    /// incoming file's content hash is already known.
    fn find_media_asset_by_content_hash(
        &mut self,
        content_hash: &ContentHash,
    ) -> RepoResult<Option<(MediaAssetHeader, MediaAsset)>>;

    fn find_media_asset_by_current_path(
        &mut self,
        current_path: &Path,
    ) -> RepoResult<Option<(MediaAssetHeader, MediaAsset)>>;

    fn load_media_assets_for_edition(
        &mut self,
        edition_id: &EntityUid,
    ) -> RepoResult<Vec<(MediaAssetHeader, MediaAsset)>>;

    /// All non-retired assets, for the Great Inhale Scanner and the Folder
    /// Health Monitor to cross-reference against what's actually on disk.
    fn list_active_media_assets(&mut self) -> RepoResult<Vec<(MediaAssetHeader, MediaAsset)>>;

    fn delete_media_asset(&mut self, id: &EntityUid) -> RepoResult<()>;
}
