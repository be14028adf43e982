// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::{Path, PathBuf};

use tanaste_core::entity::EntityUid;
use tanaste_core::media_asset::{ContentHash, MediaAsset};
use tanaste_core::util::Timestamp;
use tanaste_repo::media_asset::{MediaAssetHeader, MediaAssetRepo};

use crate::prelude::*;
use crate::schema::media_assets;
use crate::util::{entity_uid_to_text, millis_to_timestamp, text_to_entity_uid, timestamp_to_millis};

#[derive(Queryable)]
struct QueryableRecord {
    row_id: i64,
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    edition_uid: String,
    content_hash: String,
    media_type: String,
    current_path: String,
    file_size_bytes: i64,
    retired: bool,
    missing_scan_count: i32,
}

impl TryFrom<QueryableRecord> for (MediaAssetHeader, MediaAsset) {
    type Error = anyhow::Error;

    fn try_from(from: QueryableRecord) -> anyhow::Result<Self> {
        let header = MediaAssetHeader {
            id: from.row_id,
            created_at: millis_to_timestamp(from.row_created_ms),
            updated_at: millis_to_timestamp(from.row_updated_ms),
        };
        let asset = MediaAsset {
            id: text_to_entity_uid(&from.entity_uid)?,
            edition_id: text_to_entity_uid(&from.edition_uid)?,
            content_hash: ContentHash::new(from.content_hash)
                .ok_or_else(|| anyhow::anyhow!("stored content hash is no longer well-formed"))?,
            media_type: from.media_type.parse().unwrap_or_default(),
            current_path: PathBuf::from(from.current_path),
            file_size_bytes: from.file_size_bytes.try_into().unwrap_or(0),
            retired: from.retired,
            missing_scan_count: from.missing_scan_count.try_into().unwrap_or(0),
        };
        Ok((header, asset))
    }
}

#[derive(Insertable)]
#[diesel(table_name = media_assets)]
struct Record {
    row_created_ms: i64,
    row_updated_ms: i64,
    entity_uid: String,
    edition_uid: String,
    content_hash: String,
    media_type: String,
    current_path: String,
    file_size_bytes: i64,
    retired: bool,
    missing_scan_count: i32,
}

impl Record {
    fn bind(created_at: Timestamp, updated_at: Timestamp, asset: &MediaAsset) -> Self {
        Self {
            row_created_ms: timestamp_to_millis(created_at),
            row_updated_ms: timestamp_to_millis(updated_at),
            entity_uid: entity_uid_to_text(asset.id),
            edition_uid: entity_uid_to_text(asset.edition_id),
            content_hash: asset.content_hash.as_str().to_owned(),
            media_type: asset.media_type.to_string(),
            current_path: asset.current_path.to_string_lossy().into_owned(),
            file_size_bytes: asset.file_size_bytes.try_into().unwrap_or(i64::MAX),
            retired: asset.retired,
            missing_scan_count: asset.missing_scan_count.try_into().unwrap_or(i32::MAX),
        }
    }
}

impl MediaAssetRepo for Connection<'_> {
    fn insert_media_asset(&mut self, header: MediaAssetHeader, asset: &MediaAsset) -> RepoResult<RecordId> {
        let record = Record::bind(header.created_at, header.updated_at, asset);
        diesel::insert_into(media_assets::table)
            .values(&record)
            .returning(media_assets::row_id)
            .get_result(self.as_mut())
            .map_err(repo_error)
    }

    fn update_media_asset(&mut self, id: RecordId, updated_at: Timestamp, asset: &MediaAsset) -> RepoResult<()> {
        diesel::update(media_assets::table.filter(media_assets::row_id.eq(id)))
            .set((
                media_assets::row_updated_ms.eq(timestamp_to_millis(updated_at)),
                media_assets::content_hash.eq(asset.content_hash.as_str().to_owned()),
                media_assets::media_type.eq(asset.media_type.to_string()),
                media_assets::current_path.eq(asset.current_path.to_string_lossy().into_owned()),
                media_assets::file_size_bytes.eq(i64::try_from(asset.file_size_bytes).unwrap_or(i64::MAX)),
                media_assets::retired.eq(asset.retired),
                media_assets::missing_scan_count.eq(i32::try_from(asset.missing_scan_count).unwrap_or(i32::MAX)),
            ))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }

    fn load_media_asset(&mut self, id: &EntityUid) -> RepoResult<(MediaAssetHeader, MediaAsset)> {
        media_assets::table
            .filter(media_assets::entity_uid.eq(entity_uid_to_text(*id)))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .try_into()
            .map_err(RepoError::Other)
    }

    fn find_media_asset_by_content_hash(
        &mut self,
        content_hash: &ContentHash,
    ) -> RepoResult<Option<(MediaAssetHeader, MediaAsset)>> {
        media_assets::table
            .filter(media_assets::content_hash.eq(content_hash.as_str()))
            .first::<QueryableRecord>(self.as_mut())
            .optional()
            .map_err(repo_error)?
            .map(TryInto::try_into)
            .transpose()
            .map_err(RepoError::Other)
    }

    fn find_media_asset_by_current_path(
        &mut self,
        current_path: &Path,
    ) -> RepoResult<Option<(MediaAssetHeader, MediaAsset)>> {
        media_assets::table
            .filter(media_assets::current_path.eq(current_path.to_string_lossy().as_ref()))
            .first::<QueryableRecord>(self.as_mut())
            .optional()
            .map_err(repo_error)?
            .map(TryInto::try_into)
            .transpose()
            .map_err(RepoError::Other)
    }

    fn load_media_assets_for_edition(
        &mut self,
        edition_id: &EntityUid,
    ) -> RepoResult<Vec<(MediaAssetHeader, MediaAsset)>> {
        media_assets::table
            .filter(media_assets::edition_uid.eq(entity_uid_to_text(*edition_id)))
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }

    fn list_active_media_assets(&mut self) -> RepoResult<Vec<(MediaAssetHeader, MediaAsset)>> {
        media_assets::table
            .filter(media_assets::retired.eq(false))
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }

    fn delete_media_asset(&mut self, id: &EntityUid) -> RepoResult<()> {
        diesel::delete(media_assets::table.filter(media_assets::entity_uid.eq(entity_uid_to_text(*id))))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }
}
