// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! 4.F Hasher / Dedup: wait for the file to stop being written to, content-
//! address it, and look up whether a [`MediaAsset`] already owns that hash.
//!
//! The lock-wait step approximates the spec's "poll a test-open with
//! shared-read" with a plain retrying `File::open`, the same "trust cheap
//! syscalls over heavyweight OS lock APIs" choice the teacher makes in its
//! own filesystem metadata probing rather than reaching for an advisory-
//! locking crate.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tanaste_core::entity::EntityUid;
use tanaste_core::media_asset::ContentHash;
use tanaste_media_fs::digest::{sha256_content_hash, DigestError};
use tanaste_repo::media_asset::MediaAssetRepo;
use tanaste_repo::RepoResult;

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DedupConfig {
    pub lock_timeout: Duration,
    pub poll_interval: Duration,
}

impl DedupConfig {
    const fn default_lock_timeout() -> Duration {
        Duration::from_secs(30)
    }
    const fn default_poll_interval() -> Duration {
        Duration::from_millis(200)
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Self::default_lock_timeout(),
            poll_interval: Self::default_poll_interval(),
        }
    }
}

/// What the dedup step decided should happen next for an incoming file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DedupOutcome {
    /// No existing [`MediaAsset`](tanaste_core::media_asset::MediaAsset)
    /// owns this content; continue into harvest/score/arbitrate.
    New(ContentHash),
    /// A MediaAsset already owns this content at the same path; nothing to
    /// do.
    Unchanged { media_asset_id: EntityUid },
    /// A MediaAsset already owns this content at a different path; its
    /// `current_path` was updated. No re-score: the entity's identity
    /// hasn't changed, just where it lives.
    Relinked { media_asset_id: EntityUid, record_id: tanaste_repo::RecordId },
}

/// Polls `path` with a plain open-for-read until it succeeds or
/// `config.lock_timeout` elapses, on the theory that a file mid-write by
/// another process will transiently fail to open (or, on platforms that
/// allow concurrent opens regardless, will succeed immediately — the
/// common case this guards against is the writer still holding an
/// exclusive handle).
pub async fn wait_for_unlock(path: &Path, config: &DedupConfig) -> Result<()> {
    let deadline = tokio::time::Instant::now() + config.lock_timeout;
    loop {
        match std::fs::File::open(path) {
            Ok(_) => return Ok(()),
            Err(error) if tokio::time::Instant::now() >= deadline => {
                return Err(Error::Io(error));
            }
            Err(_) => {
                if tokio::time::Instant::now() >= deadline {
                    return Err(Error::LockTimeout(config.lock_timeout));
                }
                tokio::time::sleep(config.poll_interval).await;
            }
        }
    }
}

async fn hash_file(path: PathBuf, abort_flag: Arc<AtomicBool>) -> std::result::Result<ContentHash, DigestError> {
    tokio::task::spawn_blocking(move || sha256_content_hash(&path, &abort_flag))
        .await
        .expect("hashing task must not panic")
}

/// Hashes `path` and resolves the dedup decision against `repo`. Does not
/// perform any re-scoring itself; the caller (the ingestion pipeline)
/// decides what to do with [`DedupOutcome::New`].
pub async fn dedup<Repo: MediaAssetRepo>(
    repo: &mut Repo,
    path: &Path,
    abort_flag: Arc<AtomicBool>,
) -> Result<DedupOutcome> {
    let content_hash = hash_file(path.to_path_buf(), abort_flag).await?;

    let existing = repo.find_media_asset_by_content_hash(&content_hash).map_err(Error::Repository)?;
    let Some((header, mut asset)) = existing else {
        return Ok(DedupOutcome::New(content_hash));
    };

    if asset.current_path == path {
        return Ok(DedupOutcome::Unchanged { media_asset_id: asset.id });
    }

    asset.current_path = path.to_path_buf();
    relink(repo, header.id, &asset).map_err(Error::Repository)?;
    Ok(DedupOutcome::Relinked { media_asset_id: asset.id, record_id: header.id })
}

fn relink<Repo: MediaAssetRepo>(
    repo: &mut Repo,
    record_id: tanaste_repo::RecordId,
    asset: &tanaste_core::media_asset::MediaAsset,
) -> RepoResult<()> {
    repo.update_media_asset(record_id, tanaste_core::util::clock::now(), asset)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tanaste_core::media_asset::MediaType;
    use tanaste_repo::media_asset::MediaAssetHeader;
    use tanaste_repo::{RecordHeader, RepoError};

    use super::*;

    #[derive(Default)]
    struct FakeMediaAssetRepo {
        by_id: HashMap<EntityUid, tanaste_core::media_asset::MediaAsset>,
        headers: HashMap<EntityUid, MediaAssetHeader>,
        next_record_id: tanaste_repo::RecordId,
    }

    impl MediaAssetRepo for FakeMediaAssetRepo {
        fn insert_media_asset(
            &mut self,
            header: MediaAssetHeader,
            asset: &tanaste_core::media_asset::MediaAsset,
        ) -> RepoResult<tanaste_repo::RecordId> {
            self.next_record_id += 1;
            self.headers.insert(asset.id, header);
            self.by_id.insert(asset.id, asset.clone());
            Ok(self.next_record_id)
        }

        fn update_media_asset(
            &mut self,
            _id: tanaste_repo::RecordId,
            _updated_at: tanaste_core::util::Timestamp,
            asset: &tanaste_core::media_asset::MediaAsset,
        ) -> RepoResult<()> {
            self.by_id.insert(asset.id, asset.clone());
            Ok(())
        }

        fn load_media_asset(&mut self, id: &EntityUid) -> RepoResult<(MediaAssetHeader, tanaste_core::media_asset::MediaAsset)> {
            let asset = self.by_id.get(id).cloned().ok_or(RepoError::NotFound)?;
            Ok((self.headers[id], asset))
        }

        fn find_media_asset_by_content_hash(
            &mut self,
            content_hash: &ContentHash,
        ) -> RepoResult<Option<(MediaAssetHeader, tanaste_core::media_asset::MediaAsset)>> {
            Ok(self
                .by_id
                .values()
                .find(|asset| &asset.content_hash == content_hash)
                .cloned()
                .map(|asset| (self.headers[&asset.id], asset)))
        }

        fn find_media_asset_by_current_path(
            &mut self,
            current_path: &Path,
        ) -> RepoResult<Option<(MediaAssetHeader, tanaste_core::media_asset::MediaAsset)>> {
            Ok(self
                .by_id
                .values()
                .find(|asset| asset.current_path == current_path)
                .cloned()
                .map(|asset| (self.headers[&asset.id], asset)))
        }

        fn load_media_assets_for_edition(
            &mut self,
            edition_id: &EntityUid,
        ) -> RepoResult<Vec<(MediaAssetHeader, tanaste_core::media_asset::MediaAsset)>> {
            Ok(self
                .by_id
                .values()
                .filter(|asset| &asset.edition_id == edition_id)
                .cloned()
                .map(|asset| (self.headers[&asset.id], asset))
                .collect())
        }

        fn list_active_media_assets(&mut self) -> RepoResult<Vec<(MediaAssetHeader, tanaste_core::media_asset::MediaAsset)>> {
            Ok(self
                .by_id
                .values()
                .filter(|asset| !asset.retired)
                .cloned()
                .map(|asset| (self.headers[&asset.id], asset))
                .collect())
        }

        fn delete_media_asset(&mut self, id: &EntityUid) -> RepoResult<()> {
            self.by_id.remove(id);
            self.headers.remove(id);
            Ok(())
        }
    }

    fn header() -> MediaAssetHeader {
        RecordHeader { id: 1, created_at: tanaste_core::util::clock::now(), updated_at: tanaste_core::util::clock::now() }
    }

    #[tokio::test]
    async fn a_new_hash_continues_into_harvest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.epub");
        std::fs::write(&path, b"unique content").unwrap();
        let mut repo = FakeMediaAssetRepo::default();

        let outcome = dedup(&mut repo, &path, Arc::new(AtomicBool::new(false))).await.unwrap();

        assert!(matches!(outcome, DedupOutcome::New(_)));
    }

    #[tokio::test]
    async fn an_identical_hash_at_the_same_path_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.epub");
        std::fs::write(&path, b"duplicate content").unwrap();
        let abort = Arc::new(AtomicBool::new(false));
        let content_hash = hash_file(path.clone(), Arc::clone(&abort)).await.unwrap();

        let mut repo = FakeMediaAssetRepo::default();
        let asset_id = EntityUid::new();
        repo.insert_media_asset(
            header(),
            &tanaste_core::media_asset::MediaAsset {
                id: asset_id,
                edition_id: EntityUid::new(),
                content_hash,
                media_type: MediaType::Epub,
                current_path: path.clone(),
                file_size_bytes: 17,
                retired: false,
                missing_scan_count: 0,
            },
        )
        .unwrap();

        let outcome = dedup(&mut repo, &path, abort).await.unwrap();

        assert_eq!(outcome, DedupOutcome::Unchanged { media_asset_id: asset_id });
    }

    #[tokio::test]
    async fn an_identical_hash_at_a_new_path_relinks() {
        let dir = tempfile::tempdir().unwrap();
        let old_path = dir.path().join("old.epub");
        let new_path = dir.path().join("new.epub");
        std::fs::write(&old_path, b"relink content").unwrap();
        std::fs::write(&new_path, b"relink content").unwrap();
        let abort = Arc::new(AtomicBool::new(false));
        let content_hash = hash_file(old_path.clone(), Arc::clone(&abort)).await.unwrap();

        let mut repo = FakeMediaAssetRepo::default();
        let asset_id = EntityUid::new();
        repo.insert_media_asset(
            header(),
            &tanaste_core::media_asset::MediaAsset {
                id: asset_id,
                edition_id: EntityUid::new(),
                content_hash,
                media_type: MediaType::Epub,
                current_path: old_path,
                file_size_bytes: 14,
                retired: false,
                missing_scan_count: 0,
            },
        )
        .unwrap();

        let outcome = dedup(&mut repo, &new_path, abort).await.unwrap();

        assert_eq!(outcome, DedupOutcome::Relinked { media_asset_id: asset_id, record_id: 1 });
        let (_, reloaded) = repo.load_media_asset(&asset_id).unwrap();
        assert_eq!(reloaded.current_path, new_path);
    }
}
