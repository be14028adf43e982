// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! 4.J Great Inhale Scanner: walks `library_root` recognising `tanaste.xml`
//! sidecars, upserting Hubs/Works/Editions/MediaAssets through the `Repo`
//! port traits instead of the filesystem, then re-scores every entity it
//! touched. A simplified descendant of the teacher's
//! `aoide_media_file::fs::visit` walker: the same ancestor-stack,
//! abort-flag and hidden-directory-filtering shape, stripped of its
//! generic `AncestorVisitor`/`Progress`/`Status` machinery — a scan here
//! has nothing to report beyond its own final tally.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tanaste_core::claim::{field_key, CanonicalValueKey, MetadataClaim};
use tanaste_core::edition::Edition;
use tanaste_core::entity::{EntityKind, EntityRef, EntityUid};
use tanaste_core::hub::Hub;
use tanaste_core::media_asset::{ContentHash, MediaAsset, MediaType};
use tanaste_core::provider::ProviderConfig;
use tanaste_core::util::clock;
use tanaste_core_api::config::ScoringConfig;
use tanaste_core_api::scan::LibraryScanResult;
use tanaste_media_fs::sidecar::{EditionSidecar, HubSidecar, SidecarCodec, SIDECAR_FILE_NAME};
use tanaste_repo::RecordHeader;
use tanaste_scoring::score;
use walkdir::{DirEntry, WalkDir};

use crate::repo::Repo;
use crate::{Error, Result};

const HIDDEN_DIR_NAMES: [&str; 2] = [".DS_Store", ".git"];

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_str().is_some_and(|name| HIDDEN_DIR_NAMES.contains(&name))
}

/// Walks the tree in pre-order (directories before their children, the
/// `walkdir` default), resolving a Hub's own folder before descending into
/// its editions and tracking "which hub owns the folder we're currently
/// inside" with a depth-keyed stack rather than recursion.
pub fn scan_library<R: Repo>(
    repo: &mut R,
    library_root: &Path,
    provider_configs: &HashMap<String, ProviderConfig>,
    scoring_config: &ScoringConfig,
    sidecar_codec: &SidecarCodec,
    abort_flag: Arc<AtomicBool>,
) -> Result<LibraryScanResult> {
    let mut result = LibraryScanResult::default();
    let mut touched: HashSet<EntityRef> = HashSet::new();
    let mut hub_stack: Vec<(usize, EntityUid)> = Vec::new();

    let walker = WalkDir::new(library_root).follow_links(true).min_depth(0);
    for entry in walker.into_iter().filter_entry(|entry| !is_hidden_dir(entry)) {
        if abort_flag.load(Ordering::Relaxed) {
            break;
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(%error, "skipping unreadable entry during library scan");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let depth = entry.depth();
        while hub_stack.last().is_some_and(|&(stack_depth, _)| stack_depth >= depth) {
            hub_stack.pop();
        }

        if let Some(hub_sidecar) = sidecar_codec.read_hub(entry.path()) {
            let hub_id = resolve_hub(repo, &hub_sidecar)?;
            result.hubs_seen += 1;
            touched.insert(EntityRef::new(EntityKind::Hub, hub_id));
            hub_stack.push((depth, hub_id));
        } else if let Some(edition_sidecar) = sidecar_codec.read_edition(entry.path()) {
            let Some(&(_, hub_id)) = hub_stack.last() else {
                tracing::warn!(path = %entry.path().display(), "edition sidecar has no owning hub in its ancestry, skipping");
                continue;
            };
            process_edition_folder(repo, entry.path(), hub_id, &edition_sidecar, &mut result, &mut touched)?;
        }
    }

    for entity in touched {
        rescore_entity(repo, entity, provider_configs, scoring_config)?;
    }

    Ok(result)
}

/// Looks up a Hub by the sidecar's case-insensitive display-name key,
/// inserting it if absent. Per `spec.md` §4.J step 1 the XML's values
/// always win over whatever the database currently holds.
fn resolve_hub<R: Repo>(repo: &mut R, sidecar: &HubSidecar) -> Result<EntityUid> {
    let key = sidecar.display_name.to_lowercase();
    let now = clock::now();
    if let Some((header, existing)) = repo.find_hub_by_display_name_key(&key).map_err(Error::Repository)? {
        let hub = Hub {
            id: existing.id,
            display_name: sidecar.display_name.clone(),
            franchise: sidecar.franchise.clone(),
            wikidata_qid: sidecar.wikidata_qid.clone(),
        };
        repo.update_hub(header.id, now, &hub).map_err(Error::Repository)?;
        Ok(hub.id)
    } else {
        let hub = Hub {
            id: EntityUid::new(),
            display_name: sidecar.display_name.clone(),
            franchise: sidecar.franchise.clone(),
            wikidata_qid: sidecar.wikidata_qid.clone(),
        };
        repo.insert_hub(RecordHeader { id: 0, created_at: now, updated_at: now }, &hub).map_err(Error::Repository)?;
        Ok(hub.id)
    }
}

/// The sidecar tree has no folder level dedicated to a Work — editions
/// live directly under their Hub's folder per the shipped organisation
/// template — so Work identity during restore is resolved the same way
/// [`crate::ingestion::ingest_file`] resolves Hub identity: by matching
/// the incoming title against an existing candidate's canonical value,
/// falling back to creating a new Work when nothing matches.
fn resolve_work<R: Repo>(repo: &mut R, hub_id: EntityUid, sidecar: &EditionSidecar) -> Result<EntityUid> {
    if let Some(title) = sidecar.title.as_deref() {
        let title_key = title.to_lowercase();
        for (_, work) in repo.load_works_for_hub(&hub_id).map_err(Error::Repository)? {
            let existing_title = repo
                .load_canonical_value(&CanonicalValueKey {
                    entity: EntityRef::new(EntityKind::Work, work.id),
                    field_key: field_key::TITLE.to_owned(),
                })
                .map_err(Error::Repository)?
                .map(|value| value.value.to_lowercase());
            if existing_title.as_deref() == Some(title_key.as_str()) {
                return Ok(work.id);
            }
        }
    }
    let work = tanaste_core::work::Work { id: EntityUid::new(), hub_id };
    let now = clock::now();
    repo.insert_work(RecordHeader { id: 0, created_at: now, updated_at: now }, &work).map_err(Error::Repository)?;
    Ok(work.id)
}

fn seed_claims_from_sidecar(sidecar: &EditionSidecar, entity: EntityRef) -> Vec<MetadataClaim> {
    let now = clock::now();
    let mut claims = Vec::new();
    let mut push = |key: &str, value: &Option<String>| {
        if let Some(value) = value {
            claims.push(MetadataClaim {
                id: EntityUid::new(),
                entity,
                field_key: key.to_owned(),
                value: value.clone(),
                provider_name: "sidecar-restore".to_owned(),
                observed_at: now,
                is_user_locked: false,
            });
        }
    };
    push(field_key::TITLE, &sidecar.title);
    push(field_key::AUTHOR, &sidecar.author);
    push(field_key::ISBN, &sidecar.isbn);
    push(field_key::ASIN, &sidecar.asin);
    claims
}

/// Finds the one non-sidecar, non-cover regular file in `folder`, on the
/// assumption an edition folder holds exactly one media file alongside its
/// `tanaste.xml` and cover image — the same layout the organiser produces.
fn locate_asset_file(folder: &Path, sidecar: &EditionSidecar) -> Option<PathBuf> {
    let entries = std::fs::read_dir(folder).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        if file_name == SIDECAR_FILE_NAME || file_name == sidecar.cover_path {
            continue;
        }
        return Some(path);
    }
    None
}

fn process_edition_folder<R: Repo>(
    repo: &mut R,
    folder: &Path,
    hub_id: EntityUid,
    sidecar: &EditionSidecar,
    result: &mut LibraryScanResult,
    touched: &mut HashSet<EntityRef>,
) -> Result<()> {
    result.editions_seen += 1;

    let Some(content_hash) = ContentHash::new(sidecar.content_hash.clone()) else {
        tracing::warn!(path = %folder.display(), "edition sidecar has a malformed content hash, skipping");
        return Ok(());
    };

    let existing_asset = repo.find_media_asset_by_content_hash(&content_hash).map_err(Error::Repository)?;
    let was_new = existing_asset.is_none();

    let (work_id, edition_id, mut asset) = if let Some((_, existing)) = &existing_asset {
        let (_, edition) = repo.load_edition(&existing.edition_id).map_err(Error::Repository)?;
        (edition.work_id, edition.id, existing.clone())
    } else {
        let work_id = resolve_work(repo, hub_id, sidecar)?;
        let media_type =
            sidecar.media_type.as_deref().and_then(|value| MediaType::from_str(value).ok()).unwrap_or_default();
        let now = clock::now();
        let edition = Edition { id: EntityUid::new(), work_id, format: media_type.to_string(), edition_label: String::new() };
        repo.insert_edition(RecordHeader { id: 0, created_at: now, updated_at: now }, &edition).map_err(Error::Repository)?;
        let asset = MediaAsset {
            id: EntityUid::new(),
            edition_id: edition.id,
            content_hash: content_hash.clone(),
            media_type,
            current_path: folder.to_path_buf(),
            file_size_bytes: 0,
            retired: false,
            missing_scan_count: 0,
        };
        (work_id, edition.id, asset)
    };

    match locate_asset_file(folder, sidecar) {
        Some(found_path) => {
            asset.file_size_bytes = std::fs::metadata(&found_path).map(|metadata| metadata.len()).unwrap_or(asset.file_size_bytes);
            asset.current_path = found_path;
            asset.observe_present();
        }
        None => {
            asset.observe_missing();
            result.files_missing += 1;
        }
    }

    let now = clock::now();
    if let Some((header, _)) = &existing_asset {
        repo.update_media_asset(header.id, now, &asset).map_err(Error::Repository)?;
    } else {
        repo.insert_media_asset(RecordHeader { id: 0, created_at: now, updated_at: now }, &asset).map_err(Error::Repository)?;
    }
    result.assets_seen += 1;

    let work_entity = EntityRef::new(EntityKind::Work, work_id);
    touched.insert(work_entity);
    touched.insert(EntityRef::new(EntityKind::Edition, edition_id));
    touched.insert(EntityRef::new(EntityKind::MediaAsset, asset.id));

    if was_new {
        for claim in seed_claims_from_sidecar(sidecar, work_entity) {
            let header = RecordHeader { id: 0, created_at: claim.observed_at, updated_at: claim.observed_at };
            repo.insert_claim(header, &claim).map_err(Error::Repository)?;
        }
    }

    apply_user_locks(repo, work_entity, sidecar, result)
}

fn apply_user_locks<R: Repo>(
    repo: &mut R,
    entity: EntityRef,
    sidecar: &EditionSidecar,
    result: &mut LibraryScanResult,
) -> Result<()> {
    let now = clock::now();
    for lock in &sidecar.user_locks.entries {
        let observed_at = lock.locked_at.parse().unwrap_or(now);
        let claim = MetadataClaim {
            id: EntityUid::new(),
            entity,
            field_key: lock.key.clone(),
            value: lock.value.clone(),
            provider_name: "user-lock".to_owned(),
            observed_at,
            is_user_locked: true,
        };
        let header = RecordHeader { id: 0, created_at: observed_at, updated_at: observed_at };
        repo.insert_claim(header, &claim).map_err(Error::Repository)?;
        result.user_locks_applied += 1;
    }
    Ok(())
}

/// Recomputes and upserts canonical values for `entity` from whatever
/// claims it currently owns — the same operation
/// [`crate::ingestion::ingest_file`] performs inline after inserting new
/// claims, run here as a final pass once the whole tree has been walked
/// so every touched entity reflects the restored claim set (`spec.md`
/// §4.J step 4).
fn rescore_entity<R: Repo>(
    repo: &mut R,
    entity: EntityRef,
    provider_configs: &HashMap<String, ProviderConfig>,
    scoring_config: &ScoringConfig,
) -> Result<()> {
    let claims: Vec<MetadataClaim> =
        repo.list_claims_for_entity(&entity).map_err(Error::Repository)?.into_iter().map(|(_, claim)| claim).collect();
    let now = clock::now();
    for value in score(&claims, provider_configs, scoring_config, now) {
        repo.upsert_canonical_value(&value).map_err(Error::Repository)?;
    }
    Ok(())
}
