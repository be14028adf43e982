// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! 4.F-4.I: dedup, harvest, score and arbitrate one incoming file, then
//! 4.C/4.B organize it and write its sidecar. Shaped like the teacher's
//! `track::import_and_replace`: a bundle of caller-supplied configuration
//! (`IngestionParams`), externally supplied extraction hints
//! (`MediaHints` — parsing embedded tags out of a file's bytes is out of
//! scope here), and one free function driving both through to an
//! [`IngestionOutcome`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tanaste_core::claim::{field_key, CanonicalValueKey, MetadataClaim};
use tanaste_core::edition::Edition;
use tanaste_core::entity::{EntityKind, EntityRef, EntityUid};
use tanaste_core::hub::Hub;
use tanaste_core::media_asset::{MediaAsset, MediaType};
use tanaste_core::provider::ProviderConfig;
use tanaste_core::util::clock;
use tanaste_core::work::Work;
use tanaste_core_api::config::ScoringConfig;
use tanaste_core_api::event::{Event, FailureReason, NotificationPublisher};
use tanaste_core_api::provider_request::{EntityType, ProviderLookupRequest};
use tanaste_media_fs::organizer::{calculate_path, execute_move, OrganizerCandidate, OrganizerPolicy, TokenRegistry};
use tanaste_media_fs::sidecar::{EditionSidecar, HubSidecar, SidecarCodec, UserLocks};
use tanaste_providers::harvester::ProviderHarvester;
use tanaste_repo::RecordHeader;
use tanaste_scoring::{decide_linkage, score, CandidateIdentity, HubCandidate, LinkageDecision};

use crate::dedup::{self, DedupConfig, DedupOutcome};
use crate::locks::EntityLockTable;
use crate::repo::Repo;
use crate::{Error, Result};

/// Extraction hints for one incoming file, produced by whatever
/// format-specific reader the watcher hands a path off to. This crate
/// treats file-format tag parsers as opaque metadata producers and never
/// opens the file itself to read them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaHints {
    pub title: Option<String>,
    pub author: Option<String>,
    pub narrator: Option<String>,
    pub isbn: Option<String>,
    pub asin: Option<String>,
    pub media_type: MediaType,
}

/// Configuration the ingestion pipeline needs beyond the collaborators
/// passed to [`ingest_file`] directly (harvester, sidecar codec, lock
/// table, token registry).
#[derive(Clone, Debug)]
pub struct IngestionParams {
    pub library_root: PathBuf,
    pub organization_template: String,
    /// Where a Hub's own `tanaste.xml` lives, independent of the edition
    /// file's own destination. Derived from `organization_template` by
    /// truncating it just before its `{Format}` token, on the assumption
    /// templates shape editions as subdirectories of their hub (the only
    /// shape `spec.md`'s own example template uses); override via
    /// [`Self::with_hub_organization_template`] if that assumption doesn't
    /// hold for a given deployment's template.
    pub hub_organization_template: String,
    pub provider_configs: HashMap<String, ProviderConfig>,
    pub scoring_config: ScoringConfig,
    pub organizer_policy: OrganizerPolicy,
    pub dedup_config: DedupConfig,
}

impl IngestionParams {
    #[must_use]
    pub fn new(
        library_root: PathBuf,
        organization_template: String,
        provider_configs: HashMap<String, ProviderConfig>,
        scoring_config: ScoringConfig,
        organizer_policy: OrganizerPolicy,
        dedup_config: DedupConfig,
    ) -> Self {
        let hub_organization_template = derive_hub_template(&organization_template);
        Self {
            library_root,
            organization_template,
            hub_organization_template,
            provider_configs,
            scoring_config,
            organizer_policy,
            dedup_config,
        }
    }

    #[must_use]
    pub fn with_hub_organization_template(mut self, template: String) -> Self {
        self.hub_organization_template = template;
        self
    }
}

fn derive_hub_template(organization_template: &str) -> String {
    match organization_template.find("{Format}") {
        Some(index) => organization_template[..index].trim_end_matches('/').to_owned(),
        None => organization_template.to_owned(),
    }
}

/// What happened to one incoming file.
#[derive(Clone, Debug, PartialEq)]
pub enum IngestionOutcome {
    Ingested { media_asset_id: EntityUid, hub_id: EntityUid, work_id: EntityUid, edition_id: EntityUid, final_path: PathBuf },
    Unchanged { media_asset_id: EntityUid },
    Relinked { media_asset_id: EntityUid },
    /// The Arbiter found a plausible-but-not-confident Hub match.
    /// Nothing is linked or written: per `spec.md` §4.I, a needs-review
    /// file is surfaced for manual resolution rather than guessed at, and
    /// since every Work must belong to a Hub (the Hub integrity
    /// invariant), no Work/Edition/MediaAsset can be created for it
    /// either. Resolving the review queue is an out-of-scope curation
    /// surface; the file simply remains un-ingested until revisited.
    NeedsReview { best_hub_id: EntityUid, score: f64 },
    Failed { reason: FailureReason },
}

fn category_for(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Epub => "Books",
        MediaType::Audiobook => "Audiobooks",
        MediaType::Movie => "Movies",
        MediaType::Unknown => "Other",
    }
}

/// Strips characters the organizer's template grammar rejects (and path
/// separators, since a title or author string is never itself a path
/// segment boundary) out of metadata before it becomes a path component.
fn sanitized(value: &str) -> String {
    value.chars().map(|c| if "<>:\"|?*\0/\\".contains(c) { '_' } else { c }).collect()
}

fn seed_claims_from_hints(hints: &MediaHints, entity: EntityRef) -> Vec<MetadataClaim> {
    let now = clock::now();
    let mut claims = Vec::new();
    let mut push = |field_key: &str, value: &Option<String>| {
        if let Some(value) = value {
            claims.push(MetadataClaim {
                id: EntityUid::new(),
                entity,
                field_key: field_key.to_owned(),
                value: value.clone(),
                provider_name: "local-hint".to_owned(),
                observed_at: now,
                is_user_locked: false,
            });
        }
    };
    push(field_key::TITLE, &hints.title);
    push(field_key::AUTHOR, &hints.author);
    push(field_key::NARRATOR, &hints.narrator);
    push(field_key::ISBN, &hints.isbn);
    push(field_key::ASIN, &hints.asin);
    claims
}

/// Builds the Arbiter's candidate list from every existing Hub, approximating
/// each Hub's author identity from one of its Works' canonical AUTHOR value
/// (a Hub itself carries no author — it's a franchise/series-level grouping
/// — so comparing an incoming Work's title-plus-author identity against a
/// title-only Hub identity would dilute the Jaccard score with unmatched
/// author tokens on every comparison).
fn hub_candidates<R: Repo>(repo: &mut R) -> Result<Vec<HubCandidate>> {
    let mut candidates = Vec::new();
    for (_, hub) in repo.list_hubs().map_err(Error::Repository)? {
        let author = repo
            .load_works_for_hub(&hub.id)
            .map_err(Error::Repository)?
            .into_iter()
            .find_map(|(_, work)| {
                repo.load_canonical_value(&CanonicalValueKey {
                    entity: EntityRef::new(EntityKind::Work, work.id),
                    field_key: field_key::AUTHOR.to_owned(),
                })
                .ok()
                .flatten()
            })
            .map(|value| value.value);
        candidates.push(HubCandidate { hub_id: hub.id, identity: CandidateIdentity { title: hub.display_name, author, year: None } });
    }
    Ok(candidates)
}

fn hub_relative_folder(
    library_root: &Path,
    hub_template: &str,
    registry: &TokenRegistry,
    candidate: &OrganizerCandidate,
) -> Option<PathBuf> {
    calculate_path(candidate, hub_template, registry).ok().map(|relative| library_root.join(relative))
}

/// Everything `ingest_file` needs written once harvest/score/arbitrate
/// have settled on a Hub and before the organizer ever touches the
/// filesystem. Bundling these together lets a caller commit the whole
/// group as one unit instead of issuing the inserts as they're derived.
#[derive(Clone, Debug)]
pub struct IngestionBatch {
    new_hub: Option<Hub>,
    work: Work,
    claims: Vec<MetadataClaim>,
    canonical: Vec<tanaste_core::claim::CanonicalValue>,
    edition: Edition,
    asset: MediaAsset,
    now: tanaste_core::util::Timestamp,
}

/// Writes one [`IngestionBatch`] — the new Hub (if any), the Work, its
/// claims and canonical values, the Edition and the MediaAsset — and
/// returns the MediaAsset's storage-internal record id. A caller wrapping
/// this in `repo`'s own transaction primitive gets all-or-nothing
/// semantics for the whole batch; called bare (as the generic
/// [`ingest_file`] does for a `repo` with no such primitive), it simply
/// issues the writes in sequence.
pub fn commit_ingestion_batch<R: Repo>(repo: &mut R, batch: &IngestionBatch) -> Result<tanaste_repo::RecordId> {
    let IngestionBatch { new_hub, work, claims, canonical, edition, asset, now } = batch;
    let now = *now;

    if let Some(hub) = new_hub {
        repo.insert_hub(RecordHeader { id: 0, created_at: now, updated_at: now }, hub).map_err(Error::Repository)?;
    }
    repo.insert_work(RecordHeader { id: 0, created_at: now, updated_at: now }, work).map_err(Error::Repository)?;
    for claim in claims {
        let header = RecordHeader { id: 0, created_at: claim.observed_at, updated_at: claim.observed_at };
        repo.insert_claim(header, claim).map_err(Error::Repository)?;
    }
    for value in canonical {
        repo.upsert_canonical_value(value).map_err(Error::Repository)?;
    }
    repo.insert_edition(RecordHeader { id: 0, created_at: now, updated_at: now }, edition).map_err(Error::Repository)?;
    repo.insert_media_asset(RecordHeader { id: 0, created_at: now, updated_at: now }, asset).map_err(Error::Repository)
}

/// Runs one incoming file through dedup, harvest, score, arbitrate,
/// organize and sidecar. Acquires the provisional Work's (and, once
/// resolved, the Hub's) entry in `locks` for the duration, so a
/// concurrent re-score of either entity queues behind this ingestion
/// rather than racing it (`spec.md` §5).
///
/// `commit_batch` performs the Hub/Work/claims/canonical/Edition/
/// MediaAsset write sequence once it's been assembled; a caller whose
/// `repo` supports one should pass a closure that wraps
/// [`commit_ingestion_batch`] in a transaction rather than calling it
/// directly, so a crash partway through leaves no partial rows behind.
pub async fn ingest_file<R: Repo>(
    repo: &mut R,
    locks: &EntityLockTable,
    harvester: &ProviderHarvester,
    sidecar_codec: &SidecarCodec,
    notifier: &dyn NotificationPublisher,
    registry: &TokenRegistry,
    params: &IngestionParams,
    path: &Path,
    hints: MediaHints,
    abort_flag: Arc<AtomicBool>,
    commit_batch: &(dyn Fn(&mut R, &IngestionBatch) -> Result<tanaste_repo::RecordId> + Sync),
) -> Result<IngestionOutcome> {
    notifier.publish(Event::IngestionStarted { path: path.to_path_buf() });

    if dedup::wait_for_unlock(path, &params.dedup_config).await.is_err() {
        notifier.publish(Event::IngestionFailed { path: path.to_path_buf(), reason: FailureReason::LockTimeout });
        return Ok(IngestionOutcome::Failed { reason: FailureReason::LockTimeout });
    }

    let dedup_outcome = match dedup::dedup(repo, path, Arc::clone(&abort_flag)).await {
        Ok(outcome) => outcome,
        Err(Error::Media(_)) => {
            notifier.publish(Event::IngestionFailed { path: path.to_path_buf(), reason: FailureReason::Corruption });
            return Ok(IngestionOutcome::Failed { reason: FailureReason::Corruption });
        }
        Err(error) => return Err(error),
    };

    let content_hash = match dedup_outcome {
        DedupOutcome::Unchanged { media_asset_id } => {
            notifier.publish(Event::IngestionCompleted {
                path: path.to_path_buf(),
                asset_id: media_asset_id,
                reason: Some("unchanged".to_owned()),
            });
            return Ok(IngestionOutcome::Unchanged { media_asset_id });
        }
        DedupOutcome::Relinked { media_asset_id, .. } => {
            notifier.publish(Event::IngestionCompleted {
                path: path.to_path_buf(),
                asset_id: media_asset_id,
                reason: Some("duplicate_skip".to_owned()),
            });
            return Ok(IngestionOutcome::Relinked { media_asset_id });
        }
        DedupOutcome::New(content_hash) => content_hash,
    };
    notifier.publish(Event::IngestionHashed { path: path.to_path_buf(), content_hash: content_hash.to_string() });

    let file_size_bytes = std::fs::metadata(path).map(|metadata| metadata.len()).unwrap_or_default();

    // A provisional identity to harvest and score against before any Hub
    // is chosen: the Arbiter needs a scored title/author to compare
    // candidate Hubs to, and nothing is linked until it decides.
    let provisional_work_id = EntityUid::new();
    let work_ref = EntityRef::new(EntityKind::Work, provisional_work_id);
    let _work_guard = locks.lock(provisional_work_id).await;

    let request = ProviderLookupRequest {
        entity: work_ref,
        entity_type: EntityType::Work,
        media_type: hints.media_type,
        title: hints.title.clone(),
        author: hints.author.clone(),
        narrator: hints.narrator.clone(),
        asin: hints.asin.clone(),
        isbn: hints.isbn.clone(),
        person_name: None,
        person_role: None,
        base_url: String::new(),
    };
    let mut claims = harvester.harvest(&request).await;
    claims.extend(seed_claims_from_hints(&hints, work_ref));

    let now = clock::now();
    let canonical = score(&claims, &params.provider_configs, &params.scoring_config, now);
    let canonical_by_field: HashMap<&str, &str> =
        canonical.iter().map(|value| (value.key.field_key.as_str(), value.value.as_str())).collect();

    let title = canonical_by_field
        .get(field_key::TITLE)
        .copied()
        .or(hints.title.as_deref())
        .unwrap_or("Untitled")
        .to_owned();
    let author = canonical_by_field.get(field_key::AUTHOR).copied().or(hints.author.as_deref()).map(str::to_owned);
    let year = canonical_by_field.get(field_key::RELEASE_YEAR).and_then(|value| value.parse::<i32>().ok());

    let work_identity = CandidateIdentity { title: title.clone(), author: author.clone(), year };

    let candidates = hub_candidates(repo)?;

    let decision = decide_linkage(&work_identity, &candidates, &params.scoring_config);

    let (new_hub, hub_id) = match decision {
        LinkageDecision::AutoLink(hub_id) => (None, hub_id),
        LinkageDecision::NeedsReview { best_hub_id, score: similarity_score } => {
            return Ok(IngestionOutcome::NeedsReview { best_hub_id, score: similarity_score });
        }
        LinkageDecision::CreateNewHub => {
            let hub = Hub { id: EntityUid::new(), display_name: title.clone(), franchise: None, wikidata_qid: None };
            let hub_id = hub.id;
            (Some(hub), hub_id)
        }
    };
    let _hub_guard = locks.lock(hub_id).await;

    let work = Work { id: provisional_work_id, hub_id };

    let edition = Edition {
        id: EntityUid::new(),
        work_id: provisional_work_id,
        format: hints.media_type.to_string(),
        edition_label: String::new(),
    };

    let mut asset = MediaAsset {
        id: EntityUid::new(),
        edition_id: edition.id,
        content_hash: content_hash.clone(),
        media_type: hints.media_type,
        current_path: path.to_path_buf(),
        file_size_bytes,
        retired: false,
        missing_scan_count: 0,
    };

    let batch = IngestionBatch { new_hub, work, claims: claims.clone(), canonical: canonical.clone(), edition: edition.clone(), asset: asset.clone(), now };
    let asset_record_id = commit_batch(repo, &batch)?;

    let extension = path.extension().and_then(|ext| ext.to_str()).map(|ext| format!(".{ext}")).unwrap_or_default();
    let candidate = OrganizerCandidate::new()
        .with("Category", category_for(hints.media_type))
        .with("HubName", sanitized(&title))
        .with("Year", year.map(|year| year.to_string()).unwrap_or_default())
        .with("Format", hints.media_type.to_string())
        .with("Edition", edition.edition_label.clone())
        .with("Ext", extension)
        .with("Title", sanitized(&title))
        .with("Author", author.as_deref().map(sanitized).unwrap_or_default());

    let final_path = if params.organizer_policy.guard_move().is_ok() {
        let relative = calculate_path(&candidate, &params.organization_template, registry)?;
        let destination = params.library_root.join(relative);
        let moved = execute_move(path, &destination, &abort_flag).await?;
        asset.current_path = moved.clone();
        repo.update_media_asset(asset_record_id, now, &asset).map_err(Error::Repository)?;
        moved
    } else {
        path.to_path_buf()
    };

    if params.organizer_policy.guard_tag_write().is_ok() {
        let edition_folder = final_path.parent().unwrap_or_else(|| Path::new("."));
        let edition_sidecar = EditionSidecar {
            title: Some(title.clone()),
            author: author.clone(),
            media_type: Some(hints.media_type.to_string()),
            isbn: hints.isbn.clone(),
            asin: hints.asin.clone(),
            content_hash: content_hash.to_string(),
            cover_path: "cover.jpg".to_owned(),
            user_locks: UserLocks::default(),
            last_organized: now.to_string(),
        };
        sidecar_codec.write_edition(edition_folder, &edition_sidecar).await?;

        if let Some(hub_folder) =
            hub_relative_folder(&params.library_root, &params.hub_organization_template, registry, &candidate)
        {
            let hub_sidecar = HubSidecar {
                display_name: title.clone(),
                year,
                wikidata_qid: None,
                franchise: None,
                last_organized: now.to_string(),
            };
            // A hub sidecar write failure doesn't invalidate the edition
            // that was just written; the hub folder's own tanaste.xml is
            // simply left stale until the next successful write.
            let _ = sidecar_codec.write_hub(&hub_folder, &hub_sidecar).await;
        }
    }

    notifier.publish(Event::IngestionCompleted { path: final_path.clone(), asset_id: asset.id, reason: None });

    Ok(IngestionOutcome::Ingested {
        media_asset_id: asset.id,
        hub_id,
        work_id: provisional_work_id,
        edition_id: edition.id,
        final_path,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap as Map;
    use std::path::Path;

    use tanaste_core::claim::{CanonicalValue, CanonicalValueKey};
    use tanaste_core::entity::EntityRef;
    use tanaste_core::person::{Person, PersonRole};
    use tanaste_core::profile::Profile;
    use tanaste_core::provider::ProviderDomain;
    use tanaste_media_fs::organizer::OrganizerPolicy;
    use tanaste_providers::adapter::ProviderAdapter;
    use tanaste_providers::harvester::{HarvesterConfig, RegisteredProvider};
    use tanaste_repo::claim::{CanonicalValueRepo, ClaimRepo};
    use tanaste_repo::edition::{EditionHeader, EditionRepo};
    use tanaste_repo::hub::{HubHeader, HubRepo};
    use tanaste_repo::media_asset::{MediaAssetHeader, MediaAssetRepo};
    use tanaste_repo::person::PersonRepo;
    use tanaste_repo::profile::ProfileRepo;
    use tanaste_repo::provider_config::ProviderConfigRepo;
    use tanaste_repo::transaction_log::{TransactionLogEntry, TransactionLogRepo};
    use tanaste_repo::work::{WorkHeader, WorkRepo};
    use tanaste_repo::{RepoError, RepoResult};

    use super::*;

    #[derive(Default)]
    struct MemoryRepo {
        hubs: Map<EntityUid, (HubHeader, Hub)>,
        works: Map<EntityUid, (WorkHeader, Work)>,
        editions: Map<EntityUid, (EditionHeader, Edition)>,
        assets: Map<EntityUid, (MediaAssetHeader, MediaAsset)>,
        claims: Vec<MetadataClaim>,
        canonical: Map<(EntityRef, String), CanonicalValue>,
        next_id: tanaste_repo::RecordId,
    }

    impl MemoryRepo {
        fn next(&mut self) -> tanaste_repo::RecordId {
            self.next_id += 1;
            self.next_id
        }
    }

    fn header_now(id: tanaste_repo::RecordId) -> RecordHeader<tanaste_repo::RecordId> {
        RecordHeader { id, created_at: clock::now(), updated_at: clock::now() }
    }

    impl HubRepo for MemoryRepo {
        fn insert_hub(&mut self, _header: HubHeader, hub: &Hub) -> RepoResult<tanaste_repo::RecordId> {
            let id = self.next();
            self.hubs.insert(hub.id, (header_now(id), hub.clone()));
            Ok(id)
        }
        fn update_hub(&mut self, _id: tanaste_repo::RecordId, _updated_at: tanaste_core::util::Timestamp, hub: &Hub) -> RepoResult<()> {
            if let Some(entry) = self.hubs.get_mut(&hub.id) {
                entry.1 = hub.clone();
            }
            Ok(())
        }
        fn load_hub(&mut self, id: &EntityUid) -> RepoResult<(HubHeader, Hub)> {
            self.hubs.get(id).cloned().ok_or(RepoError::NotFound)
        }
        fn find_hub_by_display_name_key(&mut self, key: &str) -> RepoResult<Option<(HubHeader, Hub)>> {
            Ok(self.hubs.values().find(|(_, hub)| hub.display_name_key() == key).cloned())
        }
        fn list_hubs(&mut self) -> RepoResult<Vec<(HubHeader, Hub)>> {
            Ok(self.hubs.values().cloned().collect())
        }
        fn delete_hub(&mut self, id: &EntityUid) -> RepoResult<()> {
            self.hubs.remove(id);
            Ok(())
        }
    }

    impl WorkRepo for MemoryRepo {
        fn insert_work(&mut self, _header: WorkHeader, work: &Work) -> RepoResult<tanaste_repo::RecordId> {
            let id = self.next();
            self.works.insert(work.id, (header_now(id), work.clone()));
            Ok(id)
        }
        fn load_work(&mut self, id: &EntityUid) -> RepoResult<(WorkHeader, Work)> {
            self.works.get(id).cloned().ok_or(RepoError::NotFound)
        }
        fn load_works_for_hub(&mut self, hub_id: &EntityUid) -> RepoResult<Vec<(WorkHeader, Work)>> {
            Ok(self.works.values().filter(|(_, work)| &work.hub_id == hub_id).cloned().collect())
        }
        fn delete_work(&mut self, id: &EntityUid) -> RepoResult<()> {
            self.works.remove(id);
            Ok(())
        }
    }

    impl EditionRepo for MemoryRepo {
        fn insert_edition(&mut self, _header: EditionHeader, edition: &Edition) -> RepoResult<tanaste_repo::RecordId> {
            let id = self.next();
            self.editions.insert(edition.id, (header_now(id), edition.clone()));
            Ok(id)
        }
        fn update_edition(&mut self, _id: tanaste_repo::RecordId, _updated_at: tanaste_core::util::Timestamp, edition: &Edition) -> RepoResult<()> {
            if let Some(entry) = self.editions.get_mut(&edition.id) {
                entry.1 = edition.clone();
            }
            Ok(())
        }
        fn load_edition(&mut self, id: &EntityUid) -> RepoResult<(EditionHeader, Edition)> {
            self.editions.get(id).cloned().ok_or(RepoError::NotFound)
        }
        fn load_editions_for_work(&mut self, work_id: &EntityUid) -> RepoResult<Vec<(EditionHeader, Edition)>> {
            Ok(self.editions.values().filter(|(_, edition)| &edition.work_id == work_id).cloned().collect())
        }
        fn list_editions(&mut self) -> RepoResult<Vec<(EditionHeader, Edition)>> {
            Ok(self.editions.values().cloned().collect())
        }
        fn delete_edition(&mut self, id: &EntityUid) -> RepoResult<()> {
            self.editions.remove(id);
            Ok(())
        }
    }

    impl MediaAssetRepo for MemoryRepo {
        fn insert_media_asset(&mut self, _header: MediaAssetHeader, asset: &MediaAsset) -> RepoResult<tanaste_repo::RecordId> {
            let id = self.next();
            self.assets.insert(asset.id, (header_now(id), asset.clone()));
            Ok(id)
        }
        fn update_media_asset(&mut self, _id: tanaste_repo::RecordId, _updated_at: tanaste_core::util::Timestamp, asset: &MediaAsset) -> RepoResult<()> {
            if let Some(entry) = self.assets.get_mut(&asset.id) {
                entry.1 = asset.clone();
            }
            Ok(())
        }
        fn load_media_asset(&mut self, id: &EntityUid) -> RepoResult<(MediaAssetHeader, MediaAsset)> {
            self.assets.get(id).cloned().ok_or(RepoError::NotFound)
        }
        fn find_media_asset_by_content_hash(
            &mut self,
            content_hash: &tanaste_core::media_asset::ContentHash,
        ) -> RepoResult<Option<(MediaAssetHeader, MediaAsset)>> {
            Ok(self.assets.values().find(|(_, asset)| &asset.content_hash == content_hash).cloned())
        }
        fn find_media_asset_by_current_path(&mut self, current_path: &Path) -> RepoResult<Option<(MediaAssetHeader, MediaAsset)>> {
            Ok(self.assets.values().find(|(_, asset)| asset.current_path == current_path).cloned())
        }
        fn load_media_assets_for_edition(&mut self, edition_id: &EntityUid) -> RepoResult<Vec<(MediaAssetHeader, MediaAsset)>> {
            Ok(self.assets.values().filter(|(_, asset)| &asset.edition_id == edition_id).cloned().collect())
        }
        fn list_active_media_assets(&mut self) -> RepoResult<Vec<(MediaAssetHeader, MediaAsset)>> {
            Ok(self.assets.values().filter(|(_, asset)| !asset.retired).cloned().collect())
        }
        fn delete_media_asset(&mut self, id: &EntityUid) -> RepoResult<()> {
            self.assets.remove(id);
            Ok(())
        }
    }

    impl PersonRepo for MemoryRepo {
        fn insert_person(&mut self, _header: tanaste_repo::person::PersonHeader, _person: &Person) -> RepoResult<tanaste_repo::RecordId> {
            Ok(self.next())
        }
        fn update_person(&mut self, _id: tanaste_repo::RecordId, _updated_at: tanaste_core::util::Timestamp, _person: &Person) -> RepoResult<()> {
            Ok(())
        }
        fn load_person(&mut self, _id: &EntityUid) -> RepoResult<(tanaste_repo::person::PersonHeader, Person)> {
            Err(RepoError::NotFound)
        }
        fn find_person_by_name_and_role(&mut self, _name: &str, _role: PersonRole) -> RepoResult<Option<(tanaste_repo::person::PersonHeader, Person)>> {
            Ok(None)
        }
        fn list_persons_needing_enrichment(&mut self) -> RepoResult<Vec<(tanaste_repo::person::PersonHeader, Person)>> {
            Ok(Vec::new())
        }
    }

    impl ClaimRepo for MemoryRepo {
        fn insert_claim(&mut self, _header: tanaste_repo::claim::ClaimHeader, claim: &MetadataClaim) -> RepoResult<tanaste_repo::RecordId> {
            self.claims.push(claim.clone());
            Ok(self.next())
        }
        fn list_claims_for_entity(&mut self, entity: &EntityRef) -> RepoResult<Vec<(tanaste_repo::claim::ClaimHeader, MetadataClaim)>> {
            Ok(self
                .claims
                .iter()
                .filter(|claim| &claim.entity == entity)
                .cloned()
                .map(|claim| (header_now(1), claim))
                .collect())
        }
        fn list_claims_for_field(&mut self, entity: &EntityRef, field_key: &str) -> RepoResult<Vec<(tanaste_repo::claim::ClaimHeader, MetadataClaim)>> {
            Ok(self
                .claims
                .iter()
                .filter(|claim| &claim.entity == entity && claim.field_key == field_key)
                .cloned()
                .map(|claim| (header_now(1), claim))
                .collect())
        }
        fn delete_claims_from_provider(&mut self, entity: &EntityRef, provider_name: &str) -> RepoResult<usize> {
            let before = self.claims.len();
            self.claims.retain(|claim| !(&claim.entity == entity && claim.provider_name == provider_name));
            Ok(before - self.claims.len())
        }
    }

    impl CanonicalValueRepo for MemoryRepo {
        fn upsert_canonical_value(&mut self, value: &CanonicalValue) -> RepoResult<()> {
            self.canonical.insert((value.key.entity, value.key.field_key.clone()), value.clone());
            Ok(())
        }
        fn load_canonical_value(&mut self, key: &CanonicalValueKey) -> RepoResult<Option<CanonicalValue>> {
            Ok(self.canonical.get(&(key.entity, key.field_key.clone())).cloned())
        }
        fn list_canonical_values_for_entity(&mut self, entity: &EntityRef) -> RepoResult<Vec<CanonicalValue>> {
            Ok(self.canonical.values().filter(|value| &value.key.entity == entity).cloned().collect())
        }
    }

    impl ProfileRepo for MemoryRepo {
        fn insert_profile(&mut self, _header: tanaste_repo::profile::ProfileHeader, _profile: &Profile) -> RepoResult<tanaste_repo::RecordId> {
            Ok(self.next())
        }
        fn load_profile(&mut self, _id: &EntityUid) -> RepoResult<(tanaste_repo::profile::ProfileHeader, Profile)> {
            Err(RepoError::NotFound)
        }
        fn find_profile_by_display_name(&mut self, _display_name: &str) -> RepoResult<Option<(tanaste_repo::profile::ProfileHeader, Profile)>> {
            Ok(None)
        }
        fn list_profiles(&mut self) -> RepoResult<Vec<(tanaste_repo::profile::ProfileHeader, Profile)>> {
            Ok(Vec::new())
        }
    }

    impl ProviderConfigRepo for MemoryRepo {
        fn upsert_provider_config(&mut self, _config: &ProviderConfig) -> RepoResult<()> {
            Ok(())
        }
        fn load_provider_config(&mut self, _name: &str) -> RepoResult<Option<ProviderConfig>> {
            Ok(None)
        }
        fn list_provider_configs(&mut self) -> RepoResult<Vec<ProviderConfig>> {
            Ok(Vec::new())
        }
    }

    impl TransactionLogRepo for MemoryRepo {
        fn append_transaction_log_entry(&mut self, _entry: &TransactionLogEntry) -> RepoResult<tanaste_repo::RecordId> {
            Ok(self.next())
        }
        fn count_transaction_log_entries(&mut self) -> RepoResult<usize> {
            Ok(0)
        }
        fn list_recent_transaction_log_entries(&mut self, _limit: usize) -> RepoResult<Vec<TransactionLogEntry>> {
            Ok(Vec::new())
        }
        fn prune_transaction_log(&mut self, _max_entries: usize) -> RepoResult<usize> {
            Ok(0)
        }
    }

    struct StubAdapter {
        title: &'static str,
        author: &'static str,
    }

    #[async_trait::async_trait]
    impl ProviderAdapter for StubAdapter {
        fn name(&self) -> &str {
            "stub"
        }
        async fn fetch(&self, request: &ProviderLookupRequest) -> Vec<MetadataClaim> {
            vec![
                MetadataClaim {
                    id: EntityUid::new(),
                    entity: request.entity,
                    field_key: field_key::TITLE.to_owned(),
                    value: self.title.to_owned(),
                    provider_name: "stub".to_owned(),
                    observed_at: clock::now(),
                    is_user_locked: false,
                },
                MetadataClaim {
                    id: EntityUid::new(),
                    entity: request.entity,
                    field_key: field_key::AUTHOR.to_owned(),
                    value: self.author.to_owned(),
                    provider_name: "stub".to_owned(),
                    observed_at: clock::now(),
                    is_user_locked: false,
                },
            ]
        }
    }

    struct NullPublisher;
    impl NotificationPublisher for NullPublisher {
        fn publish(&self, _event: Event) {}
    }

    fn harvester() -> ProviderHarvester {
        ProviderHarvester::new(
            vec![RegisteredProvider {
                config: ProviderConfig {
                    name: "stub".to_owned(),
                    enabled: true,
                    default_weight: 1.0,
                    field_weights: Default::default(),
                    domain: ProviderDomain::Universal,
                    capability_tags: vec![],
                    base_url: String::new(),
                },
                adapter: Arc::new(StubAdapter { title: "Dune", author: "Frank Herbert" }),
            }],
            HarvesterConfig::default(),
        )
    }

    fn params(library_root: PathBuf) -> IngestionParams {
        IngestionParams::new(
            library_root,
            "{Category}/{HubName} ({Year})/{Format}/{HubName}{Ext}".to_owned(),
            HashMap::new(),
            ScoringConfig::default(),
            OrganizerPolicy { auto_organize: true, write_back: true },
            DedupConfig::default(),
        )
    }

    #[tokio::test]
    async fn a_new_file_with_no_existing_hub_creates_one_and_organizes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let incoming = dir.path().join("incoming.epub");
        std::fs::write(&incoming, b"dune content").unwrap();
        let library_root = dir.path().join("library");

        let mut repo = MemoryRepo::default();
        let locks = EntityLockTable::new();
        let sidecar_codec = SidecarCodec::new();
        let registry = TokenRegistry::default();
        let params = params(library_root.clone());

        let outcome = ingest_file(
            &mut repo,
            &locks,
            &harvester(),
            &sidecar_codec,
            &NullPublisher,
            &registry,
            &params,
            &incoming,
            MediaHints { media_type: MediaType::Epub, ..MediaHints::default() },
            Arc::new(AtomicBool::new(false)),
            &commit_ingestion_batch,
        )
        .await
        .unwrap();

        let IngestionOutcome::Ingested { hub_id, final_path, .. } = outcome else {
            panic!("expected Ingested, got {outcome:?}");
        };
        assert!(!incoming.exists());
        assert!(final_path.exists());
        assert_eq!(final_path, library_root.join("Books/Dune/Epub/Dune.epub"));
        assert!(repo.hubs.contains_key(&hub_id));
        assert!(sidecar_codec.read_edition(final_path.parent().unwrap()).is_some());
        assert!(sidecar_codec.read_hub(&library_root.join("Books/Dune")).is_some());
    }

    #[tokio::test]
    async fn a_second_file_for_the_same_hub_auto_links_instead_of_creating_a_new_one() {
        let dir = tempfile::tempdir().unwrap();
        let library_root = dir.path().join("library");
        let mut repo = MemoryRepo::default();
        let locks = EntityLockTable::new();
        let sidecar_codec = SidecarCodec::new();
        let registry = TokenRegistry::default();
        let params = params(library_root.clone());

        let first = dir.path().join("first.epub");
        std::fs::write(&first, b"dune content one").unwrap();
        let first_outcome = ingest_file(
            &mut repo,
            &locks,
            &harvester(),
            &sidecar_codec,
            &NullPublisher,
            &registry,
            &params,
            &first,
            MediaHints { media_type: MediaType::Epub, ..MediaHints::default() },
            Arc::new(AtomicBool::new(false)),
            &commit_ingestion_batch,
        )
        .await
        .unwrap();
        let IngestionOutcome::Ingested { hub_id: first_hub_id, .. } = first_outcome else {
            panic!("expected Ingested, got {first_outcome:?}");
        };

        let second = dir.path().join("second.epub");
        std::fs::write(&second, b"dune content two, a different edition").unwrap();
        let second_outcome = ingest_file(
            &mut repo,
            &locks,
            &harvester(),
            &sidecar_codec,
            &NullPublisher,
            &registry,
            &params,
            &second,
            MediaHints { media_type: MediaType::Epub, ..MediaHints::default() },
            Arc::new(AtomicBool::new(false)),
            &commit_ingestion_batch,
        )
        .await
        .unwrap();
        let IngestionOutcome::Ingested { hub_id: second_hub_id, .. } = second_outcome else {
            panic!("expected Ingested, got {second_outcome:?}");
        };

        assert_eq!(first_hub_id, second_hub_id);
        assert_eq!(repo.hubs.len(), 1);
    }
}
