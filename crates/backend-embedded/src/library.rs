// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wires every running component together: the database, the provider
//! registry, the File Watcher / Debounce Queue pair, the Folder Health
//! Monitor, and the entry points the Great Inhale Scanner is driven from.
//! Grounded on `crates/backend-embedded/src/storage.rs`'s shape of a
//! single struct owning the long-lived collaborators a use case needs,
//! built once at startup and handed out by reference.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tanaste_core::media_asset::MediaType;
use tanaste_core::provider::ProviderConfig;
use tanaste_core_api::config::MasterConfig;
use tanaste_core_api::event::{NotificationPublisher, TracingNotificationPublisher};
use tanaste_core_api::scan::LibraryScanResult;
use tanaste_media_fs::organizer::{OrganizerPolicy, TokenRegistry};
use tanaste_media_fs::sidecar::SidecarCodec;
use tanaste_providers::harvester::{HarvesterConfig, ProviderHarvester};
use tanaste_storage_sqlite::connection::pool::gatekeeper::Gatekeeper;
use tanaste_usecases::dedup::DedupConfig;
use tanaste_usecases::health::{run_folder_health_monitor, HealthMonitorConfig};
use tanaste_usecases::ingestion::{IngestionParams, MediaHints};
use tanaste_usecases::locks::EntityLockTable;
use tanaste_watch::debounce::{DebounceQueue, StableEvent};
use tanaste_watch::watcher::{FileEventKind, FileWatcher};

use crate::providers::registered_providers;
use crate::storage::{provision_database, DatabaseConfig};
use crate::Result;

/// Every long-lived collaborator a use case needs, shared between the
/// background pump task and whatever calls [`Library::scan`]/
/// [`Library::run_health_monitor`] directly.
struct Shared {
    gatekeeper: Gatekeeper,
    locks: EntityLockTable,
    harvester: ProviderHarvester,
    provider_configs: HashMap<String, ProviderConfig>,
    sidecar_codec: SidecarCodec,
    registry: TokenRegistry,
    notifier: Arc<dyn NotificationPublisher>,
    params: IngestionParams,
    library_root: PathBuf,
    watch_directory: PathBuf,
}

/// Everything a running embedded backend needs, built once from a
/// resolved [`MasterConfig`] and kept alive for the process lifetime.
pub struct Library {
    shared: Arc<Shared>,
    watcher: FileWatcher,
    abort_flag: Arc<AtomicBool>,
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("library_root", &self.shared.library_root)
            .field("watch_directory", &self.shared.watch_directory)
            .finish_non_exhaustive()
    }
}

/// Coarse extension-based guess at a file's [`MediaType`], used only to
/// pick which providers the Harvester consults (`spec.md` §4.G); the
/// Hasher and Probe never depend on it being correct.
fn guess_media_type(path: &Path) -> MediaType {
    match path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase).as_deref() {
        Some("epub") => MediaType::Epub,
        Some("m4b" | "mp3" | "m4a") => MediaType::Audiobook,
        Some("mp4" | "mkv" | "avi") => MediaType::Movie,
        _ => MediaType::Unknown,
    }
}

impl Library {
    pub async fn start(master: &MasterConfig) -> Result<Self> {
        let gatekeeper = provision_database(master, &DatabaseConfig::default())?;
        let (registered, provider_configs) = registered_providers(master);
        let harvester = ProviderHarvester::new(registered, HarvesterConfig::default());

        let params = IngestionParams::new(
            master.library_root.clone(),
            master.organization_template.clone(),
            provider_configs.clone(),
            master.scoring,
            OrganizerPolicy { auto_organize: master.auto_organize, write_back: master.write_back },
            DedupConfig::default(),
        );

        let shared = Arc::new(Shared {
            gatekeeper,
            locks: EntityLockTable::new(),
            harvester,
            provider_configs,
            sidecar_codec: SidecarCodec::new(),
            registry: TokenRegistry::default(),
            notifier: Arc::new(TracingNotificationPublisher),
            params,
            library_root: master.library_root.clone(),
            watch_directory: master.watch_directory.clone(),
        });

        let (watcher, mut raw_events) = FileWatcher::new();
        watcher.add_directory(master.watch_directory.clone(), true);
        watcher.start().map_err(|err| tanaste_usecases_sqlite::Error::Other(err.into()))?;

        let (debounce, mut stable_events) = DebounceQueue::new();
        tokio::spawn(async move {
            while let Some(event) = raw_events.recv().await {
                debounce.push(event);
            }
        });

        let abort_flag = Arc::new(AtomicBool::new(false));
        let pump_shared = Arc::clone(&shared);
        let pump_abort = Arc::clone(&abort_flag);
        tokio::spawn(async move {
            while let Some(event) = stable_events.recv().await {
                if pump_abort.load(Ordering::SeqCst) {
                    break;
                }
                handle_stable_event(&pump_shared, event).await;
            }
        });

        Ok(Self { shared, watcher, abort_flag })
    }

    pub async fn scan(&self) -> Result<LibraryScanResult> {
        tanaste_usecases_sqlite::scan::scan_library(
            &self.shared.gatekeeper,
            &self.shared.library_root,
            &self.shared.provider_configs,
            &self.shared.params.scoring_config,
            &self.shared.sidecar_codec,
            Arc::clone(&self.abort_flag),
        )
        .await
        .map_err(Into::into)
    }

    pub async fn run_health_monitor(&self) {
        let config =
            HealthMonitorConfig::new(vec![self.shared.watch_directory.clone(), self.shared.library_root.clone()]);
        run_folder_health_monitor(config, self.shared.notifier.as_ref(), Arc::clone(&self.abort_flag)).await;
    }

    pub fn shutdown(&self) {
        self.abort_flag.store(true, Ordering::SeqCst);
        self.watcher.stop();
    }
}

async fn handle_stable_event(shared: &Shared, event: StableEvent) {
    // Missing-file accounting belongs to the Great Inhale Scanner and the
    // Folder Health Monitor (`spec.md` §4.J/§4.K), which retire a
    // `MediaAsset` only after two consecutive scans confirm it missing —
    // a single `Deleted` watch event is not that confirmation.
    if event.effective_kind == FileEventKind::Deleted {
        tracing::debug!(path = %event.path.display(), "ignoring delete event, left to the next scan");
        return;
    }

    let hints = MediaHints { media_type: guess_media_type(&event.path), ..MediaHints::default() };
    if let Err(err) = tanaste_usecases_sqlite::ingestion::ingest_file(
        &shared.gatekeeper,
        &shared.locks,
        &shared.harvester,
        &shared.sidecar_codec,
        shared.notifier.as_ref(),
        &shared.registry,
        &shared.params,
        &event.path,
        hints,
        Arc::new(AtomicBool::new(false)),
    )
    .await
    {
        tracing::warn!(path = %event.path.display(), error = %err, "ingestion failed");
    }
}
