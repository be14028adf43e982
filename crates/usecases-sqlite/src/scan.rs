// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Concrete entry point for `tanaste_usecases::scan::scan_library`, run
//! under the `Gatekeeper`'s single-writer slot for the duration of the
//! walk, with every write the scan makes wrapped in one database
//! transaction so a crash partway through a restore leaves no partial
//! Hub/Work/Edition/MediaAsset rows behind.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tanaste_core::provider::ProviderConfig;
use tanaste_core_api::config::ScoringConfig;
use tanaste_core_api::scan::LibraryScanResult;
use tanaste_media_fs::sidecar::SidecarCodec;
use tanaste_repo_sqlite::prelude::Connection;
use tanaste_storage_sqlite::connection::pool::gatekeeper::Gatekeeper;
use tanaste_usecases::scan::scan_library as uc_scan_library;

use crate::Result;

pub async fn scan_library(
    gatekeeper: &Gatekeeper,
    library_root: &Path,
    provider_configs: &HashMap<String, ProviderConfig>,
    scoring_config: &ScoringConfig,
    sidecar_codec: &SidecarCodec,
    abort_flag: Arc<AtomicBool>,
) -> Result<LibraryScanResult> {
    let mut guard = gatekeeper.acquire_write_connection().await?;
    let mut connection = Connection::new(&mut guard);
    connection
        .transaction(|connection| uc_scan_library(connection, library_root, provider_configs, scoring_config, sidecar_codec, abort_flag))
        .map_err(Into::into)
}
