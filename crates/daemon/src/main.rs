// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(unsafe_code)]

//! Process entry point: loads `tanaste_master.json`, starts every
//! long-running component, and runs until `Ctrl-C`. Reduced from the
//! teacher's web-service binary to a headless daemon — the HTTP API and
//! dashboard transport are out of scope here.

use std::path::PathBuf;
use std::sync::Arc;

use tanaste_backend_embedded::library::Library;
use tanaste_core_api::config::MasterConfig;

const MANIFEST_ENV_VAR: &str = "TANASTE_MASTER_CONFIG";
const DEFAULT_MANIFEST_PATH: &str = "tanaste_master.json";

fn init_tracing() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();
}

fn manifest_path() -> PathBuf {
    std::env::var_os(MANIFEST_ENV_VAR).map_or_else(|| PathBuf::from(DEFAULT_MANIFEST_PATH), PathBuf::from)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let manifest_path = manifest_path();
    tracing::info!(path = %manifest_path.display(), "loading configuration manifest");
    let master = MasterConfig::load(&manifest_path)?;

    let library = Arc::new(Library::start(&master).await?);
    tracing::info!("tanaste daemon started");

    // The database is a derived index that can be rebuilt from disk at
    // any time (`spec.md` §1) — reconcile it against the sidecar tree
    // once at startup before relying on it for dedup lookups.
    match library.scan().await {
        Ok(result) => tracing::info!(?result, "startup Great Inhale scan complete"),
        Err(err) => tracing::warn!(error = %err, "startup Great Inhale scan failed"),
    }

    let health_task = tokio::spawn({
        let library = Arc::clone(&library);
        async move { library.run_health_monitor().await }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    health_task.abort();
    library.shutdown();

    Ok(())
}
