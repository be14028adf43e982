// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Concrete entry point for `tanaste_usecases::ingestion::ingest_file`:
//! acquires the `Gatekeeper`'s single-writer slot for the whole call
//! (harvesting and sidecar writes interleave `.await`s with repository
//! calls, so the slot can't be handed to one `spawn_blocking` closure the
//! way the teacher's fully-synchronous use cases are).

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tanaste_core_api::event::NotificationPublisher;
use tanaste_media_fs::organizer::TokenRegistry;
use tanaste_media_fs::sidecar::SidecarCodec;
use tanaste_providers::harvester::ProviderHarvester;
use tanaste_repo_sqlite::prelude::Connection;
use tanaste_storage_sqlite::connection::pool::gatekeeper::Gatekeeper;
use tanaste_usecases::ingestion::{commit_ingestion_batch, ingest_file as uc_ingest_file, IngestionOutcome, IngestionParams, MediaHints};
use tanaste_usecases::locks::EntityLockTable;

use crate::Result;

#[allow(clippy::too_many_arguments)]
pub async fn ingest_file(
    gatekeeper: &Gatekeeper,
    locks: &EntityLockTable,
    harvester: &ProviderHarvester,
    sidecar_codec: &SidecarCodec,
    notifier: &dyn NotificationPublisher,
    registry: &TokenRegistry,
    params: &IngestionParams,
    path: &Path,
    hints: MediaHints,
    abort_flag: Arc<AtomicBool>,
) -> Result<IngestionOutcome> {
    let mut guard = gatekeeper.acquire_write_connection().await?;
    let mut connection = Connection::new(&mut guard);
    uc_ingest_file(
        &mut connection,
        locks,
        harvester,
        sidecar_codec,
        notifier,
        registry,
        params,
        path,
        hints,
        abort_flag,
        &|connection, batch| connection.transaction(|connection| commit_ingestion_batch(connection, batch)),
    )
    .await
    .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::sync::atomic::AtomicBool;

    use tanaste_core::media_asset::MediaType;
    use tanaste_core::provider::{ProviderConfig, ProviderDomain};
    use tanaste_core_api::config::ScoringConfig;
    use tanaste_core_api::event::{Event, NotificationPublisher};
    use tanaste_core_api::provider_request::ProviderLookupRequest;
    use tanaste_media_fs::organizer::OrganizerPolicy;
    use tanaste_providers::adapter::ProviderAdapter;
    use tanaste_providers::harvester::{HarvesterConfig, ProviderHarvester, RegisteredProvider};
    use tanaste_storage_sqlite::connection::pool::{create_connection_pool, get_pooled_connection};
    use tanaste_storage_sqlite::connection::Storage;
    use tanaste_usecases::dedup::DedupConfig;

    use super::*;

    struct NullPublisher;
    impl NotificationPublisher for NullPublisher {
        fn publish(&self, _event: Event) {}
    }

    struct StubAdapter;

    #[async_trait::async_trait]
    impl ProviderAdapter for StubAdapter {
        fn name(&self) -> &str {
            "stub"
        }
        async fn fetch(&self, _request: &ProviderLookupRequest) -> Vec<tanaste_core::claim::MetadataClaim> {
            Vec::new()
        }
    }

    fn gatekeeper() -> Gatekeeper {
        // A single-connection pool keeps every checkout pointing at the
        // same in-memory database; a larger pool would hand out distinct,
        // independent `:memory:` databases.
        let pool = create_connection_pool(&Storage::InMemory, NonZeroU32::new(1).unwrap()).unwrap();
        crate::database::initialize_and_migrate(&mut get_pooled_connection(&pool).unwrap()).unwrap();
        Gatekeeper::new(
            pool,
            tanaste_storage_sqlite::connection::pool::gatekeeper::Config {
                acquire_read_timeout_millis: std::num::NonZeroU64::new(1000).unwrap(),
                acquire_write_timeout_millis: std::num::NonZeroU64::new(1000).unwrap(),
            },
        )
    }

    #[tokio::test]
    async fn ingests_a_new_file_through_the_gatekeeper() {
        let dir = tempfile::tempdir().unwrap();
        let incoming = dir.path().join("incoming.epub");
        std::fs::write(&incoming, b"dune content").unwrap();
        let library_root = dir.path().join("library");

        let gatekeeper = gatekeeper();
        let locks = EntityLockTable::new();
        let sidecar_codec = SidecarCodec::new();
        let registry = TokenRegistry::default();
        let harvester = ProviderHarvester::new(
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
                adapter: Arc::new(StubAdapter),
            }],
            HarvesterConfig::default(),
        );
        let params = IngestionParams::new(
            library_root.clone(),
            "{Category}/{HubName} ({Year})/{Format}/{HubName}{Ext}".to_owned(),
            std::collections::HashMap::new(),
            ScoringConfig::default(),
            OrganizerPolicy { auto_organize: true, write_back: true },
            DedupConfig::default(),
        );

        let outcome = ingest_file(
            &gatekeeper,
            &locks,
            &harvester,
            &sidecar_codec,
            &NullPublisher,
            &registry,
            &params,
            &incoming,
            MediaHints { media_type: MediaType::Epub, ..MediaHints::default() },
            Arc::new(AtomicBool::new(false)),
        )
        .await
        .unwrap();

        let IngestionOutcome::Ingested { final_path, .. } = outcome else {
            panic!("expected Ingested, got {outcome:?}");
        };
        assert!(final_path.exists());
    }
}
