// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The notification channel: the sole boundary between the core and the
//! dashboard's real-time push transport (out of scope here).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tanaste_core::entity::EntityUid;

/// Stable string reasons surfaced through [`Event::IngestionFailed`], kept
/// as their own type so the wire representation never drifts from the
/// internal error taxonomy (`spec.md` §7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum FailureReason {
    LockTimeout,
    Corruption,
    DuplicateSkip,
    UnsupportedFormat,
    Quarantined,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unreachable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    IngestionStarted {
        path: PathBuf,
    },
    IngestionHashed {
        path: PathBuf,
        content_hash: String,
    },
    IngestionCompleted {
        path: PathBuf,
        asset_id: EntityUid,
        reason: Option<String>,
    },
    IngestionFailed {
        path: PathBuf,
        reason: FailureReason,
    },
    WatchFolderActive {
        path: PathBuf,
    },
    FolderHealthChanged {
        path: PathBuf,
        status: HealthStatus,
    },
    MetadataHarvested {
        entity_id: EntityUid,
        provider_name: String,
        updated_fields: Vec<String>,
    },
    PersonEnriched {
        person_id: EntityUid,
        name: String,
        headshot_url: Option<String>,
        wikidata_qid: Option<String>,
    },
}

/// The sole boundary to the dashboard transport layer. Implementations
/// must never block for long: the caller may be a hot ingestion path.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, event: Event);
}

/// Default/test implementation: logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationPublisher;

impl NotificationPublisher for TracingNotificationPublisher {
    fn publish(&self, event: Event) {
        tracing::info!(?event, "notification");
    }
}
