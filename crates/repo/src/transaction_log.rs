// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::entity::EntityUid;
use tanaste_core::util::Timestamp;

use crate::prelude::*;

/// One audit entry recording a mutation the ingestion pipeline or Great
/// Inhale Scanner made to the filesystem or the database, so an operator
/// can reconstruct what happened (`spec.md` §6 `transaction_log`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionLogEntry {
    pub occurred_at: Timestamp,
    pub action: String,
    pub entity_id: Option<EntityUid>,
    pub detail: String,
}

pub trait TransactionLogRepo {
    fn append_transaction_log_entry(&mut self, entry: &TransactionLogEntry) -> RepoResult<RecordId>;

    fn count_transaction_log_entries(&mut self) -> RepoResult<usize>;

    fn list_recent_transaction_log_entries(&mut self, limit: usize) -> RepoResult<Vec<TransactionLogEntry>>;

    /// Deletes the oldest entries until at most `max_entries` remain,
    /// returning how many were removed.
    fn prune_transaction_log(&mut self, max_entries: usize) -> RepoResult<usize>;
}
