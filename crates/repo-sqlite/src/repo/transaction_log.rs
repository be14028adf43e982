// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_repo::transaction_log::{TransactionLogEntry, TransactionLogRepo};

use crate::prelude::*;
use crate::schema::transaction_log;
use crate::util::{entity_uid_to_text, millis_to_timestamp, text_to_entity_uid, timestamp_to_millis};

#[derive(Queryable, Insertable)]
#[diesel(table_name = transaction_log)]
struct Record {
    occurred_at_ms: i64,
    action: String,
    entity_id: Option<String>,
    detail: String,
}

impl TryFrom<Record> for TransactionLogEntry {
    type Error = anyhow::Error;

    fn try_from(from: Record) -> anyhow::Result<Self> {
        Ok(TransactionLogEntry {
            occurred_at: millis_to_timestamp(from.occurred_at_ms),
            action: from.action,
            entity_id: from.entity_id.map(|id| text_to_entity_uid(&id)).transpose()?,
            detail: from.detail,
        })
    }
}

impl Record {
    fn bind(entry: &TransactionLogEntry) -> Self {
        Self {
            occurred_at_ms: timestamp_to_millis(entry.occurred_at),
            action: entry.action.clone(),
            entity_id: entry.entity_id.map(entity_uid_to_text),
            detail: entry.detail.clone(),
        }
    }
}

impl TransactionLogRepo for Connection<'_> {
    fn append_transaction_log_entry(&mut self, entry: &TransactionLogEntry) -> RepoResult<RecordId> {
        let record = Record::bind(entry);
        diesel::insert_into(transaction_log::table)
            .values(&record)
            .returning(transaction_log::row_id)
            .get_result(self.as_mut())
            .map_err(repo_error)
    }

    fn count_transaction_log_entries(&mut self) -> RepoResult<usize> {
        transaction_log::table
            .count()
            .get_result::<i64>(self.as_mut())
            .map(|count| count.try_into().unwrap_or(0))
            .map_err(repo_error)
    }

    fn list_recent_transaction_log_entries(&mut self, limit: usize) -> RepoResult<Vec<TransactionLogEntry>> {
        transaction_log::table
            .order(transaction_log::occurred_at_ms.desc())
            .limit(limit.try_into().unwrap_or(i64::MAX))
            .load::<Record>(self.as_mut())
            .map_err(repo_error)?
            .into_iter()
            .map(|record| record.try_into().map_err(RepoError::Other))
            .collect()
    }

    fn prune_transaction_log(&mut self, max_entries: usize) -> RepoResult<usize> {
        let total: i64 = transaction_log::table.count().get_result(self.as_mut()).map_err(repo_error)?;
        let max_entries = i64::try_from(max_entries).unwrap_or(i64::MAX);
        let excess = total - max_entries;
        if excess <= 0 {
            return Ok(0);
        }
        let cutoff = transaction_log::table
            .select(transaction_log::row_id)
            .order(transaction_log::row_id.asc())
            .limit(excess)
            .load::<i64>(self.as_mut())
            .map_err(repo_error)?;
        diesel::delete(transaction_log::table.filter(transaction_log::row_id.eq_any(&cutoff)))
            .execute(self.as_mut())
            .map_err(repo_error)
    }
}
