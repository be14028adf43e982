// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use tanaste_core::entity::EntityUid;
use tanaste_core::util::Timestamp;

pub(crate) fn timestamp_to_millis(timestamp: Timestamp) -> i64 {
    timestamp.as_millisecond()
}

pub(crate) fn millis_to_timestamp(millis: i64) -> Timestamp {
    Timestamp::from_millisecond(millis).unwrap_or(Timestamp::UNIX_EPOCH)
}

pub(crate) fn entity_uid_to_text(uid: EntityUid) -> String {
    uid.to_string()
}

pub(crate) fn text_to_entity_uid(text: &str) -> anyhow::Result<EntityUid> {
    text.parse().map_err(|err: uuid::Error| anyhow::anyhow!(err))
}
