// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(clippy::pedantic)]
#![warn(clippy::clone_on_ref_ptr)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::enum_glob_use)]
#![allow(clippy::missing_errors_doc)]

//! Storage-agnostic repository port traits. Every trait here describes
//! *what* can be asked of the persisted state (`spec.md` §6); the concrete
//! answer lives in `tanaste-repo-sqlite`.

pub mod claim;
pub mod edition;
pub mod hub;
pub mod media_asset;
pub mod person;
pub mod profile;
pub mod provider_config;
pub mod transaction_log;
pub mod work;

use tanaste_core::util::Timestamp;

pub type RecordId = i64;

/// The storage-internal identity of a record, distinct from its public
/// [`tanaste_core::entity::EntityUid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader<Id> {
    pub id: Id,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub mod prelude {
    pub use super::{RecordHeader, RecordId, RepoError, RepoResult};
}

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("aborted")]
    Aborted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

pub trait OptionalRepoResult<T> {
    fn optional(self) -> RepoResult<Option<T>>;
}

impl<T> OptionalRepoResult<T> for Result<T, RepoError> {
    fn optional(self) -> RepoResult<Option<T>> {
        self.map_or_else(
            |err| {
                if matches!(err, RepoError::NotFound) {
                    Ok(None)
                } else {
                    Err(err)
                }
            },
            |val| Ok(Some(val)),
        )
    }
}
