// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]
#![warn(clippy::explicit_deref_methods)]
#![allow(clippy::module_name_repetitions)]

//! Concrete `SQLite` wiring for `tanaste-usecases`: every free function in
//! that crate is generic over `tanaste_usecases::repo::Repo`, and this
//! crate is the thin layer that supplies `tanaste-repo-sqlite`'s
//! `Connection` as that repo, held behind a `tanaste-storage-sqlite`
//! `Gatekeeper` for single-writer serialization.

use tanaste_repo::RepoError;
use tanaste_storage_sqlite::Error as StorageError;
use thiserror::Error;

pub mod database;
pub mod ingestion;
pub mod scan;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<tanaste_usecases::Error> for Error {
    fn from(err: tanaste_usecases::Error) -> Self {
        use tanaste_usecases::Error as Uc;
        match err {
            Uc::Repository(err) => Self::Repository(err),
            Uc::Input(err) => Self::Other(err.0),
            Uc::Media(err) => Self::Other(err.into()),
            Uc::Sidecar(err) => Self::Other(err.into()),
            Uc::Move(err) => Self::Other(err.into()),
            Uc::Template(err) => Self::Other(err.into()),
            Uc::PolicyRefused(err) => Self::Other(err.into()),
            Uc::LockTimeout(duration) => Self::Other(anyhow::anyhow!("ingestion lock timed out after {duration:?}")),
            Uc::Io(err) => Self::Other(err.into()),
            Uc::Other(err) => Self::Other(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
