// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]

//! Storage-agnostic orchestration: every function here is generic over the
//! `tanaste-repo` port traits it needs, leaving the concrete store to
//! `tanaste-usecases-sqlite`.

use std::result::Result as StdResult;

use tanaste_repo::RepoError;
use thiserror::Error;

pub mod dedup;
pub mod health;
pub mod ingestion;
pub mod locks;
pub mod repo;
pub mod scan;

pub use repo::Repo;

/// Wraps a caller-supplied error (e.g. an invalid organisation template, a
/// malformed hint set) so it is distinguishable from an internal failure.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct InputError(#[from] pub anyhow::Error);

pub type InputResult<T> = StdResult<T, InputError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Media(#[from] tanaste_media_fs::digest::DigestError),

    #[error(transparent)]
    Sidecar(#[from] tanaste_media_fs::sidecar::SidecarError),

    #[error(transparent)]
    Move(#[from] tanaste_media_fs::organizer::MoveError),

    #[error(transparent)]
    Template(#[from] tanaste_media_fs::organizer::TemplateError),

    #[error(transparent)]
    PolicyRefused(#[from] tanaste_media_fs::organizer::PolicyRefused),

    #[error("waiting for the file to unlock timed out after {0:?}")]
    LockTimeout(std::time::Duration),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = StdResult<T, Error>;
