// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! Component wiring for the embedded backend: loads `tanaste_master.json`,
//! provisions the database, builds the provider registry, and connects
//! the File Watcher through the Debounce Queue into the ingestion
//! pipeline.

pub mod library;
pub mod providers;
pub mod storage;

pub type Error = tanaste_usecases_sqlite::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::{Error, Result};
    pub use crate::library::Library;
}
