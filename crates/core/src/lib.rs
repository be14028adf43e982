// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod claim;
pub mod edition;
pub mod entity;
pub mod hub;
pub mod media_asset;
pub mod person;
pub mod profile;
pub mod provider;
pub mod util;
pub mod work;

pub mod prelude {
    pub use crate::entity::{EntityKind, EntityRef, EntityUid, EntityUidTyped};
    pub use crate::util::clock::Timestamp;
    pub use semval::prelude::*;
}
