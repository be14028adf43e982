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

//! 4.G Provider Harvester: the adapter contract, concurrency-capped
//! dispatch across enabled providers, and two reference adapters.

pub mod adapter;
pub mod fetch;
pub mod harvester;

pub mod adapters {
    pub mod audnexus;
    pub mod wikidata;
}

pub use adapter::ProviderAdapter;
pub use fetch::{HttpFetch, ReqwestFetch};
pub use harvester::{HarvesterConfig, ProviderHarvester, RegisteredProvider};
