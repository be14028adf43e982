// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A convenience supertrait bundling every `tanaste-repo` port a use case
//! in this crate might need. Not grounded on the teacher — `aoide-usecases`
//! spells out the exact `where Repo: TraitA + TraitB` bound each function
//! needs (see `track/purge.rs`) rather than one bundled trait. Adopted here
//! because several use cases in this crate (ingestion, the Great Inhale
//! Scanner) each touch most of the nine port traits, and repeating a
//! nine-trait bound at every call site would be noise, not precision.

use tanaste_repo::claim::{CanonicalValueRepo, ClaimRepo};
use tanaste_repo::edition::EditionRepo;
use tanaste_repo::hub::HubRepo;
use tanaste_repo::media_asset::MediaAssetRepo;
use tanaste_repo::person::PersonRepo;
use tanaste_repo::profile::ProfileRepo;
use tanaste_repo::provider_config::ProviderConfigRepo;
use tanaste_repo::transaction_log::TransactionLogRepo;
use tanaste_repo::work::WorkRepo;

pub trait Repo:
    HubRepo
    + WorkRepo
    + EditionRepo
    + MediaAssetRepo
    + PersonRepo
    + ClaimRepo
    + CanonicalValueRepo
    + ProfileRepo
    + ProviderConfigRepo
    + TransactionLogRepo
{
}

impl<T> Repo for T where
    T: HubRepo
        + WorkRepo
        + EditionRepo
        + MediaAssetRepo
        + PersonRepo
        + ClaimRepo
        + CanonicalValueRepo
        + ProfileRepo
        + ProviderConfigRepo
        + TransactionLogRepo
{
}
