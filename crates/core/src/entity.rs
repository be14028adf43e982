// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Stable identifiers and the polymorphic entity reference used by claims
//! and canonical values (see Design Note "Polymorphic entity ownership").

use std::{fmt, marker::PhantomData, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stable, randomly generated identifier shared by every entity kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityUid(Uuid);

impl EntityUid {
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for EntityUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntityUid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A type-tagged [`EntityUid`], preventing a [`Work`](crate::work::Work) id
/// from being passed where a [`Hub`](crate::hub::Hub) id is expected.
#[repr(transparent)]
pub struct EntityUidTyped<T: 'static> {
    untyped: EntityUid,
    marker: PhantomData<&'static T>,
}

impl<T> EntityUidTyped<T> {
    #[must_use]
    pub const fn from_untyped(untyped: EntityUid) -> Self {
        Self {
            untyped,
            marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn into_untyped(self) -> EntityUid {
        self.untyped
    }

    #[must_use]
    pub fn new() -> Self {
        Self::from_untyped(EntityUid::new())
    }
}

impl<T> Clone for EntityUidTyped<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for EntityUidTyped<T> {}

impl<T> fmt::Debug for EntityUidTyped<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.untyped.fmt(f)
    }
}
impl<T> fmt::Display for EntityUidTyped<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.untyped.fmt(f)
    }
}
impl<T> PartialEq for EntityUidTyped<T> {
    fn eq(&self, other: &Self) -> bool {
        self.untyped == other.untyped
    }
}
impl<T> Eq for EntityUidTyped<T> {}
impl<T> std::hash::Hash for EntityUidTyped<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.untyped.hash(state);
    }
}

/// The concrete entity kinds that may own a [`MetadataClaim`](crate::claim::MetadataClaim)
/// or [`CanonicalValue`](crate::claim::CanonicalValue).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntityKind {
    Hub,
    Work,
    Edition,
    MediaAsset,
    Person,
}

/// A polymorphic reference to the owner of a claim or canonical value,
/// persisted as a `(entity_kind, entity_id)` column pair rather than via an
/// inheritance hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityUid,
}

impl EntityRef {
    #[must_use]
    pub const fn new(kind: EntityKind, id: EntityUid) -> Self {
        Self { kind, id }
    }
}
