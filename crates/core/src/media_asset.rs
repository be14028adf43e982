// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One physical file on disk, content-addressed by its SHA-256 digest.

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MediaType {
    Epub,
    Audiobook,
    Movie,
    #[default]
    Unknown,
}

/// A 64-character lower-case hex SHA-256 digest.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ContentHash(String);

impl ContentHash {
    pub const HEX_LEN: usize = 64;

    #[must_use]
    pub fn new(hex: impl Into<String>) -> Option<Self> {
        let hex = hex.into();
        (hex.len() == Self::HEX_LEN && hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .then(|| Self(hex.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MediaAsset {
    pub id: EntityUid,
    pub edition_id: EntityUid,
    pub content_hash: ContentHash,
    pub media_type: MediaType,
    pub current_path: PathBuf,
    pub file_size_bytes: u64,
    /// Soft-deletion flag: set once the file has been confirmed missing on
    /// two consecutive Great Inhale scans.
    pub retired: bool,
    /// Number of consecutive scans in which the file was not found.
    pub missing_scan_count: u32,
}

impl MediaAsset {
    /// Applies the "retired after two consecutive missing scans" lifecycle
    /// rule.
    pub fn observe_missing(&mut self) {
        self.missing_scan_count = self.missing_scan_count.saturating_add(1);
        if self.missing_scan_count >= 2 {
            self.retired = true;
        }
    }

    pub fn observe_present(&mut self) {
        self.missing_scan_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_hex_or_wrong_length() {
        assert!(ContentHash::new("abc").is_none());
        assert!(ContentHash::new("z".repeat(64)).is_none());
        assert!(ContentHash::new("a".repeat(64)).is_some());
    }

    #[test]
    fn retires_after_two_consecutive_misses() {
        let mut asset = MediaAsset {
            id: EntityUid::new(),
            edition_id: EntityUid::new(),
            content_hash: ContentHash::new("a".repeat(64)).unwrap(),
            media_type: MediaType::Epub,
            current_path: "x".into(),
            file_size_bytes: 0,
            retired: false,
            missing_scan_count: 0,
        };
        asset.observe_missing();
        assert!(!asset.retired);
        asset.observe_missing();
        assert!(asset.retired);
    }
}
