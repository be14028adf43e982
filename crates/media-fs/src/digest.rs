// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Streaming content-address computation for the Hasher / Dedup component
//! (`spec.md` §4.F). Generic over [`digest::Digest`] like the teacher's
//! `aoide_media_file::fs::digest::hash_directories`, instantiated here with
//! `Sha256` because the spec mandates SHA-256 content hashes.

use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use data_encoding::HEXLOWER;
use digest::Digest;
use sha2::Sha256;

use tanaste_core::media_asset::ContentHash;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("hashing was cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Streams `path` through `D` in fixed-size chunks, checking `abort_flag`
/// between chunks so a cancellation signal (`spec.md` §5) can interrupt a
/// large file's hash mid-stream.
pub fn digest_file<D: Digest>(path: &Path, abort_flag: &AtomicBool) -> Result<digest::Output<D>, DigestError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = D::new();
    let mut buf = vec![0_u8; CHUNK_SIZE];
    loop {
        if abort_flag.load(Ordering::Relaxed) {
            return Err(DigestError::Cancelled);
        }
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hasher.finalize())
}

/// Computes the SHA-256 content hash used to content-address a
/// [`MediaAsset`](tanaste_core::media_asset::MediaAsset).
pub fn sha256_content_hash(path: &Path, abort_flag: &AtomicBool) -> Result<ContentHash, DigestError> {
    let output = digest_file::<Sha256>(path, abort_flag)?;
    let hex = HEXLOWER.encode(&output);
    Ok(ContentHash::new(hex).expect("sha256 digest is always 64 lowercase hex chars"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_match_a_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hello world").unwrap();
        let abort = AtomicBool::new(false);
        let hash = sha256_content_hash(&path, &abort).unwrap();
        assert_eq!(
            hash.as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn identical_content_hashes_identically() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();
        let abort = AtomicBool::new(false);
        assert_eq!(
            sha256_content_hash(&a, &abort).unwrap(),
            sha256_content_hash(&b, &abort).unwrap()
        );
    }

    #[test]
    fn cancellation_is_observed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, vec![0_u8; CHUNK_SIZE * 4]).unwrap();
        let abort = AtomicBool::new(true);
        assert!(matches!(
            digest_file::<Sha256>(&path, &abort),
            Err(DigestError::Cancelled)
        ));
    }
}
