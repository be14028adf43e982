// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! 4.C `ExecuteMove` — ensure destination, collision-suffix, rename with a
//! cross-device copy+verify+unlink fallback, and retry transient failures
//! with exponential backoff (base 100 ms, factor 2, 6 retries after the
//! initial attempt, ~6.3 s cumulative sleep).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::digest::sha256_content_hash;

const BACKOFF_BASE: Duration = Duration::from_millis(100);
const BACKOFF_FACTOR: u32 = 2;
const MAX_ATTEMPTS: u32 = 7;

#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("failed to create destination parent {0}: {1}")]
    CreateParent(PathBuf, std::io::Error),
    #[error("could not find a free collision-suffixed name for {0}")]
    NoFreeDestinationName(PathBuf),
    #[error("copy-verify-unlink fallback failed: content hash mismatch after copying to {0}")]
    VerifyMismatch(PathBuf),
    #[error("move was cancelled")]
    Cancelled,
    #[error("move of {source} to {destination} failed after {attempts} attempt(s): {last_error}")]
    Exhausted {
        source: PathBuf,
        destination: PathBuf,
        attempts: u32,
        #[source]
        last_error: std::io::Error,
    },
}

/// Appends `" (n)"` before the file extension for the smallest `n >= 1`
/// whose candidate path does not exist.
fn collision_suffixed(destination: &Path) -> Result<PathBuf, MoveError> {
    let parent = destination.parent().unwrap_or_else(|| Path::new(""));
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = destination.extension().map(|e| e.to_string_lossy().into_owned());

    for n in 1..=10_000_u32 {
        let file_name = match &extension {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = parent.join(file_name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(MoveError::NoFreeDestinationName(destination.to_path_buf()))
}

fn is_cross_device(error: &std::io::Error) -> bool {
    error.kind() == std::io::ErrorKind::CrossesDevices
}

fn copy_verify_unlink(source: &Path, destination: &Path) -> Result<(), MoveError> {
    std::fs::copy(source, destination).map_err(|e| MoveError::Exhausted {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        attempts: 1,
        last_error: e,
    })?;
    let abort_flag = AtomicBool::new(false);
    let source_hash = sha256_content_hash(source, &abort_flag);
    let dest_hash = sha256_content_hash(destination, &abort_flag);
    match (source_hash, dest_hash) {
        (Ok(a), Ok(b)) if a == b => {}
        _ => {
            let _ = std::fs::remove_file(destination);
            return Err(MoveError::VerifyMismatch(destination.to_path_buf()));
        }
    }
    std::fs::remove_file(source).map_err(|e| MoveError::Exhausted {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        attempts: 1,
        last_error: e,
    })?;
    Ok(())
}

fn attempt_move(source: &Path, destination: &Path) -> Result<(), std::io::Error> {
    match std::fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            copy_verify_unlink(source, destination).map_err(|_| e)
        }
        Err(e) => Err(e),
    }
}

/// Performs a guarded, retried, collision-avoiding move of `source` to
/// `destination`. Returns the path the file actually ended up at (which may
/// differ from `destination` if a collision suffix was applied).
pub async fn execute_move(
    source: &Path,
    destination: &Path,
    abort_flag: &AtomicBool,
) -> Result<PathBuf, MoveError> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| MoveError::CreateParent(parent.to_path_buf(), e))?;
    }

    let final_destination = if destination.exists() {
        collision_suffixed(destination)?
    } else {
        destination.to_path_buf()
    };

    let mut backoff = BACKOFF_BASE;
    let mut last_error = None;
    for attempt in 1..=MAX_ATTEMPTS {
        if abort_flag.load(Ordering::Relaxed) {
            return Err(MoveError::Cancelled);
        }
        match attempt_move(source, &final_destination) {
            Ok(()) => return Ok(final_destination),
            Err(e) => {
                last_error = Some(e);
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(backoff).await;
                    backoff *= BACKOFF_FACTOR;
                }
            }
        }
    }
    Err(MoveError::Exhausted {
        source: source.to_path_buf(),
        destination: final_destination,
        attempts: MAX_ATTEMPTS,
        last_error: last_error.expect("loop always records an error before exhausting attempts"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn moves_a_file_into_a_new_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.epub");
        std::fs::write(&source, b"content").unwrap();
        let destination = dir.path().join("nested/dest.epub");
        let abort = AtomicBool::new(false);

        let result = execute_move(&source, &destination, &abort).await.unwrap();

        assert_eq!(result, destination);
        assert!(!source.exists());
        assert_eq!(std::fs::read(&destination).unwrap(), b"content");
    }

    #[tokio::test]
    async fn never_overwrites_an_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.epub");
        std::fs::write(&source, b"new").unwrap();
        let destination = dir.path().join("dest.epub");
        std::fs::write(&destination, b"existing").unwrap();
        let abort = AtomicBool::new(false);

        let result = execute_move(&source, &destination, &abort).await.unwrap();

        assert_eq!(result, dir.path().join("dest (1).epub"));
        assert_eq!(std::fs::read(&destination).unwrap(), b"existing");
        assert_eq!(std::fs::read(&result).unwrap(), b"new");
    }

    #[tokio::test]
    async fn picks_the_smallest_free_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("dest.epub");
        std::fs::write(&destination, b"0").unwrap();
        std::fs::write(dir.path().join("dest (1).epub"), b"1").unwrap();
        let source = dir.path().join("source.epub");
        std::fs::write(&source, b"new").unwrap();
        let abort = AtomicBool::new(false);

        let result = execute_move(&source, &destination, &abort).await.unwrap();

        assert_eq!(result, dir.path().join("dest (2).epub"));
    }
}
