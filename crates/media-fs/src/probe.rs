// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! 4.A Path Probe — check a directory for existence, readability,
//! writability. Never panics or propagates an error: any failure is simply
//! reported as the relevant bit being `false`.

use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathAccessibility {
    pub is_accessible: bool,
    pub has_read: bool,
    pub has_write: bool,
}

/// Probes `path` for existence, read access (enumerating one directory
/// entry) and write access (creating and deleting a uniquely named
/// zero-byte file).
#[must_use]
pub fn probe(path: &Path) -> PathAccessibility {
    let is_accessible = path.is_dir();
    if !is_accessible {
        return PathAccessibility::default();
    }
    let has_read = probe_read(path);
    let has_write = probe_write(path);
    PathAccessibility {
        is_accessible,
        has_read,
        has_write,
    }
}

fn probe_read(path: &Path) -> bool {
    let Ok(mut entries) = std::fs::read_dir(path) else {
        return false;
    };
    // An empty directory is still readable; only a failed enumeration
    // (e.g. permission denied surfacing lazily on `next`) counts as unreadable.
    entries.next().transpose().is_ok()
}

fn probe_write(path: &Path) -> bool {
    let probe_name = format!(".tanaste-probe-{}", uuid::Uuid::new_v4());
    let probe_path = path.join(probe_name);
    let Ok(()) = std::fs::write(&probe_path, []) else {
        return false;
    };
    let _ = std::fs::remove_file(&probe_path);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_all_bits_for_a_writable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = probe(dir.path());
        assert_eq!(
            result,
            PathAccessibility {
                is_accessible: true,
                has_read: true,
                has_write: true,
            }
        );
    }

    #[test]
    fn reports_inaccessible_for_a_missing_path() {
        let result = probe(Path::new("/does/not/exist/at/all"));
        assert_eq!(result, PathAccessibility::default());
    }

    #[cfg(unix)]
    #[test]
    fn reports_no_write_for_a_read_only_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let mut perms = std::fs::metadata(dir.path()).unwrap().permissions();
        perms.set_mode(0o555);
        std::fs::set_permissions(dir.path(), perms.clone()).unwrap();

        let result = probe(dir.path());

        // Restore so tempfile can clean up.
        perms.set_mode(0o755);
        std::fs::set_permissions(dir.path(), perms).unwrap();

        assert!(result.is_accessible);
        assert!(!result.has_write);
    }
}
