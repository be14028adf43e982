// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! 4.B Sidecar Codec — reads and writes the two `tanaste.xml` shapes.
//! Writes are atomic (temp file + fsync + rename); reads return `None` for
//! anything that doesn't look like the expected shape rather than an error,
//! since a malformed sidecar must never abort a Great Inhale scan.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;

pub const SIDECAR_FILE_NAME: &str = "tanaste.xml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename = "tanaste-hub")]
pub struct HubSidecar {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikidata_qid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub franchise: Option<String>,
    pub last_organized: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserLock {
    pub key: String,
    pub value: String,
    pub locked_at: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserLocks {
    #[serde(default, rename = "lock")]
    pub entries: Vec<UserLock>,
}

fn default_cover_path() -> String {
    "cover.jpg".to_owned()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename = "tanaste-edition")]
pub struct EditionSidecar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,
    pub content_hash: String,
    #[serde(default = "default_cover_path")]
    pub cover_path: String,
    #[serde(default)]
    pub user_locks: UserLocks,
    pub last_organized: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SidecarError {
    #[error("failed to create temp file next to {0}: {1}")]
    CreateTemp(PathBuf, std::io::Error),
    #[error("failed to write sidecar contents: {0}")]
    Write(std::io::Error),
    #[error("failed to sync sidecar contents: {0}")]
    Sync(std::io::Error),
    #[error("failed to rename temp file into place at {0}: {1}")]
    Rename(PathBuf, std::io::Error),
    #[error("failed to serialize sidecar: {0}")]
    Serialize(#[from] quick_xml::se::SeError),
}

/// Thread-safe per-path write serialization, keyed by the folder the
/// sidecar lives in.
#[derive(Debug, Default)]
pub struct SidecarCodec {
    path_locks: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl SidecarCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, path: &Path) -> Arc<AsyncMutex<()>> {
        let mut locks = self.path_locks.lock().expect("lock table poisoned");
        locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Reads the sidecar at `folder`/`tanaste.xml` as a hub sidecar.
    /// Returns `None` if the file is missing, unreadable, or the root
    /// element doesn't match `<tanaste-hub>` — never an error.
    #[must_use]
    pub fn read_hub(&self, folder: &Path) -> Option<HubSidecar> {
        let text = std::fs::read_to_string(folder.join(SIDECAR_FILE_NAME)).ok()?;
        quick_xml::de::from_str(&text).ok()
    }

    #[must_use]
    pub fn read_edition(&self, folder: &Path) -> Option<EditionSidecar> {
        let text = std::fs::read_to_string(folder.join(SIDECAR_FILE_NAME)).ok()?;
        quick_xml::de::from_str(&text).ok()
    }

    pub async fn write_hub(&self, folder: &Path, sidecar: &HubSidecar) -> Result<(), SidecarError> {
        let body = quick_xml::se::to_string(sidecar)?;
        self.write_atomic(folder, &body).await
    }

    pub async fn write_edition(
        &self,
        folder: &Path,
        sidecar: &EditionSidecar,
    ) -> Result<(), SidecarError> {
        let body = quick_xml::se::to_string(sidecar)?;
        self.write_atomic(folder, &body).await
    }

    async fn write_atomic(&self, folder: &Path, xml_body: &str) -> Result<(), SidecarError> {
        let final_path = folder.join(SIDECAR_FILE_NAME);
        let lock = self.lock_for(&final_path);
        let _guard = lock.lock().await;

        let contents = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n",
            indent_two_spaces(xml_body)
        );

        let temp_path = folder.join(format!(".{SIDECAR_FILE_NAME}.{}.tmp", uuid::Uuid::new_v4()));
        {
            let mut temp_file = std::fs::File::create(&temp_path)
                .map_err(|e| SidecarError::CreateTemp(temp_path.clone(), e))?;
            use std::io::Write as _;
            temp_file
                .write_all(contents.as_bytes())
                .map_err(SidecarError::Write)?;
            temp_file.sync_all().map_err(SidecarError::Sync)?;
        }
        std::fs::rename(&temp_path, &final_path)
            .map_err(|e| SidecarError::Rename(final_path.clone(), e))?;
        Ok(())
    }
}

/// `quick-xml`'s serializer emits a single line; re-indent it two spaces
/// per nesting level with LF endings, per `spec.md` §6.
fn indent_two_spaces(xml: &str) -> String {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut writer = quick_xml::Writer::new_with_indent(Vec::new(), b' ', 2);
    loop {
        match reader.read_event() {
            Ok(quick_xml::events::Event::Eof) => break,
            Ok(event) => {
                writer.write_event(event).expect("writing to an in-memory buffer cannot fail");
            }
            Err(_) => return xml.to_owned(),
        }
    }
    String::from_utf8(writer.into_inner()).unwrap_or_else(|_| xml.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_hub_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let codec = SidecarCodec::new();
        let sidecar = HubSidecar {
            display_name: "The Hobbit".to_owned(),
            year: Some(1937),
            wikidata_qid: Some("Q74287".to_owned()),
            franchise: Some("Middle-earth".to_owned()),
            last_organized: "2026-01-01T00:00:00Z".to_owned(),
        };
        codec.write_hub(dir.path(), &sidecar).await.unwrap();
        let read_back = codec.read_hub(dir.path()).unwrap();
        assert_eq!(read_back, sidecar);
    }

    #[tokio::test]
    async fn round_trips_an_edition_sidecar_with_user_locks() {
        let dir = tempfile::tempdir().unwrap();
        let codec = SidecarCodec::new();
        let sidecar = EditionSidecar {
            title: Some("The Hobbit".to_owned()),
            author: Some("J.R.R. Tolkien".to_owned()),
            media_type: Some("Epub".to_owned()),
            isbn: None,
            asin: None,
            content_hash: "a".repeat(64),
            cover_path: "cover.jpg".to_owned(),
            user_locks: UserLocks {
                entries: vec![UserLock {
                    key: "title".to_owned(),
                    value: "The Hobbit (Special Edition)".to_owned(),
                    locked_at: "2026-01-01T00:00:00Z".to_owned(),
                }],
            },
            last_organized: "2026-01-01T00:00:00Z".to_owned(),
        };
        codec.write_edition(dir.path(), &sidecar).await.unwrap();
        let read_back = codec.read_edition(dir.path()).unwrap();
        assert_eq!(read_back, sidecar);
    }

    #[test]
    fn read_returns_none_for_malformed_xml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SIDECAR_FILE_NAME), "not xml at all <<<").unwrap();
        let codec = SidecarCodec::new();
        assert!(codec.read_hub(dir.path()).is_none());
    }

    #[test]
    fn read_returns_none_for_the_wrong_root_shape() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SIDECAR_FILE_NAME),
            "<tanaste-edition><content_hash>aa</content_hash><cover_path>cover.jpg</cover_path><last_organized>x</last_organized></tanaste-edition>",
        )
        .unwrap();
        let codec = SidecarCodec::new();
        assert!(codec.read_hub(dir.path()).is_none());
    }
}
