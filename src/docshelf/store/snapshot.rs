use super::{Snapshot, SnapshotStore};
use crate::error::{Result, ShelfError};
use crate::model::DocumentRecord;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SNAPSHOT_FILENAME: &str = "catalog.json";

/// Accepts both the current envelope and a bare array of records.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSnapshot {
    Envelope(Snapshot),
    Bare(Vec<DocumentRecord>),
}

pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Snapshot stored as `catalog.json` inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SNAPSHOT_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(ShelfError::Io)?;
        let stored: StoredSnapshot =
            serde_json::from_str(&content).map_err(ShelfError::Serialization)?;

        let snapshot = match stored {
            StoredSnapshot::Envelope(snapshot) => snapshot,
            StoredSnapshot::Bare(documents) => {
                let saved_at = fs::metadata(&self.path)
                    .and_then(|m| m.modified())
                    .map(Into::into)
                    .unwrap_or_else(|_| chrono::Utc::now());
                Snapshot {
                    saved_at,
                    documents,
                }
            }
        };
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(ShelfError::Io)?;
        }

        let content = serde_json::to_string_pretty(snapshot).map_err(ShelfError::Serialization)?;

        let tmp_file = dir.join(format!(".catalog-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(ShelfError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, &self.path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(ShelfError::Io(e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn docs() -> Vec<DocumentRecord> {
        vec![
            DocumentRecord::new("id1", "Planta", "PROY-2044_DW_01")
                .with_classification("Área 2044", "Plano"),
            DocumentRecord::new("id2", "Memoria", "GENERICO_MC_REV1")
                .with_classification("General", "Memoria"),
        ]
    }

    #[test]
    fn missing_file_is_no_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_restores_documents() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::in_dir(dir.path());
        let snapshot = Snapshot::new(docs());

        store.save(&snapshot).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded.documents, snapshot.documents);
        assert_eq!(loaded.saved_at, snapshot.saved_at);
    }

    #[test]
    fn save_creates_parent_directory_and_leaves_no_tmp() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let store = FileSnapshotStore::in_dir(&data_dir);

        store.save(&Snapshot::new(docs())).unwrap();

        let names: Vec<String> = fs::read_dir(&data_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![SNAPSHOT_FILENAME.to_string()]);
    }

    #[test]
    fn bare_array_is_accepted() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::in_dir(dir.path());
        fs::write(
            store.path(),
            r#"[{"remote_id": "id1", "title": "t", "file_name": "f"}]"#,
        )
        .unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.documents.len(), 1);
        assert_eq!(loaded.documents[0].remote_id, "id1");
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(ShelfError::Serialization(_))));
    }
}
