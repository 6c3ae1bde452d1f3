use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StoreError;
use crate::paths::snapshot_file_name;
use crate::schema::Snapshot;

/// Key under which the chat snapshot is stored.
pub const STORAGE_KEY: &str = "chat-storage";

/// Key/value backend holding serialized snapshots.
pub trait SnapshotStorage: Send + fmt::Debug {
    /// Returns the stored text, or `None` when nothing was saved under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save(&self, key: &str, contents: &str) -> Result<(), StoreError>;
}

pub fn encode_snapshot(snapshot: &Snapshot) -> Result<String, StoreError> {
    serde_json::to_string(snapshot).map_err(StoreError::SnapshotSerialize)
}

pub fn decode_snapshot(key: &str, contents: &str) -> Result<Snapshot, StoreError> {
    serde_json::from_str(contents).map_err(|source| StoreError::snapshot_parse(key, source))
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(snapshot_file_name(key))
    }
}

impl SnapshotStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::io("reading snapshot", path, source)),
        }
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .map_err(|source| StoreError::io("creating storage directory", &self.root, source))?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        write_synced(&tmp_path, contents)?;

        fs::rename(&tmp_path, &path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::io("replacing snapshot", &path, source)
        })
    }
}

fn write_synced(path: &Path, contents: &str) -> Result<(), StoreError> {
    let mut file: File = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|source| StoreError::io("creating temporary snapshot", path, source))?;
    file.write_all(contents.as_bytes())
        .map_err(|source| StoreError::io("writing temporary snapshot", path, source))?;
    file.sync_all()
        .map_err(|source| StoreError::io("syncing temporary snapshot", path, source))
}

/// In-process storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, contents: impl Into<String>) {
        self.entries().insert(key.into(), contents.into());
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        self.insert(key, contents);
        Ok(())
    }
}
