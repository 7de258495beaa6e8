use std::fs;
use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::error::StorageError;
use crate::storage::{map_not_found_as_none, KeyValueStore};

/// One file per entry inside `dir`. Writes go to a sibling temp file which is
/// then renamed over the entry, so readers never observe a half-written value.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key);
        map_not_found_as_none(fs::read_to_string(&path))
            .map_err(|source| StorageError::Io { path, source })
    }

    #[instrument(skip(self, value))]
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&staging, value).map_err(|source| StorageError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("replaced entry at {path:?}, {} bytes", value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key);
        map_not_found_as_none(fs::remove_file(&path))
            .map(|_| ())
            .map_err(|source| StorageError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.read("savedResources").unwrap(), None);
    }

    #[test]
    fn write_replaces_whole_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();

        store.write("entry", "[1,2,3]").unwrap();
        store.write("entry", "[]").unwrap();

        assert_eq!(store.read("entry").unwrap().as_deref(), Some("[]"));
        assert!(!dir.path().join("nested/.entry.json.tmp").exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.write("entry", "{}").unwrap();
        store.remove("entry").unwrap();
        store.remove("entry").unwrap();

        assert_eq!(store.read("entry").unwrap(), None);
    }
}
