//! Named-entry persistence. Entries are whole JSON documents, there is no
//! partial update: writers replace the full value.

use crate::error::StorageError;

pub mod catalog;
pub mod file;
pub mod memory;

pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when the entry was never written.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub fn map_not_found_as_none<T>(result: std::io::Result<T>) -> std::io::Result<Option<T>> {
    match result {
        Ok(ok) => Ok(Some(ok)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
