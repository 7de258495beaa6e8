use std::path::Path;

use tracing::{info, instrument};

use crate::error::StorageError;
use crate::models::course::CourseCatalog;

/// Reads the course catalog seed file. Unlike saved resources, a broken
/// catalog is reported to the caller rather than replaced with an empty one.
#[instrument]
pub async fn load_catalog(path: &Path) -> Result<CourseCatalog, StorageError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let catalog: CourseCatalog =
        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            key: path.display().to_string(),
            source,
        })?;
    info!("loaded catalog with {} course(s)", catalog.courses.len());
    Ok(catalog)
}
