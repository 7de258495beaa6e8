//! The browsing user's saved resources.
//!
//! Stored as one JSON array under [`SAVED_RESOURCES_KEY`]. Every write re-reads
//! the latest committed entry, edits it and replaces it whole. Two processes
//! sharing the same backing store are not serialized: the last writer wins.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::engine::ids::IdGenerator;
use crate::error::StorageError;
use crate::models::bookmark::SavedResource;
use crate::models::course::Course;
use crate::models::resource::{Resource, ResourceId};
use crate::server::constants::SAVED_RESOURCES_KEY;
use crate::storage::KeyValueStore;

pub struct BookmarkStore {
    backend: Arc<dyn KeyValueStore>,
    entries: Vec<SavedResource>,
    ids: IdGenerator,
}

impl BookmarkStore {
    /// Opens the store and loads whatever is persisted. Never fails: an
    /// unreadable entry is logged and the store starts empty.
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            backend,
            entries: Vec::new(),
            ids: IdGenerator::default(),
        };
        store.reload();
        store
    }

    /// Picks up the latest committed entry. If the backend can't be read the
    /// entries already in memory are kept.
    pub fn reload(&mut self) {
        if let Err(e) = self.refresh() {
            warn!("unable to read saved resources, keeping current ones: {e}");
        }
    }

    /// Like [`Self::reload`] but fails when the backend can't be read, so a
    /// write never builds on an entry it didn't see.
    fn refresh(&mut self) -> Result<(), StorageError> {
        self.entries = read_committed(self.backend.as_ref())?;
        self.ids = IdGenerator::seeded(self.entries.iter().map(|e| e.id));
        Ok(())
    }

    pub fn list(&self) -> &[SavedResource] {
        &self.entries
    }

    pub fn is_saved(&self, course_title: &str, resource_id: ResourceId) -> bool {
        self.find(course_title, resource_id).is_some()
    }

    fn find(&self, course_title: &str, resource_id: ResourceId) -> Option<&SavedResource> {
        self.entries
            .iter()
            .find(|e| e.matches(course_title, resource_id))
    }

    /// Saves a snapshot of `resource`. Saving an already saved resource is a
    /// no-op returning the existing snapshot.
    #[instrument(skip_all, fields(course = %course.title, resource = resource.id))]
    pub fn save(
        &mut self,
        resource: &Resource,
        course: &Course,
    ) -> Result<SavedResource, StorageError> {
        self.refresh()?;
        if let Some(existing) = self.find(&course.title, resource.id) {
            debug!("resource already saved");
            return Ok(existing.clone());
        }
        let entries = &self.entries;
        let id = self
            .ids
            .next_id(|candidate| entries.iter().any(|e| e.id == candidate))
            .ok_or_else(|| StorageError::IdsExhausted {
                key: SAVED_RESOURCES_KEY.to_string(),
            })?;
        let saved = SavedResource::snapshot(id, resource, course, Utc::now());
        let mut next = self.entries.clone();
        next.push(saved.clone());
        self.persist(next)?;
        info!("saved resource");
        Ok(saved)
    }

    /// Removing something that isn't saved is a no-op.
    #[instrument(skip(self))]
    pub fn unsave(&mut self, course_title: &str, resource_id: ResourceId) -> Result<(), StorageError> {
        self.refresh()?;
        if !self.is_saved(course_title, resource_id) {
            return Ok(());
        }
        let next = self
            .entries
            .iter()
            .filter(|e| !e.matches(course_title, resource_id))
            .cloned()
            .collect();
        self.persist(next)?;
        info!("removed saved resource");
        Ok(())
    }

    /// Flips the saved state, returning `true` when the resource ends up saved.
    pub fn toggle(&mut self, resource: &Resource, course: &Course) -> Result<bool, StorageError> {
        self.refresh()?;
        if self.is_saved(&course.title, resource.id) {
            self.unsave(&course.title, resource.id)?;
            Ok(false)
        } else {
            self.save(resource, course)?;
            Ok(true)
        }
    }

    /// Drops the persisted entry altogether.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.backend.remove(SAVED_RESOURCES_KEY)?;
        self.entries.clear();
        Ok(())
    }

    /// Replaces the persisted entry with `entries`, then adopts them.
    pub fn persist(&mut self, entries: Vec<SavedResource>) -> Result<(), StorageError> {
        let encoded =
            serde_json::to_string(&entries).map_err(|source| StorageError::Encode {
                key: SAVED_RESOURCES_KEY.to_string(),
                source,
            })?;
        self.backend.write(SAVED_RESOURCES_KEY, &encoded)?;
        self.entries = entries;
        Ok(())
    }
}

/// A missing or corrupt entry reads as empty. Failing to read at all is an
/// error.
fn read_committed(backend: &dyn KeyValueStore) -> Result<Vec<SavedResource>, StorageError> {
    let Some(raw) = backend.read(SAVED_RESOURCES_KEY)? else {
        return Ok(Vec::new());
    };
    Ok(serde_json::from_str(&raw).unwrap_or_else(|source| {
        let e = StorageError::Corrupt {
            key: SAVED_RESOURCES_KEY.to_string(),
            source,
        };
        warn!("{e}, starting empty");
        Vec::new()
    }))
}
