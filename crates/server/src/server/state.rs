use std::sync::Arc;

use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::engine::bookmarks::BookmarkStore;
use crate::engine::mutation::ResourceCollection;
use crate::engine::permission::PermissionPolicy;
use crate::engine::refresh::LatestRequest;
use crate::error::{CollectionError, RequestError, ValidationError};
use crate::models::announcement::{aggregate, Announcement};
use crate::models::course::{Course, CourseCatalog};
use crate::models::resource::{Resource, ResourceId};
use crate::storage::catalog::load_catalog;
use crate::storage::file::FileStore;
use crate::storage::memory::MemoryStore;
use crate::storage::KeyValueStore;

pub struct CourseEntry {
    pub course: Course,
    pub resources: ResourceCollection,
    pub announcements: Vec<Announcement>,
}

pub struct AppState {
    pub config: AppConfig,
    pub policy: PermissionPolicy,
    /// Keyed by course title.
    pub courses: DashMap<String, CourseEntry>,
    pub bookmarks: Mutex<BookmarkStore>,
    catalog_requests: LatestRequest,
}

impl AppState {
    pub async fn try_init(config: &AppConfig) -> anyhow::Result<Self> {
        let backend: Arc<dyn KeyValueStore> = match &config.storage.data_dir {
            Some(dir) => Arc::new(FileStore::open(dir.clone())?),
            None => {
                warn!("no storage.data_dir configured, saved resources won't survive a restart");
                Arc::new(MemoryStore::default())
            }
        };
        let state = Self::new(config.clone(), backend);
        if config.catalog.path.is_some() {
            state.reload_catalog().await?;
        }
        Ok(state)
    }

    pub fn new(config: AppConfig, bookmarks_backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            policy: PermissionPolicy::new(config.permissions.privileged_emails.iter().cloned()),
            config,
            courses: DashMap::new(),
            bookmarks: Mutex::new(BookmarkStore::load(bookmarks_backend)),
            catalog_requests: LatestRequest::default(),
        }
    }

    /// Replaces every course with the content of `catalog`. A catalog with a
    /// repeated resource id inside one course is rejected and nothing changes.
    pub fn install_catalog(&self, catalog: CourseCatalog) -> Result<(), ValidationError> {
        let entries = course_entries(catalog)?;
        self.replace_courses(entries);
        Ok(())
    }

    fn replace_courses(&self, entries: Vec<CourseEntry>) {
        self.courses.clear();
        let mut resources = 0;
        for entry in entries {
            if entry.resources.is_empty() {
                debug!("course {} has no resources", entry.course.title);
            }
            resources += entry.resources.len();
            self.courses.insert(entry.course.title.clone(), entry);
        }
        info!(
            "installed catalog with {} course(s), {resources} resource(s)",
            self.courses.len()
        );
    }

    /// Re-reads the configured catalog file. Returns `false` when a newer
    /// reload started meanwhile and this one was discarded.
    pub async fn reload_catalog(&self) -> Result<bool, RequestError> {
        let Some(path) = self.config.catalog.path.as_deref() else {
            return Err(ValidationError::InvalidInput {
                value: "catalog.path".to_string(),
                reason: "no catalog file is configured".to_string(),
            }
            .into());
        };
        let token = self.catalog_requests.begin();
        let catalog = load_catalog(path).await?;
        if !self.catalog_requests.is_current(&token) {
            debug!("newer catalog reload started, skipping this one");
            return Ok(false);
        }
        let entries = course_entries(catalog)?;
        Ok(self
            .catalog_requests
            .commit(&token, || self.replace_courses(entries))
            .is_some())
    }

    pub fn sorted_courses(&self) -> Vec<Course> {
        let mut courses: Vec<Course> = self.courses.iter().map(|e| e.course.clone()).collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        courses
    }

    pub fn course_mut(&self, title: &str) -> Result<RefMut<'_, String, CourseEntry>, RequestError> {
        self.courses
            .get_mut(title)
            .ok_or_else(|| RequestError::CourseNotFound(title.to_string()))
    }

    /// Copies of the course and one of its resources, for snapshotting.
    pub fn resource(
        &self,
        title: &str,
        id: ResourceId,
    ) -> Result<(Course, Resource), RequestError> {
        let entry = self
            .courses
            .get(title)
            .ok_or_else(|| RequestError::CourseNotFound(title.to_string()))?;
        let resource = entry
            .resources
            .get(id)
            .cloned()
            .ok_or(CollectionError::NotFound { id })?;
        Ok((entry.course.clone(), resource))
    }

    pub fn course_announcements(&self, title: &str) -> Result<Vec<Announcement>, RequestError> {
        let entry = self
            .courses
            .get(title)
            .ok_or_else(|| RequestError::CourseNotFound(title.to_string()))?;
        Ok(aggregate([(&entry.course, entry.announcements.as_slice())]))
    }

    /// Announcements of every course, tagged with their course, courses in
    /// title order.
    pub fn all_announcements(&self) -> Vec<Announcement> {
        let mut per_course: Vec<(Course, Vec<Announcement>)> = self
            .courses
            .iter()
            .map(|e| (e.course.clone(), e.announcements.clone()))
            .collect();
        per_course.sort_by(|a, b| a.0.title.cmp(&b.0.title));
        aggregate(
            per_course
                .iter()
                .map(|(course, announcements)| (course, announcements.as_slice())),
        )
    }
}

fn course_entries(catalog: CourseCatalog) -> Result<Vec<CourseEntry>, ValidationError> {
    catalog
        .courses
        .into_iter()
        .map(|seed| {
            let resources = ResourceCollection::new(seed.resources).map_err(|e| {
                warn!("rejecting catalog, course {}: {e}", seed.course.title);
                e
            })?;
            Ok(CourseEntry {
                course: seed.course,
                resources,
                announcements: seed.announcements,
            })
        })
        .collect()
}
