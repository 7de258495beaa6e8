use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::course::Course;
use crate::models::date::flexible;
use crate::models::resource::{Resource, ResourceId, ResourceType};

pub type BookmarkId = i64;

/// A user-local snapshot of a resource. Later edits or deletion of the source
/// resource do not propagate here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResource {
    pub id: BookmarkId,
    pub resource_id: ResourceId,
    pub course_title: String,
    pub course_name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(with = "flexible")]
    pub date: DateTime<Utc>,
    #[serde(with = "flexible")]
    pub saved_at: DateTime<Utc>,
}

impl SavedResource {
    pub fn snapshot(
        id: BookmarkId,
        resource: &Resource,
        course: &Course,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            resource_id: resource.id,
            course_title: course.title.clone(),
            course_name: course.name.clone(),
            title: resource.title.clone(),
            kind: resource.kind,
            description: resource.description.clone(),
            image_url: resource.image_url.clone(),
            link: resource.link.clone(),
            creator: resource.creator.clone().or_else(|| resource.author.clone()),
            date: resource.date,
            saved_at,
        }
    }

    pub fn matches(&self, course_title: &str, resource_id: ResourceId) -> bool {
        self.course_title == course_title && self.resource_id == resource_id
    }
}
