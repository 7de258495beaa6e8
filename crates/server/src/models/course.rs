use serde::{Deserialize, Serialize};

use crate::models::announcement::Announcement;
use crate::models::resource::Resource;

/// `title` is the course's short identifier (e.g. `CS101`), `name` its display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub title: String,
    pub name: String,
}

impl Course {
    pub fn new(title: &str, name: &str) -> Self {
        Self {
            title: title.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSeed {
    #[serde(flatten)]
    pub course: Course,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub announcements: Vec<Announcement>,
}

/// Snapshot of every course with its resources and announcements, as served by
/// the course backend.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CourseCatalog {
    #[serde(default)]
    pub courses: Vec<CourseSeed>,
}
