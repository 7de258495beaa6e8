use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::course::Course;
use crate::models::date::flexible;

/// A course-scoped broadcast message. Read-only here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub title: String,
    pub content: String,
    #[serde(with = "flexible")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub important: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
}

impl Announcement {
    pub fn with_course(mut self, course: &Course) -> Self {
        self.course_title = Some(course.title.clone());
        self.course_name = Some(course.name.clone());
        self
    }
}

/// Flattens per-course announcements into one collection, tagging each with
/// its course. Course order is kept, so equal dates stay grouped by course.
pub fn aggregate<'a, I>(courses: I) -> Vec<Announcement>
where
    I: IntoIterator<Item = (&'a Course, &'a [Announcement])>,
{
    courses
        .into_iter()
        .flat_map(|(course, announcements)| {
            announcements
                .iter()
                .cloned()
                .map(move |announcement| announcement.with_course(course))
        })
        .collect()
}
