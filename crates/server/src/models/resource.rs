use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::ValidationError;
use crate::models::date::{flexible, parse_date};
use crate::models::user::{ActingUser, UserRole};

pub type ResourceId = i64;

const RESOURCE_TITLE_LENGTH_LIMIT: usize = 200;
const RESOURCE_DESCRIPTION_LENGTH_LIMIT: usize = 5000;

#[derive(
    Clone,
    Debug,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceType {
    Book,
    Video,
    Tool,
    #[default]
    Article,
    Documentation,
    Course,
    Dataset,
    Cheatsheet,
    Practice,
    Community,
}

/// A supplemental learning item attached to a course.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub description: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(with = "flexible")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_email: Option<String>,
}

/// Body of a create or edit request. Contributor attribution is never taken
/// from here, it comes from the acting user.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInput {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: ResourceType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub read_time: Option<String>,
}

/// Input that passed validation, with its date resolved.
#[derive(Clone, Debug)]
pub struct ValidResourceInput {
    input: ResourceInput,
    date: Option<DateTime<Utc>>,
}

fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(())
}

fn validate_length(subject: &str, value: &str, limit: usize) -> Result<(), ValidationError> {
    let attempted = value.chars().count();
    if attempted > limit {
        return Err(ValidationError::LimitExceeded {
            subject: subject.to_string(),
            unit: "char".to_string(),
            attempted,
            limit,
        });
    }
    Ok(())
}

/// Blank optional fields are treated as absent, the way the form submits them.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ResourceInput {
    pub fn validate(self) -> Result<ValidResourceInput, ValidationError> {
        validate_required("title", &self.title)?;
        validate_required("description", &self.description)?;
        validate_required("link", &self.link)?;
        validate_length("resource title", &self.title, RESOURCE_TITLE_LENGTH_LIMIT)?;
        validate_length(
            "resource description",
            &self.description,
            RESOURCE_DESCRIPTION_LENGTH_LIMIT,
        )?;
        let date = match non_blank(self.date.clone()) {
            Some(raw) => Some(parse_date(&raw).ok_or_else(|| ValidationError::InvalidInput {
                value: raw.clone(),
                reason: "date should be `YYYY-MM-DD` or an ISO 8601 timestamp".to_string(),
            })?),
            None => None,
        };
        Ok(ValidResourceInput { input: self, date })
    }
}

impl Resource {
    /// Builds a new record attributed to `contributor`. A missing date means "today".
    pub fn from_input(id: ResourceId, input: ValidResourceInput, contributor: &ActingUser) -> Self {
        let date = input.date.unwrap_or_else(Utc::now);
        let input = input.input;
        Self {
            id,
            title: input.title.trim().to_string(),
            kind: input.kind,
            description: input.description.trim().to_string(),
            link: input.link.trim().to_string(),
            image_url: non_blank(input.image_url),
            author: non_blank(input.author),
            creator: non_blank(input.creator),
            date,
            duration: non_blank(input.duration),
            read_time: non_blank(input.read_time),
            contributor_name: Some(contributor.display_name.clone()),
            contributor_role: Some(contributor.role),
            contributor_email: Some(contributor.email.clone()),
        }
    }

    /// Replaces the editable fields, keeping `id` and contributor attribution.
    /// A missing date keeps the current one.
    pub fn apply(&mut self, input: ValidResourceInput) {
        if let Some(date) = input.date {
            self.date = date;
        }
        let input = input.input;
        self.title = input.title.trim().to_string();
        self.kind = input.kind;
        self.description = input.description.trim().to_string();
        self.link = input.link.trim().to_string();
        self.image_url = non_blank(input.image_url);
        self.author = non_blank(input.author);
        self.creator = non_blank(input.creator);
        self.duration = non_blank(input.duration);
        self.read_time = non_blank(input.read_time);
    }
}
