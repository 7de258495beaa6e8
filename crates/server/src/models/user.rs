use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::ValidationError;

const USER_DISPLAY_NAME_LENGTH_LIMIT: usize = 80;
const USER_EMAIL_LENGTH_LIMIT: usize = 254;

#[derive(
    Clone, Debug, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UserRole {
    Student,
    #[serde(alias = "teacher")]
    #[strum(to_string = "instructor", serialize = "teacher")]
    Instructor,
    Dco,
}

impl UserRole {
    /// Privileged roles may edit or delete any resource of their course.
    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Instructor | Self::Dco)
    }
}

/// Who is performing an action. Supplied by the authentication layer and
/// treated as read-only here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActingUser {
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

impl ActingUser {
    pub fn new(email: &str, display_name: &str, role: UserRole) -> Self {
        Self {
            email: email.to_string(),
            display_name: display_name.to_string(),
            role,
        }
    }
}

pub fn validate_user_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField { field: "email" });
    }
    if email.trim().len() != email.len() || !email.contains('@') {
        return Err(ValidationError::InvalidInput {
            value: email.to_string(),
            reason: "email should look like `name@domain` without surrounding whitespace"
                .to_string(),
        });
    }
    if email.len() > USER_EMAIL_LENGTH_LIMIT {
        return Err(ValidationError::LimitExceeded {
            subject: "user email".to_string(),
            unit: "char".to_string(),
            attempted: email.len(),
            limit: USER_EMAIL_LENGTH_LIMIT,
        });
    }
    Ok(())
}

pub fn validate_user_display_name(display_name: &str) -> Result<(), ValidationError> {
    if display_name.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "displayName",
        });
    }
    if display_name.chars().count() > USER_DISPLAY_NAME_LENGTH_LIMIT {
        return Err(ValidationError::LimitExceeded {
            subject: "user display name".to_string(),
            unit: "char".to_string(),
            attempted: display_name.chars().count(),
            limit: USER_DISPLAY_NAME_LENGTH_LIMIT,
        });
    }
    Ok(())
}
