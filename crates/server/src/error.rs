use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::models::resource::ResourceId;
use crate::models::user::UserRole;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error("course `{0}` doesn't exist")]
    CourseNotFound(String),
    #[error("insufficient permissions for action, current role: {current}")]
    InsufficientPermissions { current: UserRole },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Clone, Debug, Error)]
pub enum ValidationError {
    #[error("required field `{field}` is missing or empty")]
    MissingField { field: &'static str },
    #[error("input value is invalid: `{value}`, reason: {reason}")]
    InvalidInput { value: String, reason: String },
    #[error("limit exceeded for {subject}, allowed {limit} {unit}(s), got {attempted}")]
    LimitExceeded {
        subject: String,
        unit: String,
        attempted: usize,
        limit: usize,
    },
    #[error("no free {subject} id is left")]
    IdsExhausted { subject: &'static str },
}

/// Failure of a create, update or remove against a resource collection. The
/// collection is left untouched whenever one of these is returned.
#[derive(Clone, Debug, Error)]
pub enum CollectionError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("`{actor}` is not allowed to modify resource {id}")]
    PermissionDenied { actor: String, id: ResourceId },
    #[error("resource {id} doesn't exist")]
    NotFound { id: ResourceId },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("stored entry `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    #[error("no free id is left in entry `{key}`")]
    IdsExhausted { key: String },
    #[error("unable to encode entry `{key}`: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::Storage(e) => {
                error!("storage failure while serving request: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
            Self::Collection(e) => match e {
                CollectionError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
                e @ CollectionError::PermissionDenied { .. } => {
                    (StatusCode::FORBIDDEN, e.to_string())
                }
                e @ CollectionError::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
            },
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            e @ Self::CourseNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
            e @ Self::InsufficientPermissions { .. } => (StatusCode::FORBIDDEN, e.to_string()),
        };
        let error = json!({ "error": error }).to_string();
        (status, error).into_response()
    }
}
