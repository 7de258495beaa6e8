use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("missing identity header `{0}`")]
    MissingHeader(&'static str),
    #[error("malformed identity header `{0}`")]
    MalformedHeader(&'static str),
    #[error("unknown role `{0}`")]
    UnknownRole(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::MissingHeader(_) => StatusCode::UNAUTHORIZED,
            Self::MalformedHeader(_) | Self::UnknownRole(_) => StatusCode::BAD_REQUEST,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        match serde_json::to_string(&body) {
            Ok(body) => (status, body).into_response(),
            Err(_) => status.into_response(),
        }
    }
}
