use std::str::FromStr;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tracing::debug;

use crate::auth::error::IdentityError;
use crate::models::user::{validate_user_display_name, validate_user_email, ActingUser, UserRole};

pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ROLE_HEADER: &str = "x-user-role";

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<Option<&'a str>, IdentityError> {
    headers
        .get(name)
        .map(|value| {
            value.to_str().map_err(|_| {
                debug!("malformed identity header {name}: not visible ascii");
                IdentityError::MalformedHeader(name)
            })
        })
        .transpose()
}

/// Builds the acting user from the headers set by the authentication proxy.
/// The display name falls back to the email when absent.
pub fn acting_user_from_headers(headers: &HeaderMap) -> Result<ActingUser, IdentityError> {
    let email = header(headers, USER_EMAIL_HEADER)?
        .ok_or(IdentityError::MissingHeader(USER_EMAIL_HEADER))?
        .trim();
    validate_user_email(email).map_err(|e| {
        debug!("rejected identity email: {e}");
        IdentityError::MalformedHeader(USER_EMAIL_HEADER)
    })?;
    let role = header(headers, USER_ROLE_HEADER)?
        .ok_or(IdentityError::MissingHeader(USER_ROLE_HEADER))?;
    let role = UserRole::from_str(role.trim()).map_err(|_| {
        debug!("unknown role in identity header: {role}");
        IdentityError::UnknownRole(role.to_string())
    })?;
    let display_name = header(headers, USER_NAME_HEADER)?
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(email);
    validate_user_display_name(display_name).map_err(|e| {
        debug!("rejected identity display name: {e}");
        IdentityError::MalformedHeader(USER_NAME_HEADER)
    })?;
    Ok(ActingUser::new(email, display_name, role))
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        acting_user_from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn reads_full_identity() {
        let user = acting_user_from_headers(&headers(&[
            (USER_EMAIL_HEADER, "a@x.com"),
            (USER_NAME_HEADER, "Ada"),
            (USER_ROLE_HEADER, "teacher"),
        ]))
        .unwrap();
        assert_eq!(user, ActingUser::new("a@x.com", "Ada", UserRole::Instructor));
    }

    #[test]
    fn name_defaults_to_email() {
        let user = acting_user_from_headers(&headers(&[
            (USER_EMAIL_HEADER, "a@x.com"),
            (USER_ROLE_HEADER, "student"),
        ]))
        .unwrap();
        assert_eq!(user.display_name, "a@x.com");
    }

    #[test]
    fn rejects_missing_or_bad_values() {
        assert!(matches!(
            acting_user_from_headers(&headers(&[(USER_ROLE_HEADER, "student")])),
            Err(IdentityError::MissingHeader(USER_EMAIL_HEADER))
        ));
        assert!(matches!(
            acting_user_from_headers(&headers(&[(USER_EMAIL_HEADER, "a@x.com")])),
            Err(IdentityError::MissingHeader(USER_ROLE_HEADER))
        ));
        assert!(matches!(
            acting_user_from_headers(&headers(&[
                (USER_EMAIL_HEADER, "a@x.com"),
                (USER_ROLE_HEADER, "janitor"),
            ])),
            Err(IdentityError::UnknownRole(role)) if role == "janitor"
        ));
        assert!(matches!(
            acting_user_from_headers(&headers(&[
                (USER_EMAIL_HEADER, "not-an-email"),
                (USER_ROLE_HEADER, "student"),
            ])),
            Err(IdentityError::MalformedHeader(USER_EMAIL_HEADER))
        ));
    }
}
