//! Caller identity extraction.
//!
//! Credentials are verified upstream; the authenticator forwards the
//! verified identity in trusted headers.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use quizhub_core::identity::Identity;

use crate::error::ErrorBody;

/// Header carrying the caller's email.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Header carrying the caller's display name. Falls back to the email.
pub const USER_NAME_HEADER: &str = "x-user-name";

/// The verified caller of a request.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

/// Rejection for requests without an identity.
#[derive(Debug)]
pub struct Unauthenticated;

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        ErrorBody::respond(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            format!("missing {USER_EMAIL_HEADER} header"),
        )
    }
}

fn header(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Unauthenticated;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = header(parts, USER_EMAIL_HEADER).ok_or(Unauthenticated)?;
        let display_name = header(parts, USER_NAME_HEADER).unwrap_or_else(|| email.clone());
        Ok(Self(Identity::new(email, display_name)))
    }
}
