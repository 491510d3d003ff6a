use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use kernel::prelude::entity::{Identity, UserId};
use uuid::Uuid;

use crate::error::ErrorResponse;

pub(crate) const USER_ID: &str = "x-user-id";
pub(crate) const IS_ADMIN: &str = "x-user-is-admin";
pub(crate) const IS_STAFF: &str = "x-user-is-staff";

/// Caller identity forwarded by the authenticating gateway.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

/// An authenticated caller that is also admin or staff.
#[derive(Debug, Clone)]
pub struct Privileged(pub Identity);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AuthRejection {
    Unauthenticated,
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication is required.")
            }
            AuthRejection::Forbidden => (
                StatusCode::FORBIDDEN,
                "You don't have a permission to perform this action.",
            ),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

fn identity(headers: &HeaderMap) -> Result<Identity, AuthRejection> {
    let user_id = headers
        .get(USER_ID)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .ok_or(AuthRejection::Unauthenticated)?;
    Ok(Identity::new(
        UserId::new(user_id),
        flag(headers, IS_ADMIN),
        flag(headers, IS_STAFF),
    ))
}

fn flag(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity(&parts.headers).map(Self)
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for Privileged
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = identity(&parts.headers)?;
        if !identity.is_privileged() {
            tracing::debug!(user = %identity.user_id().as_ref(), "Rejected unprivileged caller");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(identity))
    }
}
