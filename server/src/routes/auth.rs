//! Identity of the signed-in user, as forwarded by the session layer.

use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use momento_assistant::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller. Rejects with `401` when no user is attached.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| CurrentUser(UserId::new(id)))
            .ok_or(ApiError::Unauthorized)
    }
}
