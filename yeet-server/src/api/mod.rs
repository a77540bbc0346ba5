pub mod accounts;
pub mod error;
pub mod feedback;
pub mod follows;
pub mod posts;
pub mod topics;
pub mod users;

pub use error::{ApiError, ApiResult};

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::{
    auth::Claims,
    db::repositories::{UserRecord, UserRepository},
    state::AppState,
};

/// Raw bearer token from the Authorization header, if one was sent
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Claims of the bearer access token; a missing or bad token is a 401
fn claims_from_headers(state: &AppState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Authentication credentials were not provided".to_string()))?;
    Ok(state.tokens.validate_access(token)?)
}

/// Extract the authenticated user from the bearer token
pub(crate) fn get_user_from_headers(state: &AppState, headers: &HeaderMap) -> Result<UserRecord, ApiError> {
    let user_id = claims_from_headers(state, headers)?.user_id()?;

    UserRepository::new(state.db.pool.clone())
        .get_by_id(user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))
}

/// Viewer id for read endpoints; anonymous when the token is absent or invalid
pub(crate) fn viewer_from_headers(state: &AppState, headers: &HeaderMap) -> Option<i64> {
    bearer_token(headers)
        .and_then(|token| state.claims_from_token(token))
        .and_then(|claims| claims.user_id().ok())
}

/// Resolve who is acting: the bearer token when one is sent, otherwise the
/// username named in the request body
pub(crate) fn resolve_actor(
    state: &AppState,
    headers: &HeaderMap,
    username: Option<&str>,
) -> Result<UserRecord, ApiError> {
    if bearer_token(headers).is_some() {
        return get_user_from_headers(state, headers);
    }

    let username = username
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("username is required".to_string()))?;

    find_user(state, username)
}

/// Look up a user by username, 404 when absent
pub(crate) fn find_user(state: &AppState, username: &str) -> Result<UserRecord, ApiError> {
    UserRepository::new(state.db.pool.clone())
        .get_by_username(username)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("User not found!".to_string()))
}
