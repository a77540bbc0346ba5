use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{find_user, viewer_from_headers, ApiError, ApiResult},
    db::repositories::{FollowRepository, PostRepository, UserRepository},
    state::AppState,
};
use yeet_types::{User, UserInfoKind, UserProfileView, UserSearchResult};

/// Search results are capped at this many users
const SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsernameResponse {
    pub username: String,
}

/// GET /all_users/ and /api/users/
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = UserRepository::new(state.db.pool.clone())
        .list_all()
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(users.iter().map(|u| u.to_user()).collect()))
}

/// GET /api/user/:username
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<User>> {
    let user = find_user(&state, &username)?;
    Ok(Json(user.to_user()))
}

/// GET /api/user/:username/:check_info/
///
/// Unrecognised info kinds yield an empty list rather than an error.
pub async fn get_user_info(
    State(state): State<AppState>,
    Path((username, check_info)): Path<(String, String)>,
) -> ApiResult<Json<Vec<String>>> {
    let user = find_user(&state, &username)?;
    let pool = state.db.pool.clone();

    let values = match UserInfoKind::parse(&check_info) {
        Some(UserInfoKind::Follows) => FollowRepository::new(pool).followee_usernames(user.id),
        Some(UserInfoKind::Following) => FollowRepository::new(pool).follower_usernames(user.id),
        Some(UserInfoKind::Posts) => PostRepository::new(pool).contents_by_user(user.id),
        None => {
            tracing::debug!("Unknown user info kind '{}'", check_info);
            Ok(Vec::new())
        }
    }
    .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(values))
}

/// GET /api/username/:id/
pub async fn get_username(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UsernameResponse>> {
    let user = UserRepository::new(state.db.pool.clone())
        .get_by_id(user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("User not found!".to_string()))?;

    Ok(Json(UsernameResponse { username: user.username }))
}

/// GET /search_users/?query=
pub async fn search_users(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<UserSearchResult>>> {
    let Query(query) = query?;

    let term = query.query.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let results = UserRepository::new(state.db.pool.clone())
        .search(term, SEARCH_LIMIT)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(results))
}

/// GET /user_profile/:username/
pub async fn get_user_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> ApiResult<Json<UserProfileView>> {
    let user = find_user(&state, &username)?;
    let viewer_id = viewer_from_headers(&state, &headers);

    let pool = state.db.pool.clone();
    let follow_repo = FollowRepository::new(pool.clone());
    let post_repo = PostRepository::new(pool);

    let followers_count = follow_repo
        .follower_count(user.id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    let following_count = follow_repo
        .following_count(user.id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    let is_following = match viewer_id {
        Some(viewer_id) if viewer_id != user.id => follow_repo
            .is_following(viewer_id, user.id)
            .map_err(|e| ApiError::InternalError(e.to_string()))?,
        _ => false,
    };

    let posts_count = post_repo
        .count_by_user(user.id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    let posts = post_repo
        .posts_by_author(user.id, viewer_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(UserProfileView {
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        bio: user.bio,
        date_joined: user.date_joined,
        followers_count,
        following_count,
        posts_count,
        is_following,
        posts,
    }))
}
