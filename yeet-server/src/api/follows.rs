use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};

use crate::{
    api::{find_user, get_user_from_headers, ApiError, ApiResult},
    db::repositories::{FollowRepository, ToggleOutcome},
    state::AppState,
};
use yeet_types::{Follow, FollowToggleRequest, FollowToggleResponse, FollowUsernames, ToggleStatus};

/// GET /api/follows/
pub async fn list_follows(State(state): State<AppState>) -> ApiResult<Json<Vec<Follow>>> {
    let follows = FollowRepository::new(state.db.pool.clone())
        .list_all()
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(follows))
}

/// GET /api/follow-usernames/:id/
pub async fn get_follow_usernames(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<FollowUsernames>> {
    let edge = FollowRepository::new(state.db.pool.clone())
        .first_edge_for(user_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("No follow relationship found for this ID!".to_string()))?;

    Ok(Json(edge))
}

/// POST /follow_toggle/ - follow the named user, or unfollow if already following
pub async fn follow_toggle(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<FollowToggleRequest>, JsonRejection>,
) -> ApiResult<Json<FollowToggleResponse>> {
    let follower = get_user_from_headers(&state, &headers)?;
    let Json(payload) = payload?;
    let target = find_user(&state, payload.username.trim())?;

    if follower.id == target.id {
        return Err(ApiError::BadRequest("You cannot follow yourself".to_string()));
    }

    let follow_repo = FollowRepository::new(state.db.pool.clone());
    let status = match follow_repo
        .toggle(follower.id, target.id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
    {
        ToggleOutcome::On => ToggleStatus::Followed,
        ToggleOutcome::Off => ToggleStatus::Unfollowed,
    };

    let followers_count = follow_repo
        .follower_count(target.id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    tracing::info!(
        "{} {} {}",
        follower.username,
        status.as_str(),
        target.username
    );

    Ok(Json(FollowToggleResponse {
        status,
        followers_count,
    }))
}
