use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::{
    api::{find_user, resolve_actor, ApiError, ApiResult},
    db::repositories::{EngagementKind, EngagementRepository, NewPost, PostRepository, ToggleOutcome},
    state::AppState,
};
use yeet_types::{
    CreatePostRequest, EngagementRequest, FeedPost, LikeResponse, Post, ReyeetResponse, ToggleStatus,
};

pub const MAX_POST_LENGTH: usize = 280;
pub const MAX_LOCATION_NAME_LENGTH: usize = 255;

/// Check a post request and turn it into an insertable post
pub fn validate_post(user_id: i64, request: &CreatePostRequest) -> Result<NewPost, ApiError> {
    let content = request.post_content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Post content cannot be empty".to_string()));
    }
    let length = content.chars().count();
    if length > MAX_POST_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Post content cannot exceed {} characters (got {})",
            MAX_POST_LENGTH, length
        )));
    }

    if let Some(lat) = request.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ApiError::BadRequest("Latitude must be between -90 and 90".to_string()));
        }
    }
    if let Some(lon) = request.longitude {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ApiError::BadRequest("Longitude must be between -180 and 180".to_string()));
        }
    }

    let location_name = request
        .location_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    if let Some(name) = location_name {
        if name.chars().count() > MAX_LOCATION_NAME_LENGTH {
            return Err(ApiError::BadRequest(format!(
                "Location name cannot exceed {} characters",
                MAX_LOCATION_NAME_LENGTH
            )));
        }
    }

    Ok(NewPost {
        user_id,
        content: content.to_string(),
        latitude: request.latitude,
        longitude: request.longitude,
        location_name: location_name.map(str::to_string),
    })
}

/// GET /all_posts/ and /view_all_posts/
pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<Post>>> {
    let posts = PostRepository::new(state.db.pool.clone())
        .list_all()
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(posts))
}

/// POST /api/post_yeet/
pub async fn post_yeet(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let Json(payload) = payload?;
    let author = resolve_actor(&state, &headers, payload.username.as_deref())?;
    let new_post = validate_post(author.id, &payload)?;

    let post = PostRepository::new(state.db.pool.clone())
        .create(&new_post)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    tracing::info!("Post {} created by {}", post.post_id, author.username);

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/user_posts/:username/ - a user's posts as they see them
pub async fn user_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<FeedPost>>> {
    let user = find_user(&state, &username)?;

    let posts = PostRepository::new(state.db.pool.clone())
        .posts_by_author(user.id, Some(user.id))
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(posts))
}

/// GET /api/follow_feed/:username/ - posts from everyone the user follows
pub async fn follow_feed(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<FeedPost>>> {
    let user = find_user(&state, &username)?;

    let feed = PostRepository::new(state.db.pool.clone())
        .feed_for(user.id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(feed))
}

/// Flip one engagement edge and report the post's new totals
fn toggle_engagement(
    state: &AppState,
    headers: &HeaderMap,
    request: &EngagementRequest,
    kind: EngagementKind,
) -> Result<(ToggleOutcome, i64, bool), ApiError> {
    let actor = resolve_actor(state, headers, request.username.as_deref())?;

    PostRepository::new(state.db.pool.clone())
        .get_by_id(request.post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let repo = EngagementRepository::new(state.db.pool.clone(), kind);
    let outcome = repo
        .toggle(actor.id, request.post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    let count = repo
        .count(request.post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    let engaged = repo
        .has_engaged(actor.id, request.post_id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    tracing::debug!(
        "{} toggled {} on post {}: {:?}",
        actor.username,
        kind.as_str(),
        request.post_id,
        outcome
    );

    Ok((outcome, count, engaged))
}

/// POST /api/like_unlike/ and /like_tweet/
pub async fn like_unlike(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EngagementRequest>, JsonRejection>,
) -> ApiResult<Json<LikeResponse>> {
    let Json(payload) = payload?;
    let (outcome, like_count, liked_by_user) =
        toggle_engagement(&state, &headers, &payload, EngagementKind::Like)?;

    let status = match outcome {
        ToggleOutcome::On => ToggleStatus::Liked,
        ToggleOutcome::Off => ToggleStatus::Unliked,
    };

    Ok(Json(LikeResponse {
        status,
        post_id: payload.post_id,
        like_count,
        liked_by_user,
    }))
}

/// POST /api/reyeet_unreyeet/ and /retweet_tweet/
pub async fn reyeet_unreyeet(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EngagementRequest>, JsonRejection>,
) -> ApiResult<Json<ReyeetResponse>> {
    let Json(payload) = payload?;
    let (outcome, retweet_count, retweeted_by_user) =
        toggle_engagement(&state, &headers, &payload, EngagementKind::Retweet)?;

    let status = match outcome {
        ToggleOutcome::On => ToggleStatus::Reyeeted,
        ToggleOutcome::Off => ToggleStatus::Unreyeeted,
    };

    Ok(Json(ReyeetResponse {
        status,
        post_id: payload.post_id,
        retweet_count,
        retweeted_by_user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str) -> CreatePostRequest {
        CreatePostRequest {
            username: None,
            post_content: content.to_string(),
            latitude: None,
            longitude: None,
            location_name: None,
        }
    }

    #[test]
    fn test_content_is_trimmed() {
        let post = validate_post(1, &request("  hello  ")).unwrap();
        assert_eq!(post.content, "hello");
        assert_eq!(post.user_id, 1);
    }

    #[test]
    fn test_content_length_bounds() {
        assert!(validate_post(1, &request("   ")).is_err());
        assert!(validate_post(1, &request(&"a".repeat(280))).is_ok());
        assert!(validate_post(1, &request(&"a".repeat(281))).is_err());
        // characters, not bytes
        assert!(validate_post(1, &request(&"é".repeat(280))).is_ok());
    }

    #[test]
    fn test_coordinates_are_range_checked() {
        let mut req = request("here");
        req.latitude = Some(29.42);
        req.longitude = Some(-98.49);
        assert!(validate_post(1, &req).is_ok());

        req.latitude = Some(90.5);
        assert!(matches!(validate_post(1, &req), Err(ApiError::BadRequest(_))));

        req.latitude = Some(0.0);
        req.longitude = Some(-181.0);
        assert!(matches!(validate_post(1, &req), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_blank_location_name_is_dropped() {
        let mut req = request("here");
        req.location_name = Some("   ".to_string());
        assert_eq!(validate_post(1, &req).unwrap().location_name, None);

        req.location_name = Some("x".repeat(256));
        assert!(validate_post(1, &req).is_err());
    }
}
