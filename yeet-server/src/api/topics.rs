use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{ApiError, ApiResult},
    db::repositories::TopicRepository,
    state::AppState,
};
use yeet_types::{CreateTopicRequest, Topic};

/// GET /api/topics/
pub async fn list_topics(State(state): State<AppState>) -> ApiResult<Json<Vec<Topic>>> {
    let topics = TopicRepository::new(state.db.pool.clone())
        .list_all()
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(topics))
}

/// POST /api/topics/
pub async fn create_topic(
    State(state): State<AppState>,
    payload: Result<Json<CreateTopicRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Topic>)> {
    let Json(payload) = payload?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }
    let location = payload
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let topic = TopicRepository::new(state.db.pool.clone())
        .create(title, payload.description.trim(), location)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    tracing::info!("Topic {} created: {}", topic.id, topic.title);

    Ok((StatusCode::CREATED, Json(topic)))
}
