use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::{
    api::{bearer_token, resolve_actor, ApiError, ApiResult},
    db::repositories::{FeedbackRepository, OptionLookup},
    state::AppState,
};
use yeet_types::{FeedbackOption, FeedbackStats, SubmitFeedbackRequest, SubmitFeedbackResponse};

#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    #[serde(default)]
    pub positive: Option<bool>,
}

/// POST /api/feedback/
///
/// Anonymous feedback is accepted; a bearer token or username attributes it.
pub async fn submit_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubmitFeedbackRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmitFeedbackResponse>)> {
    let Json(payload) = payload?;

    let attributed = bearer_token(&headers).is_some()
        || payload.username.as_deref().is_some_and(|u| !u.trim().is_empty());
    let user_id = if attributed {
        Some(resolve_actor(&state, &headers, payload.username.as_deref())?.id)
    } else {
        None
    };

    let repo = FeedbackRepository::new(state.db.pool.clone());
    let option_ids = match repo
        .resolve_options(&payload.selected_reasons)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
    {
        OptionLookup::Found(ids) => ids,
        OptionLookup::Unknown(text) => {
            return Err(ApiError::BadRequest(format!("Unknown feedback reason: {}", text)));
        }
    };

    let id = repo
        .record_survey(user_id, payload.likes_app, &option_ids)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    tracing::info!(
        "Feedback {} recorded (likes_app={}, {} reasons)",
        id,
        payload.likes_app,
        option_ids.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitFeedbackResponse { success: true, id }),
    ))
}

/// GET /api/feedback/stats/
pub async fn feedback_stats(State(state): State<AppState>) -> ApiResult<Json<FeedbackStats>> {
    let stats = FeedbackRepository::new(state.db.pool.clone())
        .stats()
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(stats))
}

/// GET /api/feedback/options/?positive=
pub async fn feedback_options(
    State(state): State<AppState>,
    query: Result<Query<OptionsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<FeedbackOption>>> {
    let Query(query) = query?;

    let options = FeedbackRepository::new(state.db.pool.clone())
        .list_options(query.positive)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(options))
}
