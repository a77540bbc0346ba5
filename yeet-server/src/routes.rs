use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{api, state::AppState};

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User routes
        .route("/all_users/", get(api::users::list_users))
        .route("/api/users/", get(api::users::list_users))
        .route("/api/user/:username", get(api::users::get_user))
        .route("/api/user/:username/:check_info/", get(api::users::get_user_info))
        .route("/api/username/:id/", get(api::users::get_username))
        .route("/search_users/", get(api::users::search_users))
        .route("/user_profile/:username/", get(api::users::get_user_profile))
        // Follow routes
        .route("/api/follows/", get(api::follows::list_follows))
        .route("/api/follow-usernames/:id/", get(api::follows::get_follow_usernames))
        .route("/follow_toggle/", post(api::follows::follow_toggle))
        // Post routes
        .route("/all_posts/", get(api::posts::list_posts))
        .route("/view_all_posts/", get(api::posts::list_posts))
        .route("/api/post_yeet/", post(api::posts::post_yeet))
        .route("/api/user_posts/:username/", get(api::posts::user_posts))
        .route("/api/follow_feed/:username/", get(api::posts::follow_feed))
        .route("/api/like_unlike/", post(api::posts::like_unlike))
        .route("/like_tweet/", post(api::posts::like_unlike))
        .route("/api/reyeet_unreyeet/", post(api::posts::reyeet_unreyeet))
        .route("/retweet_tweet/", post(api::posts::reyeet_unreyeet))
        // Account routes
        .route("/check_user/", post(api::accounts::check_user))
        .route("/validate_new_user/", post(api::accounts::validate_new_user))
        .route("/api/auth/registration/", post(api::accounts::register))
        .route("/api/auth/login/", post(api::accounts::login))
        .route("/api/auth/logout/", post(api::accounts::logout))
        .route("/api/auth/user/", get(api::accounts::current_user))
        .route("/api/token/", post(api::accounts::token_obtain))
        .route("/api/token/refresh/", post(api::accounts::token_refresh))
        .route("/api/token/verify/", post(api::accounts::token_verify))
        .route("/auth/google-login/", post(api::accounts::google_login))
        .route("/api/auth/google/", post(api::accounts::google_login))
        // Feedback routes
        .route("/api/feedback/", post(api::feedback::submit_feedback))
        .route("/api/feedback/stats/", get(api::feedback::feedback_stats))
        .route("/api/feedback/options/", get(api::feedback::feedback_options))
        // Topic routes
        .route(
            "/api/topics/",
            get(api::topics::list_topics).post(api::topics::create_topic),
        )
        // Clients call these lookups without the trailing slash
        .route("/api/user/:username/:check_info", get(api::users::get_user_info))
        .route("/api/username/:id", get(api::users::get_username))
        .route("/user_profile/:username", get(api::users::get_user_profile))
        .route("/api/follow-usernames/:id", get(api::follows::get_follow_usernames))
        .route("/api/user_posts/:username", get(api::posts::user_posts))
        .route("/api/follow_feed/:username", get(api::posts::follow_feed))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

async fn health_check() -> &'static str {
    "OK"
}
