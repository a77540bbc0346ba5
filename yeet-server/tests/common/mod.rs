// Shared fixtures for the handler-level integration tests

#![allow(dead_code)]

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use yeet_server::{
    auth::{GoogleOAuthConfig, TokenService},
    db::Database,
    state::AppState,
};

/// Seeded user ids
pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const CHARLIE: i64 = 3;
pub const DIANA: i64 = 4;

/// Fresh in-memory database with the demo data loaded
pub fn test_state() -> AppState {
    // Nothing listens here, so Google lookups fail fast
    state_with_google("http://127.0.0.1:9/oauth2/v2/userinfo")
}

/// Same seeded state, with Google profile lookups sent to `userinfo_url`
pub fn state_with_google(userinfo_url: &str) -> AppState {
    let db = Database::in_memory().expect("Failed to create test database");
    db.initialize().expect("Failed to initialize schema");
    db.seed_test_data().expect("Failed to seed test data");

    let tokens = TokenService::new("integration-test-secret-key", 300, 86_400);

    AppState::new(db, tokens, GoogleOAuthConfig::new(userinfo_url))
}

pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("valid header value"),
    );
    headers
}

/// Headers carrying a fresh access token for a seeded user
pub fn auth_headers(state: &AppState, user_id: i64, username: &str) -> HeaderMap {
    let pair = state
        .tokens
        .issue_pair(user_id, username)
        .expect("Failed to issue tokens");
    bearer_headers(&pair.access)
}
