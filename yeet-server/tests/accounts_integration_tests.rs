// Integration tests for sign-up, login and token endpoints

mod common;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use common::*;
use serde_json::{json, Value};
use yeet_server::{
    api::{accounts, ApiError},
    db::repositories::UserRepository,
};
use yeet_types::{
    CheckUserRequest, GoogleLoginRequest, LoginRequest, RegistrationRequest, TokenObtainRequest,
    TokenRefreshRequest, TokenVerifyRequest, ValidateSignupRequest,
};

fn registration(username: &str, email: &str, password: &str) -> RegistrationRequest {
    RegistrationRequest {
        username: username.to_string(),
        email: email.to_string(),
        password1: password.to_string(),
        password2: password.to_string(),
        first_name: "Erin".to_string(),
        last_name: "Evans".to_string(),
    }
}

#[tokio::test]
async fn test_register_then_login() {
    let state = test_state();

    let (status, Json(registered)) = accounts::register(
        State(state.clone()),
        Ok(Json(registration("erin", "erin@example.com", "hunter2hunter2"))),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered.user.username, "erin");
    assert!(registered.user.last_login.is_some());

    let claims = state.tokens.validate_access(&registered.access).unwrap();
    assert_eq!(claims.user_id().unwrap(), registered.user.id);

    let Json(by_email) = accounts::login(
        State(state.clone()),
        Ok(Json(LoginRequest {
            email: Some("erin@example.com".to_string()),
            username: None,
            password: "hunter2hunter2".to_string(),
        })),
    )
    .await
    .unwrap();
    assert_eq!(by_email.user.id, registered.user.id);

    let Json(by_username) = accounts::login(
        State(state.clone()),
        Ok(Json(LoginRequest {
            email: None,
            username: Some("erin".to_string()),
            password: "hunter2hunter2".to_string(),
        })),
    )
    .await
    .unwrap();

    let Json(me) = accounts::current_user(State(state.clone()), bearer_headers(&by_username.access))
        .await
        .unwrap();
    assert_eq!(me.username, "erin");
    assert_eq!(me.first_name, "Erin");

    let err = accounts::login(
        State(state),
        Ok(Json(LoginRequest {
            email: None,
            username: Some("erin".to_string()),
            password: "wrong-password".to_string(),
        })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn test_registration_conflicts() {
    let state = test_state();

    let err = accounts::register(
        State(state.clone()),
        Ok(Json(registration("alice", "new-alice@example.com", "longenough"))),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = accounts::register(
        State(state.clone()),
        Ok(Json(registration("alice2", "alice@example.com", "longenough"))),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let mut mismatched = registration("frank", "frank@example.com", "longenough");
    mismatched.password2 = "different!".to_string();
    let err = accounts::register(State(state), Ok(Json(mismatched)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn test_seeded_users_cannot_password_login() {
    let state = test_state();

    let err = accounts::login(
        State(state.clone()),
        Ok(Json(LoginRequest {
            email: Some("alice@example.com".to_string()),
            username: None,
            password: "".to_string(),
        })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = accounts::login(
        State(state),
        Ok(Json(LoginRequest {
            email: None,
            username: None,
            password: "whatever".to_string(),
        })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn test_current_user_requires_token() {
    let state = test_state();

    let err = accounts::current_user(State(state.clone()), HeaderMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));

    let pair = state.tokens.issue_pair(ALICE, "alice").unwrap();
    let err = accounts::current_user(State(state), bearer_headers(&pair.refresh))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn test_check_user() {
    let state = test_state();

    let Json(found) = accounts::check_user(
        State(state.clone()),
        Ok(Json(CheckUserRequest { email: "bob@example.com".to_string() })),
    )
    .await
    .unwrap();
    assert_eq!(found["exists"], true);
    assert_eq!(found["username"], "bob");
    assert_eq!(found["last_name"], "Baker");

    let Json(missing) = accounts::check_user(
        State(state.clone()),
        Ok(Json(CheckUserRequest { email: "zed@example.com".to_string() })),
    )
    .await
    .unwrap();
    assert_eq!(missing, serde_json::json!({ "exists": false }));

    let err = accounts::check_user(
        State(state),
        Ok(Json(CheckUserRequest { email: "  ".to_string() })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn test_validate_new_user_shapes() {
    let state = test_state();

    let validate = |username: &str, email: &str| {
        accounts::validate_new_user(
            State(state.clone()),
            Ok(Json(ValidateSignupRequest {
                username: username.to_string(),
                email: email.to_string(),
            })),
        )
    };

    let (status, Json(body)) = validate("alice", "alice@example.com").await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, serde_json::json!({ "email_exists": true }));

    let (status, Json(body)) = validate("alice", "fresh@example.com").await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, serde_json::json!({ "username_exists": true }));

    let (status, Json(body)) = validate("fresh", "fresh@example.com").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "email_username exists": false }));
}

#[tokio::test]
async fn test_token_endpoints() {
    let state = test_state();

    accounts::register(
        State(state.clone()),
        Ok(Json(registration("gina", "gina@example.com", "passw0rd!!"))),
    )
    .await
    .unwrap();

    let Json(pair) = accounts::token_obtain(
        State(state.clone()),
        Ok(Json(TokenObtainRequest {
            username: "gina".to_string(),
            password: "passw0rd!!".to_string(),
        })),
    )
    .await
    .unwrap();

    let Json(refreshed) = accounts::token_refresh(
        State(state.clone()),
        Ok(Json(TokenRefreshRequest { refresh: pair.refresh.clone() })),
    )
    .await
    .unwrap();
    assert_eq!(state.tokens.validate_access(&refreshed.access).unwrap().username, "gina");

    let err = accounts::token_refresh(
        State(state.clone()),
        Ok(Json(TokenRefreshRequest { refresh: pair.access.clone() })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));

    let Json(verified) = accounts::token_verify(
        State(state.clone()),
        Ok(Json(TokenVerifyRequest { token: pair.access })),
    )
    .await
    .unwrap();
    assert_eq!(verified, serde_json::json!({}));

    let err = accounts::token_verify(
        State(state.clone()),
        Ok(Json(TokenVerifyRequest { token: "garbage".to_string() })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));

    let err = accounts::token_obtain(
        State(state),
        Ok(Json(TokenObtainRequest {
            username: "gina".to_string(),
            password: "nope".to_string(),
        })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn test_logout_is_stateless() {
    let Json(body) = accounts::logout().await;
    assert_eq!(body["detail"], "Successfully logged out.");
}

#[tokio::test]
async fn test_google_login_with_unreachable_provider() {
    let state = test_state();

    let err = accounts::google_login(
        State(state.clone()),
        Ok(Json(GoogleLoginRequest { access_token: "ya29.fake".to_string() })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = accounts::google_login(
        State(state),
        Ok(Json(GoogleLoginRequest { access_token: " ".to_string() })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

/// Stand-in for Google's userinfo endpoint, keyed on the bearer token
async fn fake_userinfo(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some("alice-token") => Ok(Json(json!({
            "id": "g-alice",
            "email": "alice@example.com",
            "given_name": "Alicia",
        }))),
        Some("bob-token") => Ok(Json(json!({
            "id": "g-bob",
            "email": "bob@gmail.com",
            "given_name": "Bobby",
            "family_name": "Gmail",
        }))),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn spawn_fake_google() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/userinfo", get(fake_userinfo));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/userinfo", addr)
}

fn google_request(token: &str) -> Result<Json<GoogleLoginRequest>, axum::extract::rejection::JsonRejection> {
    Ok(Json(GoogleLoginRequest { access_token: token.to_string() }))
}

#[tokio::test]
async fn test_google_login_links_or_creates_accounts() {
    let state = state_with_google(&spawn_fake_google().await);

    // known e-mail: the existing account is linked, not duplicated
    let Json(linked) = accounts::google_login(State(state.clone()), google_request("alice-token"))
        .await
        .unwrap();
    assert!(!linked.created);
    assert_eq!(linked.user.id, ALICE);
    assert_eq!(linked.user.username, "alice");
    let claims = state.tokens.validate_access(&linked.access).unwrap();
    assert_eq!(claims.user_id().unwrap(), ALICE);

    let alice = UserRepository::new(state.db.pool.clone())
        .get_by_id(ALICE)
        .unwrap()
        .unwrap();
    assert_eq!(alice.google_id.as_deref(), Some("g-alice"));

    // new e-mail whose local part is already a username gets a suffix
    let Json(created) = accounts::google_login(State(state.clone()), google_request("bob-token"))
        .await
        .unwrap();
    assert!(created.created);
    assert_eq!(created.user.username, "bob1");
    assert_eq!(created.user.first_name, "Bobby");
    assert_eq!(created.user.last_name, "Gmail");
    assert_eq!(created.user.email, "bob@gmail.com");

    let Json(again) = accounts::google_login(State(state.clone()), google_request("bob-token"))
        .await
        .unwrap();
    assert!(!again.created);
    assert_eq!(again.user.id, created.user.id);
    assert_eq!(again.user.username, "bob1");

    let err = accounts::google_login(State(state), google_request("revoked-token"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}
