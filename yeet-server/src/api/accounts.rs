use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::{
    api::{get_user_from_headers, ApiError, ApiResult},
    auth::{derive_username, hash_password, verify_password, TokenPair, MIN_PASSWORD_LENGTH},
    db::repositories::{unique_violation, NewUser, UniqueField, UserRecord, UserRepository},
    state::AppState,
};
use yeet_types::{
    CheckUserRequest, GoogleLoginRequest, GoogleLoginResponse, LoginRequest, LoginResponse,
    RegistrationRequest, TokenObtainRequest, TokenPairResponse, TokenRefreshRequest,
    TokenRefreshResponse, TokenVerifyRequest, User, ValidateSignupRequest,
};

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_.@+-]{1,150}$").expect("Failed to compile username regex")
});

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Failed to compile email regex")
});

const BAD_LOGIN: &str = "Unable to log in with provided credentials.";

/// Field-level checks for a sign-up form; uniqueness is checked separately
pub fn validate_registration(request: &RegistrationRequest) -> Result<(), ApiError> {
    if !USERNAME_REGEX.is_match(request.username.trim()) {
        return Err(ApiError::BadRequest(
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        ));
    }
    if !EMAIL_REGEX.is_match(request.email.trim()) {
        return Err(ApiError::BadRequest("Enter a valid email address.".to_string()));
    }
    if request.password1 != request.password2 {
        return Err(ApiError::BadRequest("The two password fields didn't match.".to_string()));
    }
    if request.password1.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Check a password against a user's stored hash. Accounts without a
/// password (Google sign-ups) never match.
fn password_matches(user: &UserRecord, password: &str) -> bool {
    let Some(hash) = user.password_hash.as_deref() else {
        return false;
    };
    match verify_password(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!("Stored password hash for {} is unreadable: {}", user.username, e);
            false
        }
    }
}

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const EMAIL_TAKEN: &str = "A user is already registered with this e-mail address.";

/// A racing sign-up that trips a UNIQUE column reads like the pre-insert checks
fn creation_error(err: anyhow::Error) -> ApiError {
    match unique_violation(&err) {
        Some(UniqueField::Username) => ApiError::BadRequest(USERNAME_TAKEN.to_string()),
        Some(UniqueField::Email) => ApiError::BadRequest(EMAIL_TAKEN.to_string()),
        Some(UniqueField::GoogleId) => {
            ApiError::BadRequest("This Google account is already linked to another user.".to_string())
        }
        None => ApiError::InternalError(err.to_string()),
    }
}

/// Record the login and hand out a fresh token pair
fn start_session(state: &AppState, user: &UserRecord) -> Result<(TokenPair, User), ApiError> {
    let last_login = UserRepository::new(state.db.pool.clone())
        .touch_last_login(user.id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    let pair = state.tokens.issue_pair(user.id, &user.username)?;

    let mut public = user.to_user();
    public.last_login = Some(last_login);
    Ok((pair, public))
}

/// POST /check_user/
pub async fn check_user(
    State(state): State<AppState>,
    payload: Result<Json<CheckUserRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(payload) = payload?;
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }

    let user = UserRepository::new(state.db.pool.clone())
        .get_by_email(email)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(match user {
        Some(user) => json!({
            "exists": true,
            "username": user.username,
            "email": user.email,
            "first_name": user.first_name,
            "last_name": user.last_name,
        }),
        None => json!({ "exists": false }),
    }))
}

/// POST /validate_new_user/
///
/// A taken email or username is reported with a 404 body; clients rely on it.
pub async fn validate_new_user(
    State(state): State<AppState>,
    payload: Result<Json<ValidateSignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(payload) = payload?;
    let repo = UserRepository::new(state.db.pool.clone());

    if repo
        .email_exists(payload.email.trim())
        .map_err(|e| ApiError::InternalError(e.to_string()))?
    {
        return Ok((StatusCode::NOT_FOUND, Json(json!({ "email_exists": true }))));
    }

    if repo
        .username_exists(payload.username.trim())
        .map_err(|e| ApiError::InternalError(e.to_string()))?
    {
        return Ok((StatusCode::NOT_FOUND, Json(json!({ "username_exists": true }))));
    }

    Ok((StatusCode::OK, Json(json!({ "email_username exists": false }))))
}

/// POST /api/auth/registration/
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let Json(payload) = payload?;
    validate_registration(&payload)?;

    let username = payload.username.trim();
    let email = payload.email.trim();
    let repo = UserRepository::new(state.db.pool.clone());

    if repo
        .username_exists(username)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
    {
        return Err(ApiError::BadRequest(USERNAME_TAKEN.to_string()));
    }
    if repo
        .email_exists(email)
        .map_err(|e| ApiError::InternalError(e.to_string()))?
    {
        return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(&payload.password1)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let user = repo
        .create(&NewUser {
            username: username.to_string(),
            email: email.to_string(),
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            password_hash: Some(password_hash),
            google_id: None,
        })
        .map_err(creation_error)?;

    tracing::info!("Registered user {} (id {})", user.username, user.id);

    let (pair, user) = start_session(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            access: pair.access,
            refresh: pair.refresh,
            user,
        }),
    ))
}

/// POST /api/auth/login/ - email wins over username when both are sent
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(payload) = payload?;
    let repo = UserRepository::new(state.db.pool.clone());

    let email = payload.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
    let username = payload.username.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let user = match (email, username) {
        (Some(email), _) => repo.get_by_email(email),
        (None, Some(username)) => repo.get_by_username(username),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Must include either \"username\" or \"email\" and \"password\".".to_string(),
            ))
        }
    }
    .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let user = user
        .filter(|u| password_matches(u, &payload.password))
        .ok_or_else(|| ApiError::BadRequest(BAD_LOGIN.to_string()))?;

    tracing::info!("User {} logged in", user.username);

    let (pair, user) = start_session(&state, &user)?;
    Ok(Json(LoginResponse {
        access: pair.access,
        refresh: pair.refresh,
        user,
    }))
}

/// POST /api/auth/logout/ - tokens are stateless, so nothing is revoked
pub async fn logout() -> Json<Value> {
    Json(json!({ "detail": "Successfully logged out." }))
}

/// GET /api/auth/user/
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<User>> {
    let user = get_user_from_headers(&state, &headers)?;
    Ok(Json(user.to_user()))
}

/// POST /api/token/
pub async fn token_obtain(
    State(state): State<AppState>,
    payload: Result<Json<TokenObtainRequest>, JsonRejection>,
) -> ApiResult<Json<TokenPairResponse>> {
    let Json(payload) = payload?;

    let user = UserRepository::new(state.db.pool.clone())
        .get_by_username(payload.username.trim())
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .filter(|u| password_matches(u, &payload.password))
        .ok_or_else(|| {
            ApiError::Unauthorized("No active account found with the given credentials".to_string())
        })?;

    let (pair, _) = start_session(&state, &user)?;
    Ok(Json(TokenPairResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// POST /api/token/refresh/
pub async fn token_refresh(
    State(state): State<AppState>,
    payload: Result<Json<TokenRefreshRequest>, JsonRejection>,
) -> ApiResult<Json<TokenRefreshResponse>> {
    let Json(payload) = payload?;
    let access = state.tokens.refresh_access(&payload.refresh)?;
    Ok(Json(TokenRefreshResponse { access }))
}

/// POST /api/token/verify/ - accepts either token type
pub async fn token_verify(
    State(state): State<AppState>,
    payload: Result<Json<TokenVerifyRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(payload) = payload?;
    state.tokens.decode(&payload.token)?;
    Ok(Json(json!({})))
}

/// POST /auth/google-login/ and /api/auth/google/
///
/// Logs in the account with the Google e-mail, creating one when none exists.
pub async fn google_login(
    State(state): State<AppState>,
    payload: Result<Json<GoogleLoginRequest>, JsonRejection>,
) -> ApiResult<Json<GoogleLoginResponse>> {
    let Json(payload) = payload?;
    if payload.access_token.trim().is_empty() {
        return Err(ApiError::BadRequest("access_token is required".to_string()));
    }

    let profile = state
        .google
        .get_user(payload.access_token.trim())
        .await
        .map_err(|e| {
            tracing::warn!("Google login failed: {:#}", e);
            ApiError::BadRequest("Invalid Google access token".to_string())
        })?;

    let repo = UserRepository::new(state.db.pool.clone());
    let existing = repo
        .get_by_email(&profile.email)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let (user, created) = match existing {
        Some(user) => {
            repo.link_google_id(user.id, &profile.id)
                .map_err(|e| ApiError::InternalError(e.to_string()))?;
            (user, false)
        }
        None => {
            let username = derive_username(&profile.email, |candidate| repo.username_exists(candidate))
                .map_err(|e| ApiError::InternalError(e.to_string()))?;
            let user = repo
                .create(&NewUser {
                    username,
                    email: profile.email.clone(),
                    first_name: profile.given_name.clone().unwrap_or_default(),
                    last_name: profile.family_name.clone().unwrap_or_default(),
                    password_hash: None,
                    google_id: Some(profile.id.clone()),
                })
                .map_err(creation_error)?;
            tracing::info!("Registered Google user {} (id {})", user.username, user.id);
            (user, true)
        }
    };

    let (pair, user) = start_session(&state, &user)?;
    Ok(Json(GoogleLoginResponse {
        access: pair.access,
        refresh: pair.refresh,
        user,
        created,
    }))
}
