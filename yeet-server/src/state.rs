use crate::auth::{Claims, GoogleOAuthConfig, TokenService};
use crate::config::Settings;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenService,
    pub google: GoogleOAuthConfig,
}

impl AppState {
    pub fn new(db: Database, tokens: TokenService, google: GoogleOAuthConfig) -> Self {
        Self { db, tokens, google }
    }

    pub fn from_settings(db: Database, settings: &Settings) -> Self {
        let tokens = TokenService::new(
            &settings.auth.jwt_secret,
            settings.auth.access_token_ttl_secs,
            settings.auth.refresh_token_ttl_secs,
        );
        let google = GoogleOAuthConfig::new(settings.google.userinfo_url.clone());
        Self::new(db, tokens, google)
    }

    /// Claims of a valid access token, if any
    pub fn claims_from_token(&self, token: &str) -> Option<Claims> {
        self.tokens.validate_access(token).ok()
    }
}
