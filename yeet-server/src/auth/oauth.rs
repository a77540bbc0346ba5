use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Fallback when an e-mail local part has no usable characters
const FALLBACK_USERNAME: &str = "user";
/// Leaves room for a numeric suffix within the 150-char username limit
const MAX_BASE_LEN: usize = 140;

/// Google OAuth configuration
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    userinfo_url: String,
}

/// Google user information from the userinfo endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
}

impl GoogleOAuthConfig {
    pub fn new(userinfo_url: impl Into<String>) -> Self {
        Self {
            userinfo_url: userinfo_url.into(),
        }
    }

    /// Fetch the Google profile behind an access token
    pub async fn get_user(&self, access_token: &str) -> Result<GoogleUser> {
        let client = reqwest::Client::new();

        let response = client
            .get(&self.userinfo_url)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send userinfo request to Google")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Google userinfo request failed with status {}: {}",
                status,
                body
            ));
        }

        let user: GoogleUser = response
            .json()
            .await
            .context("Failed to parse Google userinfo response")?;

        Ok(user)
    }
}

/// Build a free username from an e-mail's local part.
///
/// `taken` reports whether a candidate is already in use; `1`, `2`, ... are
/// appended until it returns false.
pub fn derive_username<F>(email: &str, mut taken: F) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    let local = email.split('@').next().unwrap_or_default();
    let mut base: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-'))
        .take(MAX_BASE_LEN)
        .collect();
    if base.is_empty() {
        base = FALLBACK_USERNAME.to_string();
    }

    if !taken(&base)? {
        return Ok(base);
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{}{}", base, counter);
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        counter += 1;
    }
}
