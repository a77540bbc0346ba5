use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Secret used when neither settings.toml nor JWT_SECRET provides one
pub const DEV_JWT_SECRET: &str = "yeet-development-secret-change-me";

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
}

impl Auth {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Google {
    pub userinfo_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
    pub google: Google,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.path", "yeet.db")?
            .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
            .set_default("auth.access_token_ttl_secs", 300)?
            .set_default("auth.refresh_token_ttl_secs", 86_400)?
            .set_default(
                "google.userinfo_url",
                "https://www.googleapis.com/oauth2/v2/userinfo",
            )?;

        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Running from the workspace root during development
        let dev_path = PathBuf::from("yeet-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        // Environment variables win over everything else
        let overrides = [
            ("HOST", "server.host"),
            ("PORT", "server.port"),
            ("DATABASE_PATH", "database.path"),
            ("JWT_SECRET", "auth.jwt_secret"),
            ("GOOGLE_USERINFO_URL", "google.userinfo_url"),
        ];
        for (var, key) in overrides {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }
}
