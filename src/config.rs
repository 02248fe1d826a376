// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Key for session cookies and OAuth state signing (raw bytes)
    pub session_secret: Vec<u8>,
    /// SQLite connection string
    pub database_url: String,
    /// Frontend URL for CORS and OAuth redirects
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Whether session cookies are marked Secure (production only)
    pub cookie_secure: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A missing `SESSION_SECRET` or Google credential is a hard startup
    /// failure; there is no degraded mode without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?,
            session_secret: env::var("SESSION_SECRET")
                .map_err(|_| ConfigError::Missing("SESSION_SECRET"))?
                .into_bytes(),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:teamscore.db?mode=rwc".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            cookie_secure: env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            google_client_id: "test_client_id".to_string(),
            google_client_secret: "test_secret".to_string(),
            session_secret: b"test_session_key_32_bytes_min!!!".to_vec(),
            database_url: "sqlite::memory:".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 3000,
            cookie_secure: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test because the process environment is shared across threads.
    #[test]
    fn test_config_from_env() {
        env::set_var("GOOGLE_CLIENT_ID", "test_id");
        env::set_var("GOOGLE_CLIENT_SECRET", "test_secret");
        env::remove_var("SESSION_SECRET");

        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("SESSION_SECRET"))
        ));

        env::set_var("SESSION_SECRET", "test_session_key_32_bytes_min!!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.google_client_id, "test_id");
        assert_eq!(config.google_client_secret, "test_secret");
        assert_eq!(config.port, 3000);
        assert!(!config.cookie_secure);
    }
}
