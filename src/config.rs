//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; handlers only ever see the typed
//! `Config` held in `AppState`.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL used for the CORS allow-list
    pub frontend_url: String,
    /// GCP project ID for Firestore
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Directory holding the built SPA (index.html + assets)
    pub spa_dist: String,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Stream chat API key (public identifier)
    pub stream_api_key: String,
    /// Stream chat API secret (signs server and user tokens)
    pub stream_api_secret: String,
    /// Override for the Stream API base URL (tests point this at a stub)
    pub stream_api_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Secrets come from the environment in all deployments; a `.env` file
    /// is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .unwrap_or(5001),
            spa_dist: env::var("SPA_DIST").unwrap_or_else(|_| "web/dist".to_string()),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            stream_api_key: env::var("STREAM_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STREAM_API_KEY"))?,
            stream_api_secret: env::var("STREAM_API_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STREAM_API_SECRET"))?,
            stream_api_url: env::var("STREAM_API_URL").ok(),
        })
    }

    /// Default config for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 5001,
            spa_dist: "web/dist".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            stream_api_key: "test_stream_key".to_string(),
            stream_api_secret: "test_stream_secret".to_string(),
            stream_api_url: None,
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

    // Single test: env vars are process-global, so the missing-secret case
    // and the happy path can't run on parallel threads.
    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STREAM_API_KEY", "key_from_env");
        env::remove_var("STREAM_API_SECRET");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("STREAM_API_SECRET")));

        env::set_var("STREAM_API_SECRET", "secret_from_env");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.stream_api_key, "key_from_env");
        assert_eq!(config.stream_api_secret, "secret_from_env");
        assert_eq!(config.port, 5001);
        assert_eq!(config.frontend_url, "http://localhost:5173");
    }
}
