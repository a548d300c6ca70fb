use std::env;
use std::path::PathBuf;

use reqwest::Url;

/// Default location of the file backing the persisted session keys
pub const DEFAULT_SESSION_PATH: &str = ".admin-session.json";

#[derive(Debug, Clone)]
pub struct Config {
    // Backend origin, without a trailing slash
    pub backend_url: String,

    // Durable session storage
    pub session_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if exists

        let backend_url =
            env::var("BACKEND_URL").map_err(|_| ConfigError::Missing("BACKEND_URL"))?;

        Ok(Self {
            backend_url: normalize_backend_url(&backend_url)?,
            session_path: env::var("ADMIN_SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_PATH)),
        })
    }

    /// Build a config for a known origin (used by tests and embedders)
    pub fn new(backend_url: &str, session_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            backend_url: normalize_backend_url(backend_url)?,
            session_path: session_path.into(),
        })
    }
}

/// Validate the origin and strip trailing slashes so paths can be appended verbatim
fn normalize_backend_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|_| ConfigError::Invalid("BACKEND_URL"))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid("BACKEND_URL"));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = Config::new("https://api.example.com/", "session.json").unwrap();
        assert_eq!(config.backend_url, "https://api.example.com");
    }

    #[test]
    fn test_relative_url_is_rejected() {
        let result = Config::new("api.example.com", "session.json");
        assert!(matches!(result, Err(ConfigError::Invalid("BACKEND_URL"))));
    }

    #[test]
    fn test_non_base_url_is_rejected() {
        let result = Config::new("mailto:admin@example.com", "session.json");
        assert!(matches!(result, Err(ConfigError::Invalid("BACKEND_URL"))));
    }
}
