use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub database: String,
    /// Bound on mongod server selection so a dead store fails fast
    /// instead of hanging request handlers.
    pub server_selection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub expiry_hours: u64,
    pub cookie_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl AppConfig {
    /// Build configuration from the process environment.
    ///
    /// The session secret and the Google client credentials are required and
    /// have no defaults; everything else falls back to development-friendly
    /// values and can be overridden per variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("PORT", v))?,
            Err(_) => 3000,
        };

        let expiry_hours = match env::var("SESSION_EXPIRY_HOURS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("SESSION_EXPIRY_HOURS", v))?,
            Err(_) => 24 * 7,
        };

        Ok(Self {
            server: ServerConfig {
                bind: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
            },
            store: StoreConfig {
                url: env::var("MONGODB_URL")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
                database: env::var("MONGODB_DB").unwrap_or_else(|_| "keepsake".to_string()),
                server_selection_timeout_secs: 5,
            },
            session: SessionConfig {
                secret: required("SESSION_SECRET")?,
                expiry_hours,
                cookie_name: "sid".to_string(),
            },
            google: GoogleConfig {
                client_id: required("GOOGLE_CLIENT_ID")?,
                client_secret: required("GOOGLE_CLIENT_SECRET")?,
                callback_url: required("GOOGLE_CALLBACK_URL")?,
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_required_vars() {
        std::env::set_var("SESSION_SECRET", "test-secret");
        std::env::set_var("GOOGLE_CLIENT_ID", "client-id");
        std::env::set_var("GOOGLE_CLIENT_SECRET", "client-secret");
        std::env::set_var(
            "GOOGLE_CALLBACK_URL",
            "http://localhost:3000/auth/google/callback",
        );
    }

    // Single test so the process-global env mutations cannot race each other.
    #[test]
    fn builds_from_env_and_rejects_bad_values() {
        set_required_vars();
        std::env::remove_var("PORT");
        std::env::remove_var("MONGODB_URL");
        std::env::remove_var("SESSION_EXPIRY_HOURS");

        let config = AppConfig::from_env().expect("config should build");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.store.url, "mongodb://localhost:27017");
        assert_eq!(config.session.cookie_name, "sid");
        assert_eq!(config.session.expiry_hours, 168);

        std::env::set_var("SESSION_EXPIRY_HOURS", "soon");
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("SESSION_EXPIRY_HOURS", _)));
        std::env::remove_var("SESSION_EXPIRY_HOURS");
    }
}
