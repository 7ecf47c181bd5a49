/// Configuration management for Social Service
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration (only used by the postgres backend)
    pub database: Option<DatabaseConfig>,
    /// Storage backend selection
    pub storage: StorageConfig,
    /// Session token verification
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port (REST + WebSocket)
    pub http_port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => bail!("unknown storage backend: {}", other),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Session verification configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the session issuer
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8006),
        };

        let backend = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Postgres,
        };

        let database = match backend {
            StorageBackend::Postgres => Some(DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .context("DATABASE_URL environment variable not set")?,
                max_connections: std::env::var("DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_connections),
                min_connections: std::env::var("DB_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_min_connections),
            }),
            StorageBackend::Memory => None,
        };

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable not set")?,
        };

        Ok(Config {
            app,
            database,
            storage: StorageConfig { backend },
            auth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so every case lives in one test.
    #[test]
    fn test_from_env() {
        std::env::remove_var("STORAGE_BACKEND");
        std::env::remove_var("PORT");
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("JWT_SECRET", "secret");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.http_port, 8006);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        let database = config.database.unwrap();
        assert_eq!(database.max_connections, 20);
        assert_eq!(database.min_connections, 5);
        assert!(format!("{:?}", config.auth).contains("<redacted>"));

        std::env::set_var("STORAGE_BACKEND", "memory");
        std::env::remove_var("DATABASE_URL");
        let config = Config::from_env().unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.database.is_none());

        std::env::set_var("STORAGE_BACKEND", "cassandra");
        assert!(Config::from_env().is_err());

        std::env::remove_var("STORAGE_BACKEND");
        std::env::remove_var("JWT_SECRET");
        std::env::set_var("DATABASE_URL", "postgres://test");
        assert!(Config::from_env().is_err());
    }
}
