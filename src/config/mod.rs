use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub media: MediaConfig,
    pub upload: UploadConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Remote media host: where staged images end up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Local staging directory for incoming files
    pub dir: PathBuf,
    /// Per-file size cap in bytes
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Reject products whose description matches an existing one. Two
    /// products can legitimately share descriptive text, so this is off
    /// unless explicitly enabled.
    pub enforce_unique_description: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let mut config = match environment {
            Environment::Production => Self::production()?,
            Environment::Development => Self::development()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn base(environment: Environment) -> Result<Self, ConfigError> {
        Ok(Self {
            environment,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
                max_connections: 10,
            },
            security: SecurityConfig {
                jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
                jwt_expiry_hours: 24,
            },
            media: MediaConfig {
                base_url: env::var("MEDIA_BASE_URL")
                    .map_err(|_| ConfigError::Missing("MEDIA_BASE_URL"))?,
                api_key: env::var("MEDIA_API_KEY").map_err(|_| ConfigError::Missing("MEDIA_API_KEY"))?,
                api_secret: env::var("MEDIA_API_SECRET")
                    .map_err(|_| ConfigError::Missing("MEDIA_API_SECRET"))?,
            },
            upload: UploadConfig {
                dir: PathBuf::from("./images"),
                max_bytes: 10 * 1024 * 1024, // 10 MiB
            },
            catalog: CatalogConfig {
                enforce_unique_description: false,
            },
        })
    }

    fn development() -> Result<Self, ConfigError> {
        Self::base(Environment::Development)
    }

    fn production() -> Result<Self, ConfigError> {
        let mut config = Self::base(Environment::Production)?;
        config.database.max_connections = 20;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.upload.dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.upload.max_bytes = v.parse().unwrap_or(self.upload.max_bytes);
        }
        if let Ok(v) = env::var("CATALOG_UNIQUE_DESCRIPTION") {
            self.catalog.enforce_unique_description =
                v.parse().unwrap_or(self.catalog.enforce_unique_description);
        }
    }
}
