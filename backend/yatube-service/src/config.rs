/// Configuration management for Yatube
///
/// Everything is read from environment variables (a `.env` file is loaded
/// first by `main`). Unset variables fall back to development defaults;
/// production refuses to start with a default secret key.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::pagination::DEFAULT_PER_PAGE;

const DEV_SECRET_KEY: &str = "yatube-development-secret-key-change-me";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub media: MediaConfig,
    /// Items per listing page
    pub posts_per_page: usize,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

/// Session cookie settings
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HMAC key for session tokens
    pub secret_key: String,
    pub cookie_name: String,
    pub ttl_hours: i64,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret_key", &"[REDACTED]")
            .field("cookie_name", &self.cookie_name)
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "locmem" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Page cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis_url: String,
    /// Lifetime of a cached index page
    pub index_ttl_secs: u64,
    pub max_entries: u64,
}

/// Uploaded media configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub root: PathBuf,
    /// Upload size limit in bytes
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                env: "development".to_string(),
                host: "127.0.0.1".to_string(),
                port: 8000,
                json_logs: false,
            },
            session: SessionConfig {
                secret_key: DEV_SECRET_KEY.to_string(),
                cookie_name: "yatube_session".to_string(),
                ttl_hours: 24 * 14,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                database_url: "postgresql://localhost/yatube".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_secs: 10,
            },
            cache: CacheConfig {
                backend: CacheBackend::Memory,
                redis_url: "redis://localhost:6379".to_string(),
                index_ttl_secs: 20,
                max_entries: 10_000,
            },
            media: MediaConfig {
                root: PathBuf::from("media"),
                max_upload_bytes: 5 * 1024 * 1024,
            },
            posts_per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Config::default();
        let app_env = std::env::var("APP_ENV").unwrap_or(defaults.app.env);
        let production = app_env.eq_ignore_ascii_case("production");

        let secret_key = match std::env::var("SECRET_KEY") {
            Ok(value) if !value.trim().is_empty() => value,
            _ if production => return Err("SECRET_KEY must be set in production".to_string()),
            _ => defaults.session.secret_key,
        };
        if production && (secret_key == DEV_SECRET_KEY || secret_key.len() < 32) {
            return Err(
                "SECRET_KEY must be a non-default value of at least 32 bytes in production"
                    .to_string(),
            );
        }

        let storage_backend = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            // A configured database means the caller wants it used.
            Err(_) if std::env::var("DATABASE_URL").is_ok() => StorageBackend::Postgres,
            Err(_) => defaults.storage.backend,
        };
        let cache_backend = match std::env::var("CACHE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.cache.backend,
        };

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("YATUBE_HOST").unwrap_or(defaults.app.host),
                port: parse_env_or_default("YATUBE_PORT", defaults.app.port)?,
                json_logs: std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            session: SessionConfig {
                secret_key,
                cookie_name: std::env::var("SESSION_COOKIE_NAME")
                    .unwrap_or(defaults.session.cookie_name),
                ttl_hours: parse_env_or_default("SESSION_TTL_HOURS", defaults.session.ttl_hours)?,
            },
            storage: StorageConfig {
                backend: storage_backend,
                database_url: std::env::var("DATABASE_URL")
                    .unwrap_or(defaults.storage.database_url),
                max_connections: parse_env_or_default(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.storage.max_connections,
                )?,
                min_connections: parse_env_or_default(
                    "DATABASE_MIN_CONNECTIONS",
                    defaults.storage.min_connections,
                )?,
                acquire_timeout_secs: parse_env_or_default(
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    defaults.storage.acquire_timeout_secs,
                )?,
            },
            cache: CacheConfig {
                backend: cache_backend,
                redis_url: std::env::var("REDIS_URL").unwrap_or(defaults.cache.redis_url),
                index_ttl_secs: parse_env_or_default(
                    "INDEX_CACHE_TTL_SECS",
                    defaults.cache.index_ttl_secs,
                )?,
                max_entries: parse_env_or_default("CACHE_MAX_ENTRIES", defaults.cache.max_entries)?,
            },
            media: MediaConfig {
                root: std::env::var("MEDIA_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.media.root),
                max_upload_bytes: parse_env_or_default(
                    "MEDIA_MAX_UPLOAD_BYTES",
                    defaults.media.max_upload_bytes,
                )?,
            },
            posts_per_page: parse_env_or_default("POSTS_PER_PAGE", defaults.posts_per_page)?,
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
