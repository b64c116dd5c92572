/// Configuration management for Comment Service
///
/// Loads configuration from environment variables. `main` calls
/// `dotenvy::dotenv()` first so a local `.env` file is honoured.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Pagination defaults and limits
    pub pagination: PaginationConfig,
    /// Which persistence gateway to run against
    pub storage: StorageConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }
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
    /// Timeout for the startup `SELECT 1` check
    pub connect_timeout_secs: u64,
    /// Wait for a pooled connection before failing the request
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Log the pool settings without the connection URL.
    pub fn log_config(&self) {
        tracing::info!(
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            connect_timeout_secs = self.connect_timeout_secs,
            acquire_timeout_secs = self.acquire_timeout_secs,
            idle_timeout_secs = self.idle_timeout_secs,
            max_lifetime_secs = self.max_lifetime_secs,
            "Database pool configuration"
        );
    }
}

/// Pagination defaults applied by the HTTP layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the request omits one
    pub default_page_size: i64,
    /// Largest page size a request may ask for
    pub max_page_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 5,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(StorageBackend::Postgres),
            "memory" | "in-memory" => Some(StorageBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

// Default values
fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("COMMENT_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("COMMENT_SERVICE_PORT", 8080),
        };

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if app.is_production() => {
                    bail!("CORS_ALLOWED_ORIGINS must be set in production")
                }
                Err(_) => "http://localhost:3000".to_string(),
            };

            if app.is_production() && allowed_origins.split(',').any(|o| o.trim() == "*") {
                bail!("CORS_ALLOWED_ORIGINS cannot be '*' in production");
            }

            CorsConfig { allowed_origins }
        };

        let storage = StorageConfig {
            backend: match std::env::var("STORAGE_BACKEND") {
                Ok(value) => StorageBackend::parse(&value)
                    .with_context(|| format!("unknown STORAGE_BACKEND '{}'", value))?,
                Err(_) => StorageBackend::Postgres,
            },
            run_migrations: env_flag("RUN_MIGRATIONS", true),
        };

        let database = DatabaseConfig {
            url: match std::env::var("DATABASE_URL") {
                Ok(url) => url,
                Err(_) if app.is_production() && storage.backend == StorageBackend::Postgres => {
                    bail!("DATABASE_URL must be set in production")
                }
                Err(_) => "postgresql://localhost/comments".to_string(),
            },
            max_connections: env_or("DB_MAX_CONNECTIONS", default_max_connections()),
            min_connections: env_or("DB_MIN_CONNECTIONS", default_min_connections()),
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT_SECS", 5),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 10),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", 600),
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", 1800),
        };

        if database.min_connections > database.max_connections {
            bail!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                database.min_connections,
                database.max_connections
            );
        }

        let pagination = PaginationConfig {
            default_page_size: env_or("PAGINATION_DEFAULT_PAGE_SIZE", 5),
            max_page_size: env_or("PAGINATION_MAX_PAGE_SIZE", 100),
        };

        if pagination.default_page_size < 1
            || pagination.default_page_size > pagination.max_page_size
        {
            bail!(
                "PAGINATION_DEFAULT_PAGE_SIZE must be between 1 and {}",
                pagination.max_page_size
            );
        }

        let logging = LoggingConfig {
            json: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        Ok(Config {
            app,
            cors,
            database,
            pagination,
            storage,
            logging,
        })
    }
}
