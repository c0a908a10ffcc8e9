//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crate::auth::hash_password;

/// HTTP header carrying the admin credential as an alternative to the body field.
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_DATABASE_URL: &str = "sqlite://blog.db?mode=rwc";
    pub const DEV_ADMIN_PASSWORD: &str = "dev-admin-password";
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const DEV_DB_MAX_CONNECTIONS: u32 = 10;
    pub const DEV_DB_MIN_CONNECTIONS: u32 = 1;
    pub const DEV_MAX_UPLOAD_SIZE: usize = 10_485_760; // 10MB decoded image
    pub const DEV_IMAGE_CACHE_TTL_SECS: u64 = 86_400;
    pub const DEV_IMAGE_CACHE_MAX_ENTRIES: usize = 256;
    pub const DEV_IMAGE_CACHE_PURGE_SECS: u64 = 300;
    pub const DEV_S3_REGION: &str = "us-east-1";
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Connection URL (postgres:// or sqlite://)
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Where the admin secret came from.
#[derive(Clone)]
pub enum AdminSecret {
    /// SHA-256 digest, hex encoded.
    Hash(String),
    /// Plaintext password, hashed at startup.
    Plain(String),
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash(_) => write!(f, "AdminSecret::Hash([REDACTED])"),
            Self::Plain(_) => write!(f, "AdminSecret::Plain([REDACTED])"),
        }
    }
}

/// S3-compatible object storage settings. Storage is disabled when absent.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    /// S3 endpoint URL (for MinIO or custom S3-compatible services)
    pub endpoint: Option<String>,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Public base URL of the bucket. Without it, objects are proxied through `/files/`.
    pub public_url: Option<String>,
}

/// In-memory image cache limits.
#[derive(Debug, Clone)]
pub struct ImageCacheSettings {
    /// Entries idle for longer than this are dropped.
    pub ttl_secs: u64,
    pub max_entries: usize,
    /// How often the purge task runs.
    pub purge_interval_secs: u64,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    pub database: DatabaseSettings,
    /// Directory holding the static frontend site
    pub static_dir: Option<PathBuf>,
    /// Admin credential for moderation and publishing actions
    pub admin_secret: Option<AdminSecret>,
    /// Maximum decoded image size in bytes (default: 10MB)
    pub max_upload_size: usize,
    pub image_cache: ImageCacheSettings,
    pub storage: Option<StorageSettings>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development) every variable has a default
    /// and only RUST_ENV is required. In production mode the admin secret must
    /// be set and must not be the development default.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `BLOG_HOST`: Server host (default: 127.0.0.1)
    /// - `BLOG_PORT`: Server port (default: 8080)
    /// - `DATABASE_URL`: Postgres or SQLite connection string
    /// - `BLOG_DB_MAX_CONNECTIONS` / `BLOG_DB_MIN_CONNECTIONS`: pool bounds
    /// - `BLOG_ADMIN_PASSWORD_HASH`: SHA-256 hex digest of the admin password
    /// - `BLOG_ADMIN_PASSWORD`: plaintext admin password (hash takes precedence)
    /// - `BLOG_STATIC_DIR`: frontend site directory
    /// - `BLOG_MAX_UPLOAD_SIZE`: max decoded image size in bytes
    /// - `BLOG_IMAGE_CACHE_TTL_SECS`, `BLOG_IMAGE_CACHE_MAX_ENTRIES`,
    ///   `BLOG_IMAGE_CACHE_PURGE_SECS`: fallback image cache limits
    /// - `S3_BUCKET`: enables object storage when set
    /// - `S3_ENDPOINT`, `S3_REGION`, `S3_ACCESS_KEY`, `S3_SECRET_KEY`, `S3_PUBLIC_URL`
    pub fn from_env() -> Result<Self, ConfigError> {
        // Parse environment - required
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("BLOG_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());
        let port = parse_var("BLOG_PORT", defaults::DEV_PORT, "BLOG_PORT must be a valid port number")?;

        let database = DatabaseSettings {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| defaults::DEV_DATABASE_URL.to_string()),
            max_connections: parse_var(
                "BLOG_DB_MAX_CONNECTIONS",
                defaults::DEV_DB_MAX_CONNECTIONS,
                "BLOG_DB_MAX_CONNECTIONS must be a valid number",
            )?,
            min_connections: parse_var(
                "BLOG_DB_MIN_CONNECTIONS",
                defaults::DEV_DB_MIN_CONNECTIONS,
                "BLOG_DB_MIN_CONNECTIONS must be a valid number",
            )?,
        };

        let admin_secret = match (
            env::var("BLOG_ADMIN_PASSWORD_HASH").ok(),
            env::var("BLOG_ADMIN_PASSWORD").ok(),
        ) {
            (Some(hash), _) => Some(AdminSecret::Hash(hash)),
            (None, Some(plain)) => Some(AdminSecret::Plain(plain)),
            (None, None) if environment.is_development() => {
                Some(AdminSecret::Plain(defaults::DEV_ADMIN_PASSWORD.to_string()))
            }
            (None, None) => None,
        };

        let max_upload_size = parse_var(
            "BLOG_MAX_UPLOAD_SIZE",
            defaults::DEV_MAX_UPLOAD_SIZE,
            "BLOG_MAX_UPLOAD_SIZE must be a valid number",
        )?;

        let image_cache = ImageCacheSettings {
            ttl_secs: parse_var(
                "BLOG_IMAGE_CACHE_TTL_SECS",
                defaults::DEV_IMAGE_CACHE_TTL_SECS,
                "BLOG_IMAGE_CACHE_TTL_SECS must be a valid number",
            )?,
            max_entries: parse_var(
                "BLOG_IMAGE_CACHE_MAX_ENTRIES",
                defaults::DEV_IMAGE_CACHE_MAX_ENTRIES,
                "BLOG_IMAGE_CACHE_MAX_ENTRIES must be a valid number",
            )?,
            purge_interval_secs: parse_var(
                "BLOG_IMAGE_CACHE_PURGE_SECS",
                defaults::DEV_IMAGE_CACHE_PURGE_SECS,
                "BLOG_IMAGE_CACHE_PURGE_SECS must be a valid number",
            )?,
        };

        let static_dir = env::var("BLOG_STATIC_DIR").ok().map(PathBuf::from);

        // Object storage is optional; running without it is the degraded mode.
        let storage = env::var("S3_BUCKET").ok().map(|bucket| StorageSettings {
            endpoint: env::var("S3_ENDPOINT").ok(),
            bucket,
            region: env::var("S3_REGION").unwrap_or_else(|_| defaults::DEV_S3_REGION.to_string()),
            access_key: env::var("S3_ACCESS_KEY").unwrap_or_default(),
            secret_key: env::var("S3_SECRET_KEY").unwrap_or_default(),
            public_url: env::var("S3_PUBLIC_URL").ok(),
        });

        let config = Config {
            environment,
            host,
            port,
            database,
            static_dir,
            admin_secret,
            max_upload_size,
            image_cache,
            storage,
        };

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        match &self.admin_secret {
            None => errors.push(
                "BLOG_ADMIN_PASSWORD_HASH or BLOG_ADMIN_PASSWORD must be set in production."
                    .to_string(),
            ),
            Some(AdminSecret::Plain(password)) if password == defaults::DEV_ADMIN_PASSWORD => {
                errors.push(
                    "BLOG_ADMIN_PASSWORD is using the development default. Set a secure password."
                        .to_string(),
                );
            }
            Some(AdminSecret::Hash(hash))
                if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) =>
            {
                errors.push(
                    "BLOG_ADMIN_PASSWORD_HASH must be a 64 character hex SHA-256 digest."
                        .to_string(),
                );
            }
            Some(AdminSecret::Hash(hash))
                if hash.eq_ignore_ascii_case(&hash_password(defaults::DEV_ADMIN_PASSWORD)) =>
            {
                errors.push(
                    "BLOG_ADMIN_PASSWORD_HASH is the digest of the development default. Set a secure password."
                        .to_string(),
                );
            }
            Some(_) => {}
        }

        if let Some(ref storage) = self.storage
            && (storage.access_key.is_empty() || storage.secret_key.is_empty())
        {
            errors.push("S3_BUCKET is set but S3_ACCESS_KEY/S3_SECRET_KEY are missing.".to_string());
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }

    /// HTTP body limit: room for a base64 encoded image of the maximum size
    /// plus the surrounding JSON.
    pub fn payload_limit(&self) -> usize {
        payload_limit(self.max_upload_size)
    }
}

/// Body limit for a given maximum decoded upload size.
pub fn payload_limit(max_upload_size: usize) -> usize {
    max_upload_size.div_ceil(3) * 4 + 64 * 1024
}

fn parse_var<T: std::str::FromStr>(
    name: &str,
    default: T,
    message: &'static str,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue(message)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
