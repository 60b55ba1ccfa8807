/// Configuration management for the API server
///
/// Configuration is read from the environment once at start-up and handed to
/// [`crate::app::AppState`]; nothing reads the environment afterwards.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST` / `API_PORT`: Bind address (default: 0.0.0.0:4000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`, refused in production)
/// - `PRODUCTION`: Marks session cookies `Secure` (default: false)
/// - `JWT_SECRET`: Session token signing secret, at least 32 characters (required)
/// - `SESSION_TTL_HOURS`: Session lifetime (default: 720)
/// - `SESSION_COOKIE_NAME`: Cookie carrying the session (default: parallel_session)
/// - `UPLOAD_ENDPOINT`: Asset store endpoint; uploads are disabled when unset
/// - `UPLOAD_MAX_BYTES`: Largest accepted upload (default: 10000000)
/// - `REPORTING_UTC_OFFSET_MINUTES`: Time zone of analytics months (default: 0)
///
/// # Example
///
/// ```no_run
/// use parallel_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub upload: UploadConfig,
    pub reporting: ReportingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production deployments serve over HTTPS
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secret key for token signing
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    pub ttl_hours: i64,
    pub cookie_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub endpoint: Option<String>,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    pub utc_offset_minutes: i32,
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", name, e)),
        _ => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does not
    /// parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("API_PORT", 4000u16)?;
        let cors_origins = parse_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));
        let production = parse_var("PRODUCTION", false)?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 10u32)?;

        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        let ttl_hours = parse_var("SESSION_TTL_HOURS", 720i64)?;
        let cookie_name =
            env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "parallel_session".to_string());

        let endpoint = env::var("UPLOAD_ENDPOINT")
            .ok()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        let max_bytes = parse_var("UPLOAD_MAX_BYTES", 10_000_000usize)?;

        let utc_offset_minutes = parse_var("REPORTING_UTC_OFFSET_MINUTES", 0i32)?;

        let config = Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig {
                secret,
                ttl_hours,
                cookie_name,
            },
            upload: UploadConfig { endpoint, max_bytes },
            reporting: ReportingConfig { utc_offset_minutes },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.session.secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LENGTH);
        }
        if self.session.ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }
        if self.session.cookie_name.is_empty()
            || !self.session.cookie_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            anyhow::bail!("SESSION_COOKIE_NAME must be a non-empty token");
        }
        if self.upload.max_bytes == 0 {
            anyhow::bail!("UPLOAD_MAX_BYTES must be positive");
        }
        if self.reporting_offset().is_none() {
            anyhow::bail!("REPORTING_UTC_OFFSET_MINUTES must be within +/- 24 hours");
        }
        if self.api.production && self.allows_any_origin() {
            anyhow::bail!("CORS_ORIGINS must list explicit origins when PRODUCTION is set");
        }
        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Session token lifetime
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session.ttl_hours)
    }

    /// Reference time zone for analytics month windows
    pub fn reporting_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.reporting.utc_offset_minutes.checked_mul(60)?)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
