/// Configuration management for the web server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `APP_HOST`: Host to bind to (default: 0.0.0.0)
/// - `APP_PORT`: Port to bind to (default: 5000)
/// - `APP_PRODUCTION`: Secure cookies and HSTS (default: false)
/// - `DATABASE_URL`: SQLite connection string (default: sqlite://taskdesk.db)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `SESSION_SECRET`: Key for session and CSRF signing (required, 32+ chars)
/// - `SESSION_TTL_HOURS`: Session lifetime (default: 24)
/// - `ARGON2_MEMORY_KIB`, `ARGON2_ITERATIONS`, `ARGON2_PARALLELISM`: hashing cost
/// - `DISPLAY_UTC_OFFSET_MINUTES`: Offset used to show timestamps (default: 330)
/// - `DISPLAY_TZ_LABEL`: Label printed after timestamps (default: IST)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskdesk_web::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, FixedOffset};
use std::env;
use std::fmt;
use std::str::FromStr;
use taskdesk_shared::auth::password::HashingParams;

/// Minimum accepted length of `SESSION_SECRET`
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted `SESSION_TTL_HOURS` (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseSettings,

    /// Session configuration
    pub session: SessionConfig,

    /// Argon2 cost for new password hashes
    pub hashing: HashingParams,

    /// How timestamps are shown to users
    pub display: DisplayConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Served over HTTPS: marks cookies `Secure` and enables HSTS
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Signing key for session tokens and CSRF tokens
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session lifetime in hours
    pub ttl_hours: i64,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl SessionConfig {
    /// Session lifetime, kept within `1..=MAX_SESSION_TTL_HOURS` hours
    pub fn ttl(&self) -> Duration {
        Duration::hours(self.ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }
}

/// Display timezone
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Fixed offset from UTC
    pub offset: FixedOffset,

    /// Label printed after formatted times, e.g. "IST"
    pub label: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            offset: ist(),
            label: "IST".to_string(),
        }
    }
}

fn ist() -> FixedOffset {
    FixedOffset::east_opt(330 * 60).unwrap_or_else(|| unreachable!("+05:30 is a valid offset"))
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SESSION_SECRET` is missing or shorter than 32 characters
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = var_or("APP_PORT", 5000u16)?;
        let production = var_or("APP_PRODUCTION", false)?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://taskdesk.db".to_string());
        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", 5u32)?;

        let secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        let ttl_hours = var_or("SESSION_TTL_HOURS", 24i64)?;

        let defaults = HashingParams::default();
        let hashing = HashingParams {
            memory_kib: var_or("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: var_or("ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: var_or("ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        let offset_minutes = var_or("DISPLAY_UTC_OFFSET_MINUTES", 330i32)?;
        let offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            anyhow::anyhow!("DISPLAY_UTC_OFFSET_MINUTES out of range: {}", offset_minutes)
        })?;
        let label = env::var("DISPLAY_TZ_LABEL").unwrap_or_else(|_| "IST".to_string());

        let config = Self {
            server: ServerConfig {
                host,
                port,
                production,
            },
            database: DatabaseSettings {
                url: database_url,
                max_connections,
            },
            session: SessionConfig { secret, ttl_hours },
            hashing,
            display: DisplayConfig { offset, label },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that env parsing alone can't express
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.session.secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("SESSION_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        if self.session.ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        if self.session.ttl_hours > MAX_SESSION_TTL_HOURS {
            anyhow::bail!(
                "SESSION_TTL_HOURS must be at most {} (one year)",
                MAX_SESSION_TTL_HOURS
            );
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
