use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::auth::password::{MAX_COST, MIN_COST};

/// Shortest accepted `JWT_SECRET`, in bytes. HS256 keys should be at least 256 bits.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub keep_alive: Duration,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// Secret, token lifetime and hashing cost. `Debug` never prints the secret.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    pub allow_admin_registration: bool,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("allow_admin_registration", &self.allow_admin_registration)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub max_age: usize,
}

/// Carried for deployment tooling; the service does not enforce a limit itself.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let jwt_secret = vars.required("JWT_SECRET")?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                reason: format!("must be at least {} bytes", MIN_SECRET_LEN),
            });
        }

        let ttl_hours: i64 = vars.parsed("TOKEN_TTL_HOURS", 24)?;
        if ttl_hours < 1 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                reason: "must be at least 1".into(),
            });
        }

        // Expiry timestamps must stay representable, or every login would fail.
        let token_ttl = chrono::Duration::try_hours(ttl_hours)
            .filter(|ttl| chrono::Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                reason: "out of range".into(),
            })?;

        let bcrypt_cost: u32 = vars.parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(MIN_COST..=MAX_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: format!("must be between {} and {}", MIN_COST, MAX_COST),
            });
        }

        Ok(Self {
            server: ServerConfig {
                host: vars.or("SERVER_HOST", "127.0.0.1"),
                port: vars.parsed("SERVER_PORT", 8080)?,
                workers: vars.optional("SERVER_WORKERS")?,
                keep_alive: Duration::from_secs(vars.parsed("SERVER_KEEP_ALIVE_SECS", 75)?),
                request_timeout: Duration::from_secs(vars.parsed("SERVER_REQUEST_TIMEOUT_SECS", 5)?),
                shutdown_timeout: Duration::from_secs(
                    vars.parsed("SERVER_SHUTDOWN_TIMEOUT_SECS", 30)?,
                ),
            },
            database: DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars.parsed("DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout: Duration::from_secs(
                    vars.parsed("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?,
                ),
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl,
                bcrypt_cost,
                allow_admin_registration: vars.parsed("ALLOW_ADMIN_REGISTRATION", false)?,
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .or("CORS_ALLOWED_ORIGINS", "")
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect(),
                max_age: vars.parsed("CORS_MAX_AGE_SECS", 3600)?,
            },
            rate_limit: RateLimitConfig {
                requests: vars.parsed("RATE_LIMIT_REQUESTS", 100)?,
                window: Duration::from_secs(vars.parsed("RATE_LIMIT_WINDOW_SECS", 60)?),
            },
            log_level: vars.or("LOG_LEVEL", "info"),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn optional<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        self.get(key)
            .map(|raw| {
                raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    key,
                    reason: format!("cannot parse {:?}", raw),
                })
            })
            .transpose()
    }

    fn parsed<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        Ok(self.optional(key)?.unwrap_or(default))
    }
}
