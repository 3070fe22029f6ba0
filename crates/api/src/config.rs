//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BIND_ADDR` - Listen address (default: 0.0.0.0:8080)
//! - `JWT_SECRET` - HS256 signing secret for bearer tokens (insecure dev default)
//! - `DATABASE_URL` - `PostgreSQL` connection string; in-memory storage when unset
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `ALLOWED_ORIGINS` - Comma-separated CORS allow-list
//! - `ORDER_MAX_RETRIES` - Re-runs of an order transaction after a conflict (default: 3)
//! - `CATALOG_CACHE_CAPACITY` - Cached catalog pages (default: 1000)
//! - `CATALOG_CACHE_TTL_SECS` - Catalog page lifetime (default: 3600)
//!
//! ## Optional (SMTP - notifications are only logged when unset)
//! - `SMTP_HOST`, `SMTP_PORT` (default: 587), `SMTP_USERNAME`, `SMTP_PASSWORD`, `MAIL_FROM`

use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use atelier_infra::notify::SmtpSettings;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: SecretString,
    pub database_url: Option<SecretString>,
    pub database_max_connections: u32,
    pub allowed_origins: Vec<String>,
    pub order_max_retries: u32,
    pub catalog_cache_capacity: u64,
    pub catalog_cache_ttl: Duration,
    pub smtp: Option<SmtpSettings>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let jwt_secret = get_optional_env("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        Ok(Self {
            bind_addr: parse_env("BIND_ADDR", "0.0.0.0:8080")?,
            jwt_secret: SecretString::from(jwt_secret),
            database_url: get_optional_env("DATABASE_URL").map(SecretString::from),
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", "10")?,
            allowed_origins: get_optional_env("ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
            order_max_retries: parse_env("ORDER_MAX_RETRIES", "3")?,
            catalog_cache_capacity: parse_env("CATALOG_CACHE_CAPACITY", "1000")?,
            catalog_cache_ttl: Duration::from_secs(parse_env("CATALOG_CACHE_TTL_SECS", "3600")?),
            smtp: smtp_from_env()?,
        })
    }

    /// In-memory storage, logged notifications, no CORS origins.
    pub fn local(jwt_secret: &str) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: SecretString::from(jwt_secret.to_string()),
            database_url: None,
            database_max_connections: 10,
            allowed_origins: Vec::new(),
            order_max_retries: atelier_infra::orders::coordinator::DEFAULT_MAX_RETRIES,
            catalog_cache_capacity: 1000,
            catalog_cache_ttl: Duration::from_secs(3600),
            smtp: None,
        }
    }
}

fn smtp_from_env() -> Result<Option<SmtpSettings>, ConfigError> {
    let Some(host) = get_optional_env("SMTP_HOST") else {
        return Ok(None);
    };
    Ok(Some(SmtpSettings {
        host,
        port: parse_env("SMTP_PORT", "587")?,
        username: get_required_env("SMTP_USERNAME")?,
        password: SecretString::from(get_required_env("SMTP_PASSWORD")?),
        from_address: get_required_env("MAIL_FROM")?,
    }))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_optional_env(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" https://shop.example , ,http://localhost:3000"),
            vec!["https://shop.example", "http://localhost:3000"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn local_config_uses_in_memory_storage() {
        let config = AppConfig::local("s3cret");
        assert!(config.database_url.is_none());
        assert!(config.smtp.is_none());
        assert_eq!(config.order_max_retries, 3);
    }
}
