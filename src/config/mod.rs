use std::env;
use std::str::FromStr;

use crate::i18n::Locale;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_idle_timeout_secs: u64,
    pub database_max_lifetime_secs: u64,
    pub database_acquire_timeout_secs: u64,
    pub run_migrations: bool,
    pub host: String,
    pub port: u16,
    pub default_lang: Locale,
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 25),
            database_min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 0),
            database_idle_timeout_secs: parse_or("DATABASE_IDLE_TIMEOUT_SECS", 300),
            database_max_lifetime_secs: parse_or("DATABASE_MAX_LIFETIME_SECS", 300),
            database_acquire_timeout_secs: parse_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 30),
            run_migrations: parse_or("RUN_MIGRATIONS", true),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("BACKEND_PORT", 8080),
            default_lang: env::var("DEFAULT_LANG")
                .ok()
                .and_then(|v| Locale::from_tag(&v))
                .unwrap_or_default(),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }

    /// Whether the configured storage is the in-memory repository.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
impl AppConfig {
    /// Configuration suitable for unit tests; never touches the environment.
    pub fn for_tests() -> Self {
        Self {
            database_url: "memory://".to_string(),
            database_max_connections: 5,
            database_min_connections: 0,
            database_idle_timeout_secs: 300,
            database_max_lifetime_secs: 300,
            database_acquire_timeout_secs: 30,
            run_migrations: false,
            host: "127.0.0.1".to_string(),
            port: 0,
            default_lang: Locale::Id,
            cors_allowed_origin: None,
        }
    }
}
