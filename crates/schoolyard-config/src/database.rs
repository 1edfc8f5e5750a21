//! Connection pool settings.
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: pool size (default 10)
//! - `DB_ACQUIRE_TIMEOUT_SECS`: how long a request waits for a connection (default 5)
//! - `RUN_MIGRATIONS`: apply pending migrations on startup (default true)

use std::env;
use std::time::Duration;

use crate::parse_or;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10),
            acquire_timeout: Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5)),
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_url() {
        let config = DatabaseConfig::from_lookup(|_| None);
        assert!(config.url.is_none());
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert!(config.run_migrations);
    }

    #[test]
    fn test_values_are_parsed() {
        let config = DatabaseConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/schoolyard".into()),
            "DB_MAX_CONNECTIONS" => Some("25".into()),
            "RUN_MIGRATIONS" => Some("false".into()),
            _ => None,
        });
        assert_eq!(config.url.as_deref(), Some("postgres://localhost/schoolyard"));
        assert_eq!(config.max_connections, 25);
        assert!(!config.run_migrations);
    }
}
