//! # Schoolyard Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`cors`]: allowed CORS origins
//! - [`database`]: connection pool settings
//! - [`jwt`]: token signing secret and expiry
//! - [`server`]: HTTP listener and observability switches
//!
//! Every type exposes `from_env()` plus a `from_lookup()` variant that reads
//! through a closure, which keeps parsing testable without touching the
//! process environment.
//!
//! ```ignore
//! use schoolyard_config::{CorsConfig, DatabaseConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let server = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod jwt;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

/// Reads a variable through `lookup` and parses it, falling back to `default`
/// when it is missing or unparsable.
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
