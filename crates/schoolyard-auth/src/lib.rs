//! # Schoolyard Auth
//!
//! Access-token claims and JWT helpers.
//!
//! - [`claims`]: [`Claims`] and the [`UserType`] of the authenticated account
//! - [`jwt`]: token creation and verification
//!
//! ```ignore
//! use schoolyard_auth::{UserType, create_access_token, verify_token};
//! use schoolyard_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "head@school.org", UserType::Admin, &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{Claims, UserType};
pub use jwt::{create_access_token, verify_token};
