//! # Schoolyard Core
//!
//! Foundational types shared by every Schoolyard crate:
//!
//! - [`errors`]: the [`AppError`] type and its JSON response conversion
//! - [`pagination`]: pagination parameters and response metadata
//! - [`password`]: password hashing and PIN comparison
//! - [`serde`]: custom deserialization helpers
//!
//! ```ignore
//! use schoolyard_core::AppError;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Could not find level."));
//! let hash = schoolyard_core::hash_password("secure_password")?;
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, pin_matches, verify_password};
