//! Middleware and extractors for cross-cutting request concerns.
//!
//! - [`auth`]: bearer-token authentication
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::require_auth`] (a route layer over every `/api` router except
//!    admin signup/login) verifies the JWT and stores an [`auth::AuthUser`]
//!    in the request extensions
//! 3. Handlers that need the caller take `AuthUser` as an extractor
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn handler(auth_user: AuthUser) -> impl IntoResponse {
//!     tracing::info!(actor = %auth_user.email(), "doing things");
//! }
//! ```

pub mod auth;
