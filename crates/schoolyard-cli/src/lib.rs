//! # Schoolyard CLI
//!
//! Database seeding utilities for Schoolyard testing and development.
//!
//! Seeded data goes through the same repositories and relationship helpers as
//! the API, so levels list their classes, subjects list their teachers and
//! every seeded student sits on exactly one roster.
//!
//! ```ignore
//! use schoolyard_cli::seeder::{seed_all, SeedConfig};
//!
//! let summary = seed_all(&pool, &SeedConfig::default()).await?;
//! ```

pub mod seeder;
