//! # Schoolyard DB
//!
//! PostgreSQL access for the Schoolyard API.
//!
//! - [`init_db_pool`] / [`MIGRATOR`]: pool setup and embedded migrations
//! - [`repositories`]: typed reads and writes per table, no business rules
//! - [`relations`]: link/unlink operations keeping both sides of every
//!   cross-record reference in step
//!
//! Repository and relation functions take `&mut PgConnection`, so the same
//! call works on a pooled connection or inside a transaction:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let class = ClassRepository::insert(&mut tx, "6e A", level_id).await?;
//! relations::link_class_to_level(&mut tx, level_id, class.id).await?;
//! tx.commit().await?;
//! ```

pub mod relations;
pub mod repositories;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use schoolyard_config::DatabaseConfig;

pub use sqlx::{PgConnection, PgPool};

/// Schema migrations, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Connects a pool using `config`, applying pending migrations when
/// `config.run_migrations` is set.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(url)
        .await?;

    if config.run_migrations {
        MIGRATOR.run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
