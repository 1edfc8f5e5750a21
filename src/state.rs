use sqlx::PgPool;

use schoolyard_config::{CorsConfig, DatabaseConfig, JwtConfig};
use schoolyard_db::init_db_pool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(db: PgPool, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        Self {
            db,
            jwt_config,
            cors_config,
        }
    }
}

/// Builds the state from the environment, connecting the pool and applying
/// migrations.
pub async fn init_app_state(database: &DatabaseConfig) -> Result<AppState, sqlx::Error> {
    let db = init_db_pool(database).await?;

    Ok(AppState::new(db, JwtConfig::from_env(), CorsConfig::from_env()))
}
