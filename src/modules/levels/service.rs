use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;

use schoolyard_core::{AppError, PaginationMeta, PaginationParams};
use schoolyard_db::relations;
use schoolyard_db::repositories::{ClassRepository, LevelRepository};
use schoolyard_models::{
    CreateLevelDto, DeleteLevelResponse, Level, LevelId, LevelWithClasses,
    PaginatedLevelsResponse, UpdateLevelDto,
};

const DUPLICATE_LEVEL: &str = "A level with this designation already exists.";

fn level_not_found() -> AppError {
    AppError::not_found(anyhow!("Could not find this level."))
}

pub struct LevelService;

impl LevelService {
    #[instrument(skip(db))]
    pub async fn create_level(db: &PgPool, dto: CreateLevelDto) -> Result<Level, AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Creating level failed, please try again.")?;

        LevelRepository::insert(&mut conn, &dto)
            .await
            .map_err(|e| {
                AppError::from_write(e, DUPLICATE_LEVEL, "Creating level failed, please try again.")
            })
    }

    #[instrument(skip(db))]
    pub async fn get_levels(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<PaginatedLevelsResponse, AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Fetching levels failed, please try again later.")?;

        let total = LevelRepository::count(&mut conn)
            .await
            .context("Fetching levels failed, please try again later.")?;
        let levels = LevelRepository::list(&mut conn, params.limit(), params.offset())
            .await
            .context("Fetching levels failed, please try again later.")?;

        Ok(PaginatedLevelsResponse {
            data: levels,
            meta: PaginationMeta::new(total, &params),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_level(db: &PgPool, id: LevelId) -> Result<LevelWithClasses, AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Fetching level failed, please try again later.")?;

        let level = LevelRepository::find(&mut conn, id)
            .await
            .context("Fetching level failed, please try again later.")?
            .ok_or_else(level_not_found)?;
        let classes = ClassRepository::by_level(&mut conn, id)
            .await
            .context("Fetching level failed, please try again later.")?;

        Ok(LevelWithClasses { level, classes })
    }

    #[instrument(skip(db))]
    pub async fn update_level(
        db: &PgPool,
        id: LevelId,
        dto: UpdateLevelDto,
    ) -> Result<Level, AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Updating level failed, please try again.")?;

        LevelRepository::update(&mut conn, id, &dto)
            .await
            .map_err(|e| {
                AppError::from_write(e, DUPLICATE_LEVEL, "Updating level failed, please try again.")
            })?
            .ok_or_else(level_not_found)
    }

    /// Clears the level reference of its classes, then deletes it.
    #[instrument(skip(db))]
    pub async fn delete_level(db: &PgPool, id: LevelId) -> Result<DeleteLevelResponse, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Deleting level failed, please try again.")?;

        if !LevelRepository::lock(&mut tx, id)
            .await
            .context("Deleting level failed, please try again.")?
        {
            return Err(level_not_found());
        }

        let detached_classes = relations::detach_level(&mut tx, id)
            .await
            .context("Deleting level failed, please try again.")?;
        let level = LevelRepository::delete(&mut tx, id)
            .await
            .context("Deleting level failed, please try again.")?
            .ok_or_else(level_not_found)?;

        tx.commit()
            .await
            .context("Deleting level failed, please try again.")?;

        tracing::info!(level_id = %id, detached_classes, "Level deleted");

        Ok(DeleteLevelResponse {
            message: "Level deleted.".to_string(),
            level,
            detached_classes,
        })
    }
}
