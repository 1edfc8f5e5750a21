use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use schoolyard_core::{AppError, PaginationParams};
use schoolyard_models::{
    CreateLevelDto, DeleteLevelResponse, Level, LevelId, LevelWithClasses,
    PaginatedLevelsResponse, UpdateLevelDto,
};

use super::service::LevelService;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/level",
    request_body = CreateLevelDto,
    responses(
        (status = 201, description = "Level created", body = Level),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Invalid input or duplicate designation", body = ErrorResponse)
    ),
    tag = "Levels",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_level(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateLevelDto>,
) -> Result<(StatusCode, Json<Level>), AppError> {
    let level = LevelService::create_level(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(level)))
}

#[utoipa::path(
    get,
    path = "/api/level",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated levels", body = PaginatedLevelsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Levels",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_levels(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedLevelsResponse>, AppError> {
    Ok(Json(LevelService::get_levels(&state.db, params).await?))
}

#[utoipa::path(
    get,
    path = "/api/level/{id}",
    params(("id" = uuid::Uuid, Path, description = "Level ID")),
    responses(
        (status = 200, description = "Level with its classes", body = LevelWithClasses),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Level not found", body = ErrorResponse)
    ),
    tag = "Levels",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_level(
    State(state): State<AppState>,
    Path(id): Path<LevelId>,
) -> Result<Json<LevelWithClasses>, AppError> {
    Ok(Json(LevelService::get_level(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/level/{id}",
    params(("id" = uuid::Uuid, Path, description = "Level ID")),
    request_body = UpdateLevelDto,
    responses(
        (status = 200, description = "Level updated", body = Level),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Level not found", body = ErrorResponse),
        (status = 422, description = "Invalid input or duplicate designation", body = ErrorResponse)
    ),
    tag = "Levels",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_level(
    State(state): State<AppState>,
    Path(id): Path<LevelId>,
    ValidatedJson(dto): ValidatedJson<UpdateLevelDto>,
) -> Result<Json<Level>, AppError> {
    Ok(Json(LevelService::update_level(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/level/{id}",
    params(("id" = uuid::Uuid, Path, description = "Level ID")),
    responses(
        (status = 200, description = "Level deleted, its classes detached", body = DeleteLevelResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Level not found", body = ErrorResponse)
    ),
    tag = "Levels",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_level(
    State(state): State<AppState>,
    Path(id): Path<LevelId>,
) -> Result<Json<DeleteLevelResponse>, AppError> {
    Ok(Json(LevelService::delete_level(&state.db, id).await?))
}
