use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use schoolyard_core::{AppError, PaginationParams};
use schoolyard_models::{
    CreateTeacherDto, DeleteTeacherResponse, PaginatedTeachersResponse, Teacher, TeacherId,
    TeacherWithSubjects, UpdateTeacherDto,
};

use super::service::TeacherService;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/teacher",
    request_body = CreateTeacherDto,
    responses(
        (status = 201, description = "Teacher created and added to its subjects", body = Teacher),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Invalid input, unknown subject, or duplicate email/PIN", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_teacher(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    let teacher = TeacherService::create_teacher(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

#[utoipa::path(
    get,
    path = "/api/teacher",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated teachers", body = PaginatedTeachersResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teachers(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedTeachersResponse>, AppError> {
    Ok(Json(TeacherService::get_teachers(&state.db, params).await?))
}

#[utoipa::path(
    get,
    path = "/api/teacher/{id}",
    params(("id" = uuid::Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher with its subjects", body = TeacherWithSubjects),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
) -> Result<Json<TeacherWithSubjects>, AppError> {
    Ok(Json(TeacherService::get_teacher(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/teacher/{id}",
    params(("id" = uuid::Uuid, Path, description = "Teacher ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated", body = Teacher),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 422, description = "Invalid input, unknown subject, or duplicate email/PIN", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<Teacher>, AppError> {
    Ok(Json(TeacherService::update_teacher(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/teacher/{id}",
    params(("id" = uuid::Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher deleted and detached", body = DeleteTeacherResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
) -> Result<Json<DeleteTeacherResponse>, AppError> {
    Ok(Json(TeacherService::delete_teacher(&state.db, id).await?))
}
