use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use schoolyard_core::{AppError, PaginationParams};
use schoolyard_models::{
    CreateSubjectDto, DeleteSubjectResponse, PaginatedSubjectsResponse, Subject, SubjectId,
    SubjectWithTeachers, TeacherId, UpdateSubjectDto,
};

use super::service::SubjectService;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/subject",
    request_body = CreateSubjectDto,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Invalid input or duplicate designation/code", body = ErrorResponse)
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_subject(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateSubjectDto>,
) -> Result<(StatusCode, Json<Subject>), AppError> {
    let subject = SubjectService::create_subject(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

#[utoipa::path(
    get,
    path = "/api/subject",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated subjects", body = PaginatedSubjectsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_subjects(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedSubjectsResponse>, AppError> {
    Ok(Json(SubjectService::get_subjects(&state.db, params).await?))
}

#[utoipa::path(
    get,
    path = "/api/subject/{id}",
    params(("id" = uuid::Uuid, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject with its teachers", body = SubjectWithTeachers),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<SubjectId>,
) -> Result<Json<SubjectWithTeachers>, AppError> {
    Ok(Json(SubjectService::get_subject(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/subject/{id}",
    params(("id" = uuid::Uuid, Path, description = "Subject ID")),
    request_body = UpdateSubjectDto,
    responses(
        (status = 200, description = "Subject updated", body = Subject),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 422, description = "Invalid input or duplicate designation/code", body = ErrorResponse)
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<SubjectId>,
    ValidatedJson(dto): ValidatedJson<UpdateSubjectDto>,
) -> Result<Json<Subject>, AppError> {
    Ok(Json(SubjectService::update_subject(&state.db, id, dto).await?))
}

#[utoipa::path(
    patch,
    path = "/api/subject/{id}/{teacher_id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Subject ID"),
        ("teacher_id" = uuid::Uuid, Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "Teacher and subject detached from each other", body = SubjectWithTeachers),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn remove_teacher(
    State(state): State<AppState>,
    Path((subject_id, teacher_id)): Path<(SubjectId, TeacherId)>,
) -> Result<Json<SubjectWithTeachers>, AppError> {
    Ok(Json(
        SubjectService::remove_teacher(&state.db, subject_id, teacher_id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/subject/{id}",
    params(("id" = uuid::Uuid, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject deleted and detached everywhere", body = DeleteSubjectResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    ),
    tag = "Subjects",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<SubjectId>,
) -> Result<Json<DeleteSubjectResponse>, AppError> {
    Ok(Json(SubjectService::delete_subject(&state.db, id).await?))
}
