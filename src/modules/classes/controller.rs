use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use schoolyard_core::{AppError, PaginationParams};
use schoolyard_models::{
    AssignSubjectsDto, AssignTeacherDto, BulkRolloverResponse, Class, ClassDetails, ClassId,
    CreateClassDto, DeleteClassResponse, GenerateAcademicYearDto, GenerateAcademicYearForAllDto,
    PaginatedClassesResponse, RolloverResponse, TimetableDto, UpdateClassDto,
};

use super::service::ClassService;
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/class",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created and linked to its level", body = Class),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Level not found", body = ErrorResponse),
        (status = 422, description = "Invalid input or duplicate designation", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_class(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    let class = ClassService::create_class(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    get,
    path = "/api/class",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated classes with their academic years", body = PaginatedClassesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedClassesResponse>, AppError> {
    Ok(Json(ClassService::get_classes(&state.db, params).await?))
}

#[utoipa::path(
    get,
    path = "/api/class/{id}",
    params(("id" = uuid::Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class with its level and subjects", body = ClassDetails),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<Json<ClassDetails>, AppError> {
    Ok(Json(ClassService::get_class(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/class/{id}",
    params(("id" = uuid::Uuid, Path, description = "Class ID")),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated", body = Class),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Class or level not found", body = ErrorResponse),
        (status = 422, description = "Invalid input or duplicate designation", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<Class>, AppError> {
    Ok(Json(ClassService::update_class(&state.db, id, dto).await?))
}

#[utoipa::path(
    patch,
    path = "/api/class/add-subjects/{id}",
    params(("id" = uuid::Uuid, Path, description = "Class ID")),
    request_body = AssignSubjectsDto,
    responses(
        (status = 200, description = "Subject set replaced", body = Class),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Class or one of the subjects not found", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn assign_subjects(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<AssignSubjectsDto>,
) -> Result<Json<Class>, AppError> {
    Ok(Json(ClassService::assign_subjects(&state.db, id, dto).await?))
}

#[utoipa::path(
    patch,
    path = "/api/class/assign-teacher-to-a-subject",
    request_body = AssignTeacherDto,
    responses(
        (status = 200, description = "Teacher assigned (or unassigned) in the current year", body = Class),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Class, academic year, subject or teacher not found", body = ErrorResponse),
        (status = 422, description = "Academic year is not the current one", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(actor = %auth_user.email(), role = ?auth_user.user_type()))]
pub async fn assign_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<AssignTeacherDto>,
) -> Result<Json<Class>, AppError> {
    Ok(Json(ClassService::assign_teacher(&state.db, dto).await?))
}

#[utoipa::path(
    patch,
    path = "/api/class/generate-new-year-for-one-class/{id}",
    params(("id" = uuid::Uuid, Path, description = "Class ID")),
    request_body = GenerateAcademicYearDto,
    responses(
        (status = 200, description = "Academic year appended, previous roster released", body = RolloverResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Class, subject or teacher not found, or year already exists", body = ErrorResponse),
        (status = 422, description = "Invalid academic year", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(actor = %auth_user.email(), role = ?auth_user.user_type()))]
pub async fn generate_year_for_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<GenerateAcademicYearDto>,
) -> Result<Json<RolloverResponse>, AppError> {
    Ok(Json(
        ClassService::generate_year_for_class(&state.db, id, dto).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/class/generate-new-year-for-classes",
    request_body = GenerateAcademicYearForAllDto,
    responses(
        (status = 200, description = "Academic year appended to every class", body = BulkRolloverResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No class exists, or a class already has this year", body = ErrorResponse),
        (status = 422, description = "Invalid academic year", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(actor = %auth_user.email(), role = ?auth_user.user_type()))]
pub async fn generate_year_for_all(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<GenerateAcademicYearForAllDto>,
) -> Result<Json<BulkRolloverResponse>, AppError> {
    Ok(Json(ClassService::generate_year_for_all(&state.db, dto).await?))
}

#[utoipa::path(
    patch,
    path = "/api/class/generate-time-table/{id}",
    params(("id" = uuid::Uuid, Path, description = "Class ID")),
    request_body = TimetableDto,
    responses(
        (status = 200, description = "Timetable replaced", body = Class),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn set_timetable(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<TimetableDto>,
) -> Result<Json<Class>, AppError> {
    Ok(Json(ClassService::set_timetable(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/class/{id}",
    params(("id" = uuid::Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deleted, its students released", body = DeleteClassResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<ClassId>,
) -> Result<Json<DeleteClassResponse>, AppError> {
    Ok(Json(ClassService::delete_class(&state.db, id).await?))
}
