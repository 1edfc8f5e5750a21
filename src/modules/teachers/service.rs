use std::collections::HashSet;

use anyhow::{Context, anyhow};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use schoolyard_core::{AppError, PaginationMeta, PaginationParams};
use schoolyard_db::relations;
use schoolyard_db::repositories::{SubjectRepository, TeacherRepository};
use schoolyard_models::{
    CreateTeacherDto, DeleteTeacherResponse, PaginatedTeachersResponse, SubjectId, Teacher,
    TeacherId, TeacherWithSubjects, UpdateTeacherDto,
};

use crate::modules::dedup_ids;

const DUPLICATE_TEACHER: &str = "A teacher with this email or PIN already exists.";
const EMAIL_TAKEN: &str = "A teacher with this email already exists.";
const INVALID_SUBJECTS: &str = "You should assign a valid subject to a teacher.";
const CREATE_FAILED: &str = "Creating teacher failed, please try again.";
const FETCH_FAILED: &str = "Fetching teachers failed, please try again later.";
const UPDATE_FAILED: &str = "Updating teacher failed, please try again.";
const DELETE_FAILED: &str = "Deleting teacher failed, please try again.";

fn teacher_not_found() -> AppError {
    AppError::not_found(anyhow!("Could not find this teacher."))
}

/// Deduplicates `requested` and checks that it is non-empty and that every
/// subject exists. The requested subjects and those in `held` stay locked
/// until the transaction ends.
async fn resolve_subjects(
    conn: &mut PgConnection,
    requested: &[SubjectId],
    held: &[SubjectId],
    context: &'static str,
) -> Result<Vec<SubjectId>, AppError> {
    let subject_ids = dedup_ids(requested);
    if subject_ids.is_empty() {
        return Err(AppError::unprocessable(anyhow!(INVALID_SUBJECTS)));
    }

    let mut to_lock = subject_ids.clone();
    to_lock.extend_from_slice(held);
    let found: HashSet<SubjectId> = SubjectRepository::lock_existing(conn, &dedup_ids(&to_lock))
        .await
        .context(context)?
        .into_iter()
        .collect();
    if subject_ids.iter().any(|id| !found.contains(id)) {
        return Err(AppError::unprocessable(anyhow!(INVALID_SUBJECTS)));
    }

    Ok(subject_ids)
}

pub struct TeacherService;

impl TeacherService {
    /// Inserts the teacher and adds it to each of its subjects.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_teacher(db: &PgPool, dto: CreateTeacherDto) -> Result<Teacher, AppError> {
        let mut tx = db.begin().await.context(CREATE_FAILED)?;

        if TeacherRepository::email_taken(&mut tx, &dto.email, None)
            .await
            .context(CREATE_FAILED)?
        {
            return Err(AppError::conflict(anyhow!(EMAIL_TAKEN)));
        }

        let subject_ids = resolve_subjects(&mut tx, &dto.subjects, &[], CREATE_FAILED).await?;

        let teacher = TeacherRepository::insert(&mut tx, &dto, &subject_ids)
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_TEACHER, CREATE_FAILED))?;
        relations::link_teacher_subjects(&mut tx, teacher.id, &subject_ids)
            .await
            .context(CREATE_FAILED)?;

        tx.commit().await.context(CREATE_FAILED)?;

        tracing::info!(teacher_id = %teacher.id, subjects = subject_ids.len(), "Teacher created");

        Ok(teacher)
    }

    #[instrument(skip(db))]
    pub async fn get_teachers(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<PaginatedTeachersResponse, AppError> {
        let mut conn = db.acquire().await.context(FETCH_FAILED)?;

        let total = TeacherRepository::count(&mut conn)
            .await
            .context(FETCH_FAILED)?;
        let teachers = TeacherRepository::list(&mut conn, params.limit(), params.offset())
            .await
            .context(FETCH_FAILED)?;

        Ok(PaginatedTeachersResponse {
            data: teachers,
            meta: PaginationMeta::new(total, &params),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_teacher(db: &PgPool, id: TeacherId) -> Result<TeacherWithSubjects, AppError> {
        let mut conn = db.acquire().await.context(FETCH_FAILED)?;

        let teacher = TeacherRepository::find(&mut conn, id)
            .await
            .context(FETCH_FAILED)?
            .ok_or_else(teacher_not_found)?;
        let subjects = SubjectRepository::summaries(&mut conn, &teacher.subject_ids)
            .await
            .context(FETCH_FAILED)?;

        Ok(TeacherWithSubjects { teacher, subjects })
    }

    /// Updates the teacher. A `subjects` list replaces the previous one: the
    /// old subjects lose the teacher and the new ones gain it.
    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        id: TeacherId,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let mut tx = db.begin().await.context(UPDATE_FAILED)?;

        let current = TeacherRepository::find_for_update(&mut tx, id)
            .await
            .context(UPDATE_FAILED)?
            .ok_or_else(teacher_not_found)?;

        if let Some(email) = dto.email.as_deref() {
            if TeacherRepository::email_taken(&mut tx, email, Some(id))
                .await
                .context(UPDATE_FAILED)?
            {
                return Err(AppError::conflict(anyhow!(EMAIL_TAKEN)));
            }
        }

        let new_subjects = match dto.subjects.as_deref() {
            Some(requested) => Some(
                resolve_subjects(&mut tx, requested, &current.subject_ids, UPDATE_FAILED).await?,
            ),
            None => None,
        };

        TeacherRepository::update_fields(&mut tx, id, &dto)
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_TEACHER, UPDATE_FAILED))?
            .ok_or_else(teacher_not_found)?;

        if let Some(new_subjects) = &new_subjects {
            relations::replace_teacher_subjects(&mut tx, id, &current.subject_ids, new_subjects)
                .await
                .context(UPDATE_FAILED)?;
        }

        let teacher = TeacherRepository::find(&mut tx, id)
            .await
            .context(UPDATE_FAILED)?
            .ok_or_else(teacher_not_found)?;

        tx.commit().await.context(UPDATE_FAILED)?;

        Ok(teacher)
    }

    /// Removes the teacher from its subjects, vacates its assignments, then
    /// deletes it.
    #[instrument(skip(db))]
    pub async fn delete_teacher(
        db: &PgPool,
        id: TeacherId,
    ) -> Result<DeleteTeacherResponse, AppError> {
        let mut tx = db.begin().await.context(DELETE_FAILED)?;

        let teacher = TeacherRepository::find_for_update(&mut tx, id)
            .await
            .context(DELETE_FAILED)?
            .ok_or_else(teacher_not_found)?;

        let detached = relations::detach_teacher(&mut tx, id)
            .await
            .context(DELETE_FAILED)?;
        TeacherRepository::delete(&mut tx, id)
            .await
            .context(DELETE_FAILED)?;

        tx.commit().await.context(DELETE_FAILED)?;

        tracing::info!(
            teacher_id = %id,
            subjects = detached.subjects,
            assignments = detached.assignments,
            "Teacher deleted"
        );

        Ok(DeleteTeacherResponse {
            message: "Teacher deleted.".to_string(),
            teacher,
            vacated_assignments: detached.assignments,
        })
    }
}
