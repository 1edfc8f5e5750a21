use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;

use schoolyard_core::{AppError, PaginationMeta, PaginationParams};
use schoolyard_db::relations;
use schoolyard_db::repositories::{SubjectRepository, TeacherRepository};
use schoolyard_models::{
    CreateSubjectDto, DeleteSubjectResponse, PaginatedSubjectsResponse, Subject, SubjectId,
    SubjectWithTeachers, TeacherId, UpdateSubjectDto,
};

const DUPLICATE_SUBJECT: &str = "A subject with this designation or code already exists.";
const FETCH_FAILED: &str = "Fetching subjects failed, please try again later.";
const UPDATE_FAILED: &str = "Updating subject failed, please try again.";
const DELETE_FAILED: &str = "Deleting subject failed, please try again.";

fn subject_not_found() -> AppError {
    AppError::not_found(anyhow!("Could not find this subject."))
}

pub struct SubjectService;

impl SubjectService {
    #[instrument(skip(db))]
    pub async fn create_subject(db: &PgPool, dto: CreateSubjectDto) -> Result<Subject, AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Creating subject failed, please try again.")?;

        SubjectRepository::insert(&mut conn, &dto)
            .await
            .map_err(|e| {
                AppError::from_write(
                    e,
                    DUPLICATE_SUBJECT,
                    "Creating subject failed, please try again.",
                )
            })
    }

    #[instrument(skip(db))]
    pub async fn get_subjects(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<PaginatedSubjectsResponse, AppError> {
        let mut conn = db.acquire().await.context(FETCH_FAILED)?;

        let total = SubjectRepository::count(&mut conn)
            .await
            .context(FETCH_FAILED)?;
        let subjects = SubjectRepository::list(&mut conn, params.limit(), params.offset())
            .await
            .context(FETCH_FAILED)?;

        Ok(PaginatedSubjectsResponse {
            data: subjects,
            meta: PaginationMeta::new(total, &params),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_subject(db: &PgPool, id: SubjectId) -> Result<SubjectWithTeachers, AppError> {
        let mut conn = db.acquire().await.context(FETCH_FAILED)?;

        let subject = SubjectRepository::find(&mut conn, id)
            .await
            .context(FETCH_FAILED)?
            .ok_or_else(subject_not_found)?;
        let teachers = TeacherRepository::summaries(&mut conn, &subject.teacher_ids)
            .await
            .context(FETCH_FAILED)?;

        Ok(SubjectWithTeachers { subject, teachers })
    }

    #[instrument(skip(db))]
    pub async fn update_subject(
        db: &PgPool,
        id: SubjectId,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        let mut conn = db.acquire().await.context(UPDATE_FAILED)?;

        SubjectRepository::update(&mut conn, id, &dto)
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_SUBJECT, UPDATE_FAILED))?
            .ok_or_else(subject_not_found)
    }

    /// Removes the teacher from the subject and the subject from the teacher.
    #[instrument(skip(db))]
    pub async fn remove_teacher(
        db: &PgPool,
        subject_id: SubjectId,
        teacher_id: TeacherId,
    ) -> Result<SubjectWithTeachers, AppError> {
        let mut tx = db.begin().await.context(UPDATE_FAILED)?;

        if !SubjectRepository::exists(&mut tx, subject_id)
            .await
            .context(UPDATE_FAILED)?
        {
            return Err(subject_not_found());
        }

        relations::unlink_teacher_from_subject(&mut tx, subject_id, teacher_id)
            .await
            .context(UPDATE_FAILED)?;

        let subject = SubjectRepository::find(&mut tx, subject_id)
            .await
            .context(UPDATE_FAILED)?
            .ok_or_else(subject_not_found)?;
        let teachers = TeacherRepository::summaries(&mut tx, &subject.teacher_ids)
            .await
            .context(UPDATE_FAILED)?;

        tx.commit().await.context(UPDATE_FAILED)?;

        tracing::info!(subject_id = %subject_id, teacher_id = %teacher_id, "Teacher removed from subject");

        Ok(SubjectWithTeachers { subject, teachers })
    }

    /// Detaches the subject from teachers, classes and teacher assignments,
    /// then deletes it.
    #[instrument(skip(db))]
    pub async fn delete_subject(
        db: &PgPool,
        id: SubjectId,
    ) -> Result<DeleteSubjectResponse, AppError> {
        let mut tx = db.begin().await.context(DELETE_FAILED)?;

        let subject = SubjectRepository::find_for_update(&mut tx, id)
            .await
            .context(DELETE_FAILED)?
            .ok_or_else(subject_not_found)?;

        let detached = relations::detach_subject(&mut tx, id)
            .await
            .context(DELETE_FAILED)?;
        SubjectRepository::delete(&mut tx, id)
            .await
            .context(DELETE_FAILED)?;

        tx.commit().await.context(DELETE_FAILED)?;

        tracing::info!(
            subject_id = %id,
            teachers = detached.teachers,
            classes = detached.classes,
            assignments = detached.assignments,
            "Subject deleted"
        );

        Ok(DeleteSubjectResponse {
            message: "Subject deleted.".to_string(),
            subject,
            detached_teachers: detached.teachers,
            detached_classes: detached.classes,
        })
    }
}
