use anyhow::{Context, anyhow};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use schoolyard_core::{AppError, PaginationMeta, PaginationParams};
use schoolyard_db::relations;
use schoolyard_db::repositories::{ClassRepository, StudentRepository};
use schoolyard_models::{
    AcademicYearId, Class, ClassId, CreateStudentDto, DeleteStudentResponse,
    PaginatedStudentsResponse, Student, StudentId, StudentWithClass, UpdateStudentDto,
};

use crate::metrics;

const DUPLICATE_STUDENT: &str = "A student with this email or PIN already exists.";
const EMAIL_TAKEN: &str = "A student with this email already exists.";
const CREATE_FAILED: &str = "Creating student failed, please try again.";
const FETCH_FAILED: &str = "Fetching students failed, please try again later.";
const UPDATE_FAILED: &str = "Updating student failed, please try again.";
const DELETE_FAILED: &str = "Deleting student failed, please try again.";

fn student_not_found() -> AppError {
    AppError::not_found(anyhow!("Could not find this student."))
}

fn class_not_found() -> AppError {
    AppError::not_found(anyhow!("Could not find the class to enroll this student in."))
}

/// Locks the target class and returns the academic year new students join.
async fn enrollment_target(
    conn: &mut PgConnection,
    class_id: ClassId,
    context: &'static str,
) -> Result<(ClassId, AcademicYearId), AppError> {
    let class = ClassRepository::load_for_update(conn, class_id)
        .await
        .context(context)?
        .ok_or_else(class_not_found)?;
    let year = class.require_current_academic_year()?;
    Ok((class.id, year.id))
}

/// Every roster of the student's current class that lists it. Empty when the
/// student is not enrolled or the class is gone.
async fn current_rosters(
    conn: &mut PgConnection,
    student: &Student,
    context: &'static str,
) -> Result<Vec<AcademicYearId>, AppError> {
    let Some(class_id) = student.class_id else {
        return Ok(Vec::new());
    };
    let class: Option<Class> = ClassRepository::load_for_update(conn, class_id)
        .await
        .context(context)?;
    Ok(class
        .map(|class| class.rosters_holding(student.id, student.academic_year_id))
        .unwrap_or_default())
}

pub struct StudentService;

impl StudentService {
    /// Inserts the student, enrolling it in the current academic year of
    /// `class_id` when one is given.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let mut tx = db.begin().await.context(CREATE_FAILED)?;

        if StudentRepository::email_taken(&mut tx, &dto.email, None)
            .await
            .context(CREATE_FAILED)?
        {
            return Err(AppError::conflict(anyhow!(EMAIL_TAKEN)));
        }

        let enrollment = match dto.class_id {
            Some(class_id) => Some(enrollment_target(&mut tx, class_id, CREATE_FAILED).await?),
            None => None,
        };

        let student = StudentRepository::insert(&mut tx, &dto, enrollment)
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_STUDENT, CREATE_FAILED))?;
        if let Some((_, year_id)) = enrollment {
            ClassRepository::push_student(&mut tx, year_id, student.id)
                .await
                .context(CREATE_FAILED)?;
        }

        tx.commit().await.context(CREATE_FAILED)?;

        if enrollment.is_some() {
            metrics::track_enrollment("create");
        }
        tracing::info!(student_id = %student.id, enrolled = enrollment.is_some(), "Student created");

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get_students(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let mut conn = db.acquire().await.context(FETCH_FAILED)?;

        let total = StudentRepository::count(&mut conn)
            .await
            .context(FETCH_FAILED)?;
        let students = StudentRepository::list(&mut conn, params.limit(), params.offset())
            .await
            .context(FETCH_FAILED)?;

        Ok(PaginatedStudentsResponse {
            data: students,
            meta: PaginationMeta::new(total, &params),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: StudentId) -> Result<StudentWithClass, AppError> {
        let mut conn = db.acquire().await.context(FETCH_FAILED)?;

        let student = StudentRepository::find(&mut conn, id)
            .await
            .context(FETCH_FAILED)?
            .ok_or_else(student_not_found)?;
        let class = match student.class_id {
            Some(class_id) => ClassRepository::summaries(&mut conn, &[class_id])
                .await
                .context(FETCH_FAILED)?
                .pop(),
            None => None,
        };

        Ok(StudentWithClass { student, class })
    }

    /// Updates the student. A `class_id` moves the student from its old
    /// roster to the current academic year of the new class. Both classes are
    /// locked up front in id order.
    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let mut tx = db.begin().await.context(UPDATE_FAILED)?;

        let current = StudentRepository::find_for_update(&mut tx, id)
            .await
            .context(UPDATE_FAILED)?
            .ok_or_else(student_not_found)?;

        if let Some(email) = dto.email.as_deref() {
            if StudentRepository::email_taken(&mut tx, email, Some(id))
                .await
                .context(UPDATE_FAILED)?
            {
                return Err(AppError::conflict(anyhow!(EMAIL_TAKEN)));
            }
        }

        StudentRepository::update_fields(&mut tx, id, &dto)
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_STUDENT, UPDATE_FAILED))?
            .ok_or_else(student_not_found)?;

        let transferred = match dto.class_id {
            Some(class_id) => {
                let involved: Vec<ClassId> =
                    current.class_id.into_iter().chain([class_id]).collect();
                ClassRepository::lock_many(&mut tx, &involved)
                    .await
                    .context(UPDATE_FAILED)?;

                let (class_id, year_id) =
                    enrollment_target(&mut tx, class_id, UPDATE_FAILED).await?;
                if current.is_enrolled() {
                    let rosters = current_rosters(&mut tx, &current, UPDATE_FAILED).await?;
                    relations::withdraw_student(&mut tx, id, &rosters)
                        .await
                        .context(UPDATE_FAILED)?;
                }
                relations::enroll_student(&mut tx, id, class_id, year_id)
                    .await
                    .context(UPDATE_FAILED)?;
                true
            }
            None => false,
        };

        let student = StudentRepository::find(&mut tx, id)
            .await
            .context(UPDATE_FAILED)?
            .ok_or_else(student_not_found)?;

        tx.commit().await.context(UPDATE_FAILED)?;

        if transferred {
            metrics::track_enrollment("transfer");
            tracing::info!(
                student_id = %id,
                from = ?current.class_id,
                to = ?student.class_id,
                "Student re-enrolled"
            );
        }

        Ok(student)
    }

    /// Pulls the student from its roster and deletes it.
    #[instrument(skip(db))]
    pub async fn delete_student(
        db: &PgPool,
        id: StudentId,
    ) -> Result<DeleteStudentResponse, AppError> {
        let mut tx = db.begin().await.context(DELETE_FAILED)?;

        let student = StudentRepository::find_for_update(&mut tx, id)
            .await
            .context(DELETE_FAILED)?
            .ok_or_else(student_not_found)?;

        let rosters = current_rosters(&mut tx, &student, DELETE_FAILED).await?;
        if !rosters.is_empty() {
            ClassRepository::pull_student(&mut tx, &rosters, id)
                .await
                .context(DELETE_FAILED)?;
        }
        StudentRepository::delete(&mut tx, id)
            .await
            .context(DELETE_FAILED)?;

        tx.commit().await.context(DELETE_FAILED)?;

        Ok(DeleteStudentResponse {
            message: "Student deleted.".to_string(),
            student,
        })
    }
}
