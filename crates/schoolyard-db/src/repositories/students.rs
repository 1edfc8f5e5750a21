use sqlx::{PgConnection, types::Json};

use schoolyard_models::{
    AcademicYearId, ClassId, CreateStudentDto, Student, StudentCredentials, StudentId,
    UpdateStudentDto,
};

const STUDENT_COLUMNS: &str = "id, first_name, last_name, email, phone, date_of_birth, \
                               place_of_birth, address, parent, class_id, academic_year_id, \
                               created_at, updated_at";

pub struct StudentRepository;

impl StudentRepository {
    pub async fn insert(
        conn: &mut PgConnection,
        dto: &CreateStudentDto,
        enrollment: Option<(ClassId, AcademicYearId)>,
    ) -> Result<Student, sqlx::Error> {
        sqlx::query_as::<_, Student>(&format!(
            "INSERT INTO students
                 (first_name, last_name, email, pin_number, phone, date_of_birth,
                  place_of_birth, address, parent, class_id, academic_year_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(dto.email.trim().to_lowercase())
        .bind(dto.pin_number.trim())
        .bind(dto.phone.trim())
        .bind(dto.date_of_birth)
        .bind(dto.place_of_birth.as_deref())
        .bind(dto.address.as_deref())
        .bind(Json(&dto.parent))
        .bind(enrollment.map(|(class_id, _)| class_id))
        .bind(enrollment.map(|(_, year_id)| year_id))
        .fetch_one(conn)
        .await
    }

    pub async fn find(conn: &mut PgConnection, id: StudentId) -> Result<Option<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: StudentId,
    ) -> Result<Option<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn email_taken(
        conn: &mut PgConnection,
        email: &str,
        except: Option<StudentId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM students
                 WHERE lower(email) = lower($1) AND ($2::uuid IS NULL OR id <> $2)
             )",
        )
        .bind(email.trim())
        .bind(except)
        .fetch_one(conn)
        .await
    }

    pub async fn credentials_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<StudentCredentials>, sqlx::Error> {
        sqlx::query_as::<_, StudentCredentials>(
            "SELECT id, first_name, last_name, email, pin_number
             FROM students WHERE lower(email) = lower($1)",
        )
        .bind(email.trim())
        .fetch_optional(conn)
        .await
    }

    pub async fn list(
        conn: &mut PgConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students
             ORDER BY last_name, first_name
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(conn)
        .await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
            .fetch_one(conn)
            .await
    }

    pub async fn by_class(
        conn: &mut PgConnection,
        class_id: ClassId,
    ) -> Result<Vec<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students
             WHERE class_id = $1
             ORDER BY last_name, first_name"
        ))
        .bind(class_id)
        .fetch_all(conn)
        .await
    }

    /// Updates personal fields; enrollment goes through
    /// [`set_enrollment`](Self::set_enrollment).
    pub async fn update_fields(
        conn: &mut PgConnection,
        id: StudentId,
        dto: &UpdateStudentDto,
    ) -> Result<Option<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(&format!(
            "UPDATE students
             SET first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 email = COALESCE($4, email),
                 pin_number = COALESCE($5, pin_number),
                 phone = COALESCE($6, phone),
                 date_of_birth = COALESCE($7, date_of_birth),
                 place_of_birth = COALESCE($8, place_of_birth),
                 address = COALESCE($9, address),
                 parent = COALESCE($10, parent),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.first_name.as_deref().map(str::trim))
        .bind(dto.last_name.as_deref().map(str::trim))
        .bind(dto.email.as_deref().map(|e| e.trim().to_lowercase()))
        .bind(dto.pin_number.as_deref().map(str::trim))
        .bind(dto.phone.as_deref().map(str::trim))
        .bind(dto.date_of_birth)
        .bind(dto.place_of_birth.as_deref())
        .bind(dto.address.as_deref())
        .bind(dto.parent.as_ref().map(Json))
        .fetch_optional(conn)
        .await
    }

    /// Points the student at a class roster, or clears the pointer with `None`.
    pub async fn set_enrollment(
        conn: &mut PgConnection,
        id: StudentId,
        enrollment: Option<(ClassId, AcademicYearId)>,
    ) -> Result<Option<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(&format!(
            "UPDATE students
             SET class_id = $2, academic_year_id = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(id)
        .bind(enrollment.map(|(class_id, _)| class_id))
        .bind(enrollment.map(|(_, year_id)| year_id))
        .fetch_optional(conn)
        .await
    }

    /// Clears the enrollment of every student pointing at one of `class_ids`.
    pub async fn clear_enrollment_for_classes(
        conn: &mut PgConnection,
        class_ids: &[ClassId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE students
             SET class_id = NULL, academic_year_id = NULL, updated_at = NOW()
             WHERE class_id = ANY($1)",
        )
        .bind(class_ids)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(conn: &mut PgConnection, id: StudentId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM students").execute(conn).await?;
        Ok(result.rows_affected())
    }
}
