use sqlx::PgConnection;

use schoolyard_models::{
    CreateTeacherDto, SubjectId, Teacher, TeacherCredentials, TeacherId, TeacherSummary,
    UpdateTeacherDto,
};

const TEACHER_COLUMNS: &str = "id, first_name, last_name, email, phone, date_of_birth, \
                               place_of_birth, address, salary, subject_ids, created_at, updated_at";

pub struct TeacherRepository;

impl TeacherRepository {
    /// Inserts the teacher with `subject_ids` already deduplicated by the caller.
    pub async fn insert(
        conn: &mut PgConnection,
        dto: &CreateTeacherDto,
        subject_ids: &[SubjectId],
    ) -> Result<Teacher, sqlx::Error> {
        sqlx::query_as::<_, Teacher>(&format!(
            "INSERT INTO teachers
                 (first_name, last_name, email, pin_number, phone, date_of_birth,
                  place_of_birth, address, salary, subject_ids)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {TEACHER_COLUMNS}"
        ))
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(dto.email.trim().to_lowercase())
        .bind(dto.pin_number.trim())
        .bind(dto.phone.trim())
        .bind(dto.date_of_birth)
        .bind(dto.place_of_birth.as_deref())
        .bind(dto.address.as_deref())
        .bind(dto.salary)
        .bind(subject_ids)
        .fetch_one(conn)
        .await
    }

    pub async fn find(conn: &mut PgConnection, id: TeacherId) -> Result<Option<Teacher>, sqlx::Error> {
        sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Same as [`find`](Self::find) but locks the row for the transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: TeacherId,
    ) -> Result<Option<Teacher>, sqlx::Error> {
        sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Whether the teacher exists. The row is share-locked until the
    /// transaction ends.
    pub async fn exists(conn: &mut PgConnection, id: TeacherId) -> Result<bool, sqlx::Error> {
        let found =
            sqlx::query_scalar::<_, TeacherId>("SELECT id FROM teachers WHERE id = $1 FOR SHARE")
                .bind(id)
                .fetch_optional(conn)
                .await?;
        Ok(found.is_some())
    }

    /// The subset of `ids` that exist, share-locked until the transaction ends.
    pub async fn existing_ids(
        conn: &mut PgConnection,
        ids: &[TeacherId],
    ) -> Result<Vec<TeacherId>, sqlx::Error> {
        sqlx::query_scalar::<_, TeacherId>("SELECT id FROM teachers WHERE id = ANY($1) FOR SHARE")
            .bind(ids)
            .fetch_all(conn)
            .await
    }

    /// Whether another teacher already uses `email`.
    pub async fn email_taken(
        conn: &mut PgConnection,
        email: &str,
        except: Option<TeacherId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM teachers
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
    ) -> Result<Option<TeacherCredentials>, sqlx::Error> {
        sqlx::query_as::<_, TeacherCredentials>(
            "SELECT id, first_name, last_name, email, pin_number
             FROM teachers WHERE lower(email) = lower($1)",
        )
        .bind(email.trim())
        .fetch_optional(conn)
        .await
    }

    pub async fn summaries(
        conn: &mut PgConnection,
        ids: &[TeacherId],
    ) -> Result<Vec<TeacherSummary>, sqlx::Error> {
        sqlx::query_as::<_, TeacherSummary>(
            "SELECT id, first_name, last_name, email FROM teachers
             WHERE id = ANY($1)
             ORDER BY last_name, first_name",
        )
        .bind(ids)
        .fetch_all(conn)
        .await
    }

    pub async fn list(
        conn: &mut PgConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Teacher>, sqlx::Error> {
        sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers
             ORDER BY last_name, first_name
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(conn)
        .await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM teachers")
            .fetch_one(conn)
            .await
    }

    /// Updates scalar fields; the subject list is handled by
    /// [`set_subjects`](Self::set_subjects).
    pub async fn update_fields(
        conn: &mut PgConnection,
        id: TeacherId,
        dto: &UpdateTeacherDto,
    ) -> Result<Option<Teacher>, sqlx::Error> {
        sqlx::query_as::<_, Teacher>(&format!(
            "UPDATE teachers
             SET first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 email = COALESCE($4, email),
                 pin_number = COALESCE($5, pin_number),
                 phone = COALESCE($6, phone),
                 date_of_birth = COALESCE($7, date_of_birth),
                 place_of_birth = COALESCE($8, place_of_birth),
                 address = COALESCE($9, address),
                 salary = COALESCE($10, salary),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {TEACHER_COLUMNS}"
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
        .bind(dto.salary)
        .fetch_optional(conn)
        .await
    }

    pub async fn set_subjects(
        conn: &mut PgConnection,
        id: TeacherId,
        subject_ids: &[SubjectId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE teachers SET subject_ids = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(subject_ids)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn remove_subject(
        conn: &mut PgConnection,
        id: TeacherId,
        subject_id: SubjectId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE teachers
             SET subject_ids = array_remove(subject_ids, $2), updated_at = NOW()
             WHERE id = $1 AND $2 = ANY(subject_ids)",
        )
        .bind(id)
        .bind(subject_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Removes `subject_id` from every teacher's subject list.
    pub async fn remove_subject_everywhere(
        conn: &mut PgConnection,
        subject_id: SubjectId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE teachers
             SET subject_ids = array_remove(subject_ids, $1), updated_at = NOW()
             WHERE $1 = ANY(subject_ids)",
        )
        .bind(subject_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(conn: &mut PgConnection, id: TeacherId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teachers").execute(conn).await?;
        Ok(result.rows_affected())
    }
}
