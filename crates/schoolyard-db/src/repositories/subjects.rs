use sqlx::PgConnection;

use schoolyard_models::{
    CreateSubjectDto, Subject, SubjectId, SubjectSummary, TeacherId, UpdateSubjectDto,
};

const SUBJECT_COLUMNS: &str =
    "id, designation, code, coefficient, teacher_ids, created_at, updated_at";

pub struct SubjectRepository;

impl SubjectRepository {
    pub async fn insert(
        conn: &mut PgConnection,
        dto: &CreateSubjectDto,
    ) -> Result<Subject, sqlx::Error> {
        sqlx::query_as::<_, Subject>(&format!(
            "INSERT INTO subjects (designation, code, coefficient)
             VALUES ($1, $2, $3)
             RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(dto.designation.trim())
        .bind(dto.code.trim())
        .bind(dto.coefficient)
        .fetch_one(conn)
        .await
    }

    pub async fn find(conn: &mut PgConnection, id: SubjectId) -> Result<Option<Subject>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn exists(conn: &mut PgConnection, id: SubjectId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Same as [`find`](Self::find) but locks the row for the transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: SubjectId,
    ) -> Result<Option<Subject>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// The subset of `ids` that exist. Found rows are share-locked until the
    /// transaction ends, so they cannot be deleted underneath the caller.
    pub async fn existing_ids(
        conn: &mut PgConnection,
        ids: &[SubjectId],
    ) -> Result<Vec<SubjectId>, sqlx::Error> {
        sqlx::query_scalar::<_, SubjectId>(
            "SELECT id FROM subjects WHERE id = ANY($1) FOR SHARE",
        )
        .bind(ids)
        .fetch_all(conn)
        .await
    }

    /// Like [`existing_ids`](Self::existing_ids) for callers that go on to
    /// update the subject rows. Rows are locked in id order.
    pub async fn lock_existing(
        conn: &mut PgConnection,
        ids: &[SubjectId],
    ) -> Result<Vec<SubjectId>, sqlx::Error> {
        sqlx::query_scalar::<_, SubjectId>(
            "SELECT id FROM subjects WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(conn)
        .await
    }

    pub async fn find_many(
        conn: &mut PgConnection,
        ids: &[SubjectId],
    ) -> Result<Vec<Subject>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ANY($1) ORDER BY designation"
        ))
        .bind(ids)
        .fetch_all(conn)
        .await
    }

    pub async fn summaries(
        conn: &mut PgConnection,
        ids: &[SubjectId],
    ) -> Result<Vec<SubjectSummary>, sqlx::Error> {
        sqlx::query_as::<_, SubjectSummary>(
            "SELECT id, designation, code FROM subjects WHERE id = ANY($1) ORDER BY designation",
        )
        .bind(ids)
        .fetch_all(conn)
        .await
    }

    pub async fn list(
        conn: &mut PgConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Subject>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY designation LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(conn)
        .await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subjects")
            .fetch_one(conn)
            .await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: SubjectId,
        dto: &UpdateSubjectDto,
    ) -> Result<Option<Subject>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(&format!(
            "UPDATE subjects
             SET designation = COALESCE($2, designation),
                 code = COALESCE($3, code),
                 coefficient = COALESCE($4, coefficient),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.designation.as_deref().map(str::trim))
        .bind(dto.code.as_deref().map(str::trim))
        .bind(dto.coefficient)
        .fetch_optional(conn)
        .await
    }

    pub async fn delete(conn: &mut PgConnection, id: SubjectId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Adds `teacher_id` to the teacher set of each subject in `ids`.
    pub async fn add_teacher(
        conn: &mut PgConnection,
        ids: &[SubjectId],
        teacher_id: TeacherId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subjects
             SET teacher_ids = array_append(teacher_ids, $2), updated_at = NOW()
             WHERE id = ANY($1) AND NOT ($2 = ANY(teacher_ids))",
        )
        .bind(ids)
        .bind(teacher_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Removes `teacher_id` from the teacher set of each subject in `ids`.
    pub async fn remove_teacher(
        conn: &mut PgConnection,
        ids: &[SubjectId],
        teacher_id: TeacherId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subjects
             SET teacher_ids = array_remove(teacher_ids, $2), updated_at = NOW()
             WHERE id = ANY($1) AND $2 = ANY(teacher_ids)",
        )
        .bind(ids)
        .bind(teacher_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn remove_teacher_everywhere(
        conn: &mut PgConnection,
        teacher_id: TeacherId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subjects
             SET teacher_ids = array_remove(teacher_ids, $1), updated_at = NOW()
             WHERE $1 = ANY(teacher_ids)",
        )
        .bind(teacher_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subjects").execute(conn).await?;
        Ok(result.rows_affected())
    }
}
