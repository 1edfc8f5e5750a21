use serde_json::Value;
use sqlx::PgConnection;
use sqlx::types::Json;

use schoolyard_models::{
    AcademicYearId, AcademicYearRecord, Class, ClassId, ClassRecord, ClassSummary, LevelId,
    StudentId, SubjectId, TeacherAssignment, TeacherAssignmentId, TeacherId,
};

const CLASS_COLUMNS: &str =
    "id, designation, level_id, subject_ids, timetable, created_at, updated_at";
const YEAR_COLUMNS: &str = "id, class_id, position, year, student_ids, created_at";
const ASSIGNMENT_COLUMNS: &str =
    "id, academic_year_id, subject_id, teacher_id, is_class_teacher, position";

/// Access to `classes` and the tables embedded in the class aggregate
/// (`academic_years`, `teacher_assignments`).
pub struct ClassRepository;

impl ClassRepository {
    pub async fn insert(
        conn: &mut PgConnection,
        designation: &str,
        level_id: LevelId,
    ) -> Result<ClassRecord, sqlx::Error> {
        sqlx::query_as::<_, ClassRecord>(&format!(
            "INSERT INTO classes (designation, level_id) VALUES ($1, $2) RETURNING {CLASS_COLUMNS}"
        ))
        .bind(designation.trim())
        .bind(level_id)
        .fetch_one(conn)
        .await
    }

    pub async fn find_record(
        conn: &mut PgConnection,
        id: ClassId,
    ) -> Result<Option<ClassRecord>, sqlx::Error> {
        sqlx::query_as::<_, ClassRecord>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn exists(conn: &mut PgConnection, id: ClassId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Most recently created class, used to carry the running year label over.
    pub async fn latest(conn: &mut PgConnection) -> Result<Option<Class>, sqlx::Error> {
        let record = sqlx::query_as::<_, ClassRecord>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&mut *conn)
        .await?;

        match record {
            Some(record) => Ok(Self::load_many(conn, vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Loads the full aggregate.
    pub async fn load(conn: &mut PgConnection, id: ClassId) -> Result<Option<Class>, sqlx::Error> {
        match Self::find_record(&mut *conn, id).await? {
            Some(record) => Ok(Self::load_many(conn, vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Loads the aggregate and locks its class row until the surrounding
    /// transaction ends. Serializes writers of the same class.
    pub async fn load_for_update(
        conn: &mut PgConnection,
        id: ClassId,
    ) -> Result<Option<Class>, sqlx::Error> {
        let record = sqlx::query_as::<_, ClassRecord>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match record {
            Some(record) => Ok(Self::load_many(conn, vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Locks the class rows of `ids` in id order, so callers locking several
    /// classes always take them in the same order. Returns the ids found.
    pub async fn lock_many(
        conn: &mut PgConnection,
        ids: &[ClassId],
    ) -> Result<Vec<ClassId>, sqlx::Error> {
        sqlx::query_scalar::<_, ClassId>(
            "SELECT id FROM classes WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(conn)
        .await
    }

    /// Every class, locked, oldest first.
    pub async fn load_all_for_update(conn: &mut PgConnection) -> Result<Vec<Class>, sqlx::Error> {
        let records = sqlx::query_as::<_, ClassRecord>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes ORDER BY created_at, id FOR UPDATE"
        ))
        .fetch_all(&mut *conn)
        .await?;

        Self::load_many(conn, records).await
    }

    pub async fn list(
        conn: &mut PgConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Class>, sqlx::Error> {
        let records = sqlx::query_as::<_, ClassRecord>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes ORDER BY designation LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        Self::load_many(conn, records).await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes")
            .fetch_one(conn)
            .await
    }

    /// Fetches years and assignments for `records` in two queries and
    /// assembles the aggregates.
    pub async fn load_many(
        conn: &mut PgConnection,
        records: Vec<ClassRecord>,
    ) -> Result<Vec<Class>, sqlx::Error> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let class_ids: Vec<ClassId> = records.iter().map(|r| r.id).collect();

        let years = sqlx::query_as::<_, AcademicYearRecord>(&format!(
            "SELECT {YEAR_COLUMNS} FROM academic_years
             WHERE class_id = ANY($1)
             ORDER BY class_id, position"
        ))
        .bind(&class_ids)
        .fetch_all(&mut *conn)
        .await?;

        let year_ids: Vec<AcademicYearId> = years.iter().map(|y| y.id).collect();
        let assignments = sqlx::query_as::<_, TeacherAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM teacher_assignments
             WHERE academic_year_id = ANY($1)
             ORDER BY academic_year_id, position"
        ))
        .bind(&year_ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Class::assemble_many(records, years, assignments))
    }

    pub async fn summaries(
        conn: &mut PgConnection,
        ids: &[ClassId],
    ) -> Result<Vec<ClassSummary>, sqlx::Error> {
        sqlx::query_as::<_, ClassSummary>(
            "SELECT id, designation FROM classes WHERE id = ANY($1) ORDER BY designation",
        )
        .bind(ids)
        .fetch_all(conn)
        .await
    }

    pub async fn by_level(
        conn: &mut PgConnection,
        level_id: LevelId,
    ) -> Result<Vec<ClassSummary>, sqlx::Error> {
        sqlx::query_as::<_, ClassSummary>(
            "SELECT id, designation FROM classes WHERE level_id = $1 ORDER BY designation",
        )
        .bind(level_id)
        .fetch_all(conn)
        .await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: ClassId,
        designation: Option<&str>,
        level_id: Option<LevelId>,
    ) -> Result<ClassRecord, sqlx::Error> {
        sqlx::query_as::<_, ClassRecord>(&format!(
            "UPDATE classes
             SET designation = COALESCE($2, designation),
                 level_id = COALESCE($3, level_id),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {CLASS_COLUMNS}"
        ))
        .bind(id)
        .bind(designation.map(str::trim))
        .bind(level_id)
        .fetch_one(conn)
        .await
    }

    pub async fn set_subjects(
        conn: &mut PgConnection,
        id: ClassId,
        subject_ids: &[SubjectId],
    ) -> Result<ClassRecord, sqlx::Error> {
        sqlx::query_as::<_, ClassRecord>(&format!(
            "UPDATE classes SET subject_ids = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {CLASS_COLUMNS}"
        ))
        .bind(id)
        .bind(subject_ids)
        .fetch_one(conn)
        .await
    }

    pub async fn set_timetable(
        conn: &mut PgConnection,
        id: ClassId,
        timetable: &[Value],
    ) -> Result<Option<ClassRecord>, sqlx::Error> {
        sqlx::query_as::<_, ClassRecord>(&format!(
            "UPDATE classes SET timetable = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {CLASS_COLUMNS}"
        ))
        .bind(id)
        .bind(Json(timetable))
        .fetch_optional(conn)
        .await
    }

    /// Clears the level reference of every class in `level_id`.
    pub async fn clear_level(conn: &mut PgConnection, level_id: LevelId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE classes SET level_id = NULL, updated_at = NOW() WHERE level_id = $1",
        )
        .bind(level_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn remove_subject_everywhere(
        conn: &mut PgConnection,
        subject_id: SubjectId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE classes
             SET subject_ids = array_remove(subject_ids, $1), updated_at = NOW()
             WHERE $1 = ANY(subject_ids)",
        )
        .bind(subject_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Removes the class; its academic years and assignments cascade.
    pub async fn delete(conn: &mut PgConnection, id: ClassId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_academic_year(
        conn: &mut PgConnection,
        class_id: ClassId,
        position: i32,
        year: &str,
    ) -> Result<AcademicYearRecord, sqlx::Error> {
        sqlx::query_as::<_, AcademicYearRecord>(&format!(
            "INSERT INTO academic_years (class_id, position, year)
             VALUES ($1, $2, $3)
             RETURNING {YEAR_COLUMNS}"
        ))
        .bind(class_id)
        .bind(position)
        .bind(year.trim())
        .fetch_one(conn)
        .await
    }

    /// Empties the rosters of every academic year of `class_ids`.
    pub async fn clear_rosters(
        conn: &mut PgConnection,
        class_ids: &[ClassId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE academic_years SET student_ids = '{}'
             WHERE class_id = ANY($1) AND cardinality(student_ids) > 0",
        )
        .bind(class_ids)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn push_student(
        conn: &mut PgConnection,
        academic_year_id: AcademicYearId,
        student_id: StudentId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE academic_years
             SET student_ids = array_append(student_ids, $2)
             WHERE id = $1 AND NOT ($2 = ANY(student_ids))",
        )
        .bind(academic_year_id)
        .bind(student_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn pull_student(
        conn: &mut PgConnection,
        academic_year_ids: &[AcademicYearId],
        student_id: StudentId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE academic_years
             SET student_ids = array_remove(student_ids, $2)
             WHERE id = ANY($1)",
        )
        .bind(academic_year_ids)
        .bind(student_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_assignment(
        conn: &mut PgConnection,
        academic_year_id: AcademicYearId,
        subject_id: SubjectId,
        teacher_id: Option<TeacherId>,
        is_class_teacher: bool,
        position: i32,
    ) -> Result<TeacherAssignment, sqlx::Error> {
        sqlx::query_as::<_, TeacherAssignment>(&format!(
            "INSERT INTO teacher_assignments
                 (academic_year_id, subject_id, teacher_id, is_class_teacher, position)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(academic_year_id)
        .bind(subject_id)
        .bind(teacher_id)
        .bind(is_class_teacher)
        .bind(position)
        .fetch_one(conn)
        .await
    }

    pub async fn set_assignment_teacher(
        conn: &mut PgConnection,
        id: TeacherAssignmentId,
        teacher_id: Option<TeacherId>,
    ) -> Result<TeacherAssignment, sqlx::Error> {
        sqlx::query_as::<_, TeacherAssignment>(&format!(
            "UPDATE teacher_assignments SET teacher_id = $2
             WHERE id = $1
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(teacher_id)
        .fetch_one(conn)
        .await
    }

    /// Leaves every assignment held by `teacher_id` without a teacher.
    pub async fn vacate_teacher(
        conn: &mut PgConnection,
        teacher_id: TeacherId,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE teacher_assignments SET teacher_id = NULL WHERE teacher_id = $1")
                .bind(teacher_id)
                .execute(conn)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_subject_assignments(
        conn: &mut PgConnection,
        subject_id: SubjectId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teacher_assignments WHERE subject_id = $1")
            .bind(subject_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Deletes the assignments of every year of the class whose subject is not
    /// in `keep`.
    pub async fn delete_assignments_outside(
        conn: &mut PgConnection,
        class_id: ClassId,
        keep: &[SubjectId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM teacher_assignments
             WHERE academic_year_id IN (SELECT id FROM academic_years WHERE class_id = $1)
               AND NOT (subject_id = ANY($2))",
        )
        .bind(class_id)
        .bind(keep)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Removes school data created by the seeder or tests: every class.
    pub async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM classes").execute(conn).await?;
        Ok(result.rows_affected())
    }
}
