use sqlx::PgConnection;

use schoolyard_models::{ClassId, CreateLevelDto, Level, LevelId, UpdateLevelDto};

const LEVEL_COLUMNS: &str = "id, designation, registration_fee, tuition_fee, \
                             tuition_payment_division, class_ids, created_at, updated_at";

pub struct LevelRepository;

impl LevelRepository {
    pub async fn insert(conn: &mut PgConnection, dto: &CreateLevelDto) -> Result<Level, sqlx::Error> {
        sqlx::query_as::<_, Level>(&format!(
            "INSERT INTO levels (designation, registration_fee, tuition_fee, tuition_payment_division)
             VALUES ($1, $2, $3, $4)
             RETURNING {LEVEL_COLUMNS}"
        ))
        .bind(dto.designation.trim())
        .bind(dto.registration_fee)
        .bind(dto.tuition_fee)
        .bind(&dto.tuition_payment_division)
        .fetch_one(conn)
        .await
    }

    pub async fn find(conn: &mut PgConnection, id: LevelId) -> Result<Option<Level>, sqlx::Error> {
        sqlx::query_as::<_, Level>(&format!("SELECT {LEVEL_COLUMNS} FROM levels WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Locks the level row for the transaction. `false` when there is none.
    pub async fn lock(conn: &mut PgConnection, id: LevelId) -> Result<bool, sqlx::Error> {
        let found =
            sqlx::query_scalar::<_, LevelId>("SELECT id FROM levels WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;
        Ok(found.is_some())
    }

    pub async fn list(
        conn: &mut PgConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Level>, sqlx::Error> {
        sqlx::query_as::<_, Level>(&format!(
            "SELECT {LEVEL_COLUMNS} FROM levels ORDER BY designation LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(conn)
        .await
    }

    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM levels")
            .fetch_one(conn)
            .await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: LevelId,
        dto: &UpdateLevelDto,
    ) -> Result<Option<Level>, sqlx::Error> {
        sqlx::query_as::<_, Level>(&format!(
            "UPDATE levels
             SET designation = COALESCE($2, designation),
                 registration_fee = COALESCE($3, registration_fee),
                 tuition_fee = COALESCE($4, tuition_fee),
                 tuition_payment_division = COALESCE($5, tuition_payment_division),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {LEVEL_COLUMNS}"
        ))
        .bind(id)
        .bind(dto.designation.as_deref().map(str::trim))
        .bind(dto.registration_fee)
        .bind(dto.tuition_fee)
        .bind(dto.tuition_payment_division.as_ref())
        .fetch_optional(conn)
        .await
    }

    pub async fn delete(conn: &mut PgConnection, id: LevelId) -> Result<Option<Level>, sqlx::Error> {
        sqlx::query_as::<_, Level>(&format!(
            "DELETE FROM levels WHERE id = $1 RETURNING {LEVEL_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Adds `class_id` to the level's class set unless already present.
    pub async fn add_class(
        conn: &mut PgConnection,
        id: LevelId,
        class_id: ClassId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE levels
             SET class_ids = array_append(class_ids, $2), updated_at = NOW()
             WHERE id = $1 AND NOT ($2 = ANY(class_ids))",
        )
        .bind(id)
        .bind(class_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn remove_class(
        conn: &mut PgConnection,
        id: LevelId,
        class_id: ClassId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE levels
             SET class_ids = array_remove(class_ids, $2), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(class_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Removes `class_id` from every level's class set.
    pub async fn remove_class_everywhere(
        conn: &mut PgConnection,
        class_id: ClassId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE levels
             SET class_ids = array_remove(class_ids, $1), updated_at = NOW()
             WHERE $1 = ANY(class_ids)",
        )
        .bind(class_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM levels").execute(conn).await?;
        Ok(result.rows_affected())
    }
}
