use sqlx::PgConnection;

use schoolyard_models::{Admin, AdminCredentials};

const ADMIN_COLUMNS: &str = "id, name, email, is_admin, created_at, updated_at";

pub struct AdminRepository;

impl AdminRepository {
    /// Inserts an admin; `password_hash` must already be hashed.
    pub async fn insert(
        conn: &mut PgConnection,
        name: &str,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<Admin, sqlx::Error> {
        sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins (name, email, password, is_admin)
             VALUES ($1, $2, $3, $4)
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(name.trim())
        .bind(email.trim().to_lowercase())
        .bind(password_hash)
        .bind(is_admin)
        .fetch_one(conn)
        .await
    }

    pub async fn email_exists(conn: &mut PgConnection, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM admins WHERE lower(email) = lower($1))",
        )
        .bind(email.trim())
        .fetch_one(conn)
        .await
    }

    pub async fn credentials_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<AdminCredentials>, sqlx::Error> {
        sqlx::query_as::<_, AdminCredentials>(
            "SELECT id, name, email, password, is_admin FROM admins WHERE lower(email) = lower($1)",
        )
        .bind(email.trim())
        .fetch_optional(conn)
        .await
    }
}
