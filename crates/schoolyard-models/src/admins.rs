//! Administrator accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::AdminId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Admin {
    pub id: AdminId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row used to check a login; carries the bcrypt hash.
#[derive(Debug, Clone, FromRow)]
pub struct AdminCredentials {
    pub id: AdminId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[serde(default, alias = "isAdmin")]
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_password_length() {
        let dto = SignupDto {
            name: "Head".into(),
            email: "head@school.org".into(),
            password: "12345".into(),
            is_admin: true,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_signup_defaults_to_non_admin() {
        let dto: SignupDto = serde_json::from_str(
            r#"{"name":"Clerk","email":"clerk@school.org","password":"secret1"}"#,
        )
        .unwrap();
        assert!(!dto.is_admin);
        assert!(dto.validate().is_ok());
    }
}
