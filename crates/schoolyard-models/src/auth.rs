//! Login and signup payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::ids::AdminId;

pub use schoolyard_auth::{Claims, UserType};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    /// Password for admins, PIN for teachers and students
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(alias = "userType")]
    pub user_type: UserType,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub user_id: AdminId,
    pub email: String,
    pub is_admin: bool,
    pub token: String,
    pub expires_in: i64,
}
