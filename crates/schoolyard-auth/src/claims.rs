//! JWT claim structures.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of account a token (or a login attempt) belongs to.
///
/// Accepts the French labels used by older clients as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[serde(alias = "administrateur")]
    Admin,
    #[serde(alias = "professeur")]
    Teacher,
    #[serde(alias = "eleve", alias = "élève")]
    Student,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => "admin",
            UserType::Teacher => "teacher",
            UserType::Student => "student",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Account id (subject claim)
    pub sub: String,
    /// Account email address
    pub email: String,
    /// Which collection `sub` points into
    pub user_type: UserType,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_accepts_aliases() {
        let parsed: Vec<UserType> =
            serde_json::from_str(r#"["administrateur","professeur","eleve","teacher"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                UserType::Admin,
                UserType::Teacher,
                UserType::Student,
                UserType::Teacher
            ]
        );
    }

    #[test]
    fn test_user_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserType::Admin).unwrap(), r#""admin""#);
        assert_eq!(UserType::Student.to_string(), "student");
    }

    #[test]
    fn test_unknown_user_type_is_rejected() {
        assert!(serde_json::from_str::<UserType>(r#""janitor""#).is_err());
    }

    #[test]
    fn test_claims_round_trip() {
        let claims = Claims {
            sub: "b1f0c1de-0000-4000-8000-000000000001".into(),
            email: "t@school.org".into(),
            user_type: UserType::Teacher,
            exp: 2_000_000_000,
            iat: 1_999_996_400,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["user_type"], "teacher");
        let back: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(back.exp - back.iat, 3600);
    }
}
