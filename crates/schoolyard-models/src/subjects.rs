//! Subject models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use schoolyard_core::PaginationMeta;

use crate::ids::{SubjectId, TeacherId};
use crate::teachers::TeacherSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subject {
    pub id: SubjectId,
    pub designation: String,
    pub code: String,
    /// Weight of the subject in averages
    pub coefficient: f64,
    /// Teachers currently teaching this subject
    pub teacher_ids: Vec<TeacherId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SubjectSummary {
    pub id: SubjectId,
    pub designation: String,
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectWithTeachers {
    #[serde(flatten)]
    pub subject: Subject,
    pub teachers: Vec<TeacherSummary>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubjectDto {
    #[validate(length(min = 1, max = 100))]
    pub designation: String,
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[serde(alias = "coef")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub coefficient: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSubjectDto {
    #[validate(length(min = 1, max = 100))]
    pub designation: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    #[serde(alias = "coef")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub coefficient: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSubjectsResponse {
    pub data: Vec<Subject>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteSubjectResponse {
    pub message: String,
    pub subject: Subject,
    /// Teachers that lost the subject
    pub detached_teachers: u64,
    /// Classes that lost the subject
    pub detached_classes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_subject_accepts_coef_alias() {
        let dto: CreateSubjectDto =
            serde_json::from_str(r#"{"designation":"Mathématiques","code":"MATH","coef":4}"#)
                .unwrap();
        assert_eq!(dto.coefficient, 4.0);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_subject_validation() {
        let dto = CreateSubjectDto {
            designation: String::new(),
            code: "X".repeat(21),
            coefficient: -1.0,
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("designation"));
        assert!(fields.contains_key("code"));
        assert!(fields.contains_key("coefficient"));
    }
}
