//! Teacher models and DTOs.
//!
//! The PIN a teacher logs in with is only ever read through
//! [`TeacherCredentials`]; [`Teacher`] never carries it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use schoolyard_core::PaginationMeta;

use crate::ids::{SubjectId, TeacherId};
use crate::subjects::SubjectSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub address: Option<String>,
    pub salary: f64,
    /// Subjects this teacher teaches
    pub subject_ids: Vec<SubjectId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TeacherCredentials {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub pin_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeacherSummary {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherWithSubjects {
    #[serde(flatten)]
    pub teacher: Teacher,
    pub subjects: Vec<SubjectSummary>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeacherDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 4, max = 32))]
    pub pin_number: String,
    #[validate(length(min = 2, max = 30))]
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = 0.0))]
    pub salary: f64,
    #[validate(length(min = 1, message = "You should assign at least one subject to a teacher."))]
    pub subjects: Vec<SubjectId>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTeacherDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 4, max = 32))]
    pub pin_number: Option<String>,
    #[validate(length(min = 2, max = 30))]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = 0.0))]
    pub salary: Option<f64>,
    /// Replaces the teacher's whole subject list when present
    #[validate(length(min = 1, message = "You should assign at least one subject to a teacher."))]
    pub subjects: Option<Vec<SubjectId>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedTeachersResponse {
    pub data: Vec<Teacher>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteTeacherResponse {
    pub message: String,
    pub teacher: Teacher,
    /// Academic-year assignments left without a teacher
    pub vacated_assignments: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(subjects: Vec<SubjectId>) -> CreateTeacherDto {
        CreateTeacherDto {
            first_name: "Awa".into(),
            last_name: "Diop".into(),
            email: "awa.diop@school.org".into(),
            pin_number: "T-4821".into(),
            phone: "770000000".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 14),
            place_of_birth: Some("Dakar".into()),
            address: None,
            salary: 350_000.0,
            subjects,
        }
    }

    #[test]
    fn test_teacher_needs_a_subject() {
        assert!(dto(vec![SubjectId::new()]).validate().is_ok());
        let errors = dto(vec![]).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("subjects"));
    }

    #[test]
    fn test_teacher_email_is_checked() {
        let mut bad = dto(vec![SubjectId::new()]);
        bad.email = "not-an-email".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_may_leave_subjects_untouched() {
        let update: UpdateTeacherDto = serde_json::from_str(r#"{"salary": 400000}"#).unwrap();
        assert!(update.validate().is_ok());
        assert!(update.subjects.is_none());

        let update: UpdateTeacherDto = serde_json::from_str(r#"{"subjects": []}"#).unwrap();
        assert!(update.validate().is_err());
    }
}
