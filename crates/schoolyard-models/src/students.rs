//! Student models and DTOs.
//!
//! A student is enrolled in at most one class at a time. `class_id` and
//! `academic_year_id` are set together and always point at the roster that
//! lists the student.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

use schoolyard_core::PaginationMeta;
use schoolyard_core::serde::deserialize_assignable_id;

use crate::classes::ClassSummary;
use crate::ids::{AcademicYearId, ClassId, StudentId};

/// Parent or guardian contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ParentInfo {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 2, max = 30))]
    pub phone: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub address: Option<String>,
    #[schema(value_type = ParentInfo)]
    pub parent: Json<ParentInfo>,
    /// Class the student is currently enrolled in
    pub class_id: Option<ClassId>,
    /// Academic year of `class_id` whose roster lists the student
    pub academic_year_id: Option<AcademicYearId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn is_enrolled(&self) -> bool {
        self.class_id.is_some()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StudentCredentials {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub pin_number: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentWithClass {
    #[serde(flatten)]
    pub student: Student,
    pub class: Option<ClassSummary>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2, max = 32))]
    pub pin_number: String,
    #[validate(length(min = 2, max = 30))]
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub address: Option<String>,
    #[validate(nested)]
    pub parent: ParentInfo,
    /// Class to enroll the student in
    #[serde(
        default,
        alias = "classe",
        deserialize_with = "deserialize_assignable_id"
    )]
    pub class_id: Option<ClassId>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 2, max = 32))]
    pub pin_number: Option<String>,
    #[validate(length(min = 2, max = 30))]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub address: Option<String>,
    #[validate(nested)]
    pub parent: Option<ParentInfo>,
    /// Re-enrolls the student in this class when present
    #[serde(
        default,
        alias = "classe",
        deserialize_with = "deserialize_assignable_id"
    )]
    pub class_id: Option<ClassId>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteStudentResponse {
    pub message: String,
    pub student: Student,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> serde_json::Value {
        serde_json::json!({
            "first_name": "Moussa",
            "last_name": "Ba",
            "email": "moussa.ba@school.org",
            "pin_number": "S-2201",
            "phone": "781234567",
            "date_of_birth": "2012-09-01",
            "parent": {
                "first_name": "Fatou",
                "last_name": "Ba",
                "phone": "771112233"
            }
        })
    }

    #[test]
    fn test_student_without_class() {
        let dto: CreateStudentDto = serde_json::from_value(body()).unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.class_id.is_none());
        assert_eq!(dto.date_of_birth, NaiveDate::from_ymd_opt(2012, 9, 1));
    }

    #[test]
    fn test_classe_alias() {
        let class_id = ClassId::new();
        let mut raw = body();
        raw["classe"] = serde_json::json!(class_id.to_string());
        let dto: CreateStudentDto = serde_json::from_value(raw).unwrap();
        assert_eq!(dto.class_id, Some(class_id));
    }

    #[test]
    fn test_parent_is_validated() {
        let mut raw = body();
        raw["parent"]["email"] = serde_json::json!("nope");
        let dto: CreateStudentDto = serde_json::from_value(raw).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_missing_parent_fails_to_parse() {
        let mut raw = body();
        raw.as_object_mut().unwrap().remove("parent");
        assert!(serde_json::from_value::<CreateStudentDto>(raw).is_err());
    }
}
