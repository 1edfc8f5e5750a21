//! Level models and DTOs.
//!
//! A level groups classes (e.g. "Sixième") and carries the fees charged to
//! every student of its classes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use schoolyard_core::PaginationMeta;

use crate::classes::ClassSummary;
use crate::ids::{ClassId, LevelId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Level {
    pub id: LevelId,
    pub designation: String,
    pub registration_fee: f64,
    pub tuition_fee: f64,
    /// Installments the tuition fee is paid in, in order
    pub tuition_payment_division: Vec<f64>,
    /// Classes belonging to this level
    pub class_ids: Vec<ClassId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LevelWithClasses {
    #[serde(flatten)]
    pub level: Level,
    pub classes: Vec<ClassSummary>,
}

fn validate_installments(installments: &[f64]) -> Result<(), ValidationError> {
    if installments.iter().any(|amount| !amount.is_finite() || *amount < 0.0) {
        let mut err = ValidationError::new("installments");
        err.message = Some("Tuition installments must be positive amounts.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLevelDto {
    #[validate(length(min = 2, max = 100))]
    pub designation: String,
    #[validate(range(min = 0.0))]
    pub registration_fee: f64,
    #[validate(range(min = 0.0))]
    pub tuition_fee: f64,
    #[serde(default)]
    #[validate(custom(function = "validate_installments"))]
    pub tuition_payment_division: Vec<f64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLevelDto {
    #[validate(length(min = 2, max = 100))]
    pub designation: Option<String>,
    #[validate(range(min = 0.0))]
    pub registration_fee: Option<f64>,
    #[validate(range(min = 0.0))]
    pub tuition_fee: Option<f64>,
    #[validate(custom(function = "validate_installments"))]
    pub tuition_payment_division: Option<Vec<f64>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedLevelsResponse {
    pub data: Vec<Level>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteLevelResponse {
    pub message: String,
    pub level: Level,
    /// Classes whose level reference was cleared
    pub detached_classes: u64,
}
