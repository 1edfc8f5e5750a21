//! Class aggregate, its embedded academic years, and class DTOs.
//!
//! A [`Class`] owns an ordered sequence of [`AcademicYear`]s. The last one is
//! the *current* year: enrollment and teacher assignment only ever touch it.
//! Each year holds the roster of enrolled students and at most one
//! [`TeacherAssignment`] per subject.
//!
//! The aggregate is assembled from three tables (`classes`,
//! `academic_years`, `teacher_assignments`) by [`Class::assemble_many`]; the
//! decision logic below works on the assembled value and never touches the
//! database.

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

use schoolyard_core::serde::{deserialize_assignable_id, deserialize_trimmed};
use schoolyard_core::{AppError, PaginationMeta};

use crate::ids::{
    AcademicYearId, ClassId, LevelId, StudentId, SubjectId, TeacherAssignmentId, TeacherId,
};
use crate::levels::Level;
use crate::subjects::Subject;

/// Row of the `classes` table.
#[derive(Debug, Clone, FromRow)]
pub struct ClassRecord {
    pub id: ClassId,
    pub designation: String,
    pub level_id: Option<LevelId>,
    pub subject_ids: Vec<SubjectId>,
    pub timetable: Json<Vec<Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `academic_years` table.
#[derive(Debug, Clone, FromRow)]
pub struct AcademicYearRecord {
    pub id: AcademicYearId,
    pub class_id: ClassId,
    pub position: i32,
    pub year: String,
    pub student_ids: Vec<StudentId>,
    pub created_at: DateTime<Utc>,
}

/// A (teacher, subject) slot inside one academic year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeacherAssignment {
    pub id: TeacherAssignmentId,
    pub academic_year_id: AcademicYearId,
    pub subject_id: SubjectId,
    /// `None` while the subject has no teacher
    pub teacher_id: Option<TeacherId>,
    pub is_class_teacher: bool,
    #[serde(skip)]
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AcademicYear {
    pub id: AcademicYearId,
    /// Year label, e.g. `2024/2025`
    pub year: String,
    /// Students enrolled in the class for this year
    pub students: Vec<StudentId>,
    pub teachers: Vec<TeacherAssignment>,
    pub created_at: DateTime<Utc>,
}

impl AcademicYear {
    fn from_record(record: AcademicYearRecord, mut teachers: Vec<TeacherAssignment>) -> Self {
        teachers.sort_by_key(|t| t.position);
        Self {
            id: record.id,
            year: record.year,
            students: record.student_ids,
            teachers,
            created_at: record.created_at,
        }
    }

    pub fn assignment_for(&self, subject_id: SubjectId) -> Option<&TeacherAssignment> {
        self.teachers.iter().find(|t| t.subject_id == subject_id)
    }

    pub fn has_student(&self, student_id: StudentId) -> bool {
        self.students.contains(&student_id)
    }

    fn next_assignment_position(&self) -> i32 {
        self.teachers
            .iter()
            .map(|t| t.position + 1)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Class {
    pub id: ClassId,
    pub designation: String,
    pub level_id: Option<LevelId>,
    pub subject_ids: Vec<SubjectId>,
    /// Opaque timetable slots, stored as given
    #[schema(value_type = Vec<Object>)]
    pub timetable: Vec<Value>,
    /// Oldest first; the last entry is the current year
    pub academic_years: Vec<AcademicYear>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn group_assignments(
    assignments: Vec<TeacherAssignment>,
) -> HashMap<AcademicYearId, Vec<TeacherAssignment>> {
    let mut by_year: HashMap<AcademicYearId, Vec<TeacherAssignment>> = HashMap::new();
    for assignment in assignments {
        by_year
            .entry(assignment.academic_year_id)
            .or_default()
            .push(assignment);
    }
    by_year
}

/// Where a teacher assignment lands inside the current academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherSlot {
    /// The subject already has an assignment; replace its teacher in place.
    Existing(TeacherAssignmentId),
    /// No assignment yet; append one at `position`.
    Vacant { position: i32 },
}

impl Class {
    /// Builds aggregates from rows fetched in bulk. Years and assignments that
    /// belong to classes outside `records` are ignored; output order follows
    /// `records`.
    pub fn assemble_many(
        records: Vec<ClassRecord>,
        years: Vec<AcademicYearRecord>,
        assignments: Vec<TeacherAssignment>,
    ) -> Vec<Class> {
        let mut assignments_by_year = group_assignments(assignments);

        let mut years_by_class: HashMap<ClassId, Vec<AcademicYearRecord>> = HashMap::new();
        for year in years {
            years_by_class.entry(year.class_id).or_default().push(year);
        }

        records
            .into_iter()
            .map(|record| {
                let class_years = years_by_class.remove(&record.id).unwrap_or_default();
                Self::build(record, class_years, &mut assignments_by_year)
            })
            .collect()
    }

    pub fn assemble(
        record: ClassRecord,
        mut years: Vec<AcademicYearRecord>,
        assignments: Vec<TeacherAssignment>,
    ) -> Class {
        years.retain(|y| y.class_id == record.id);
        Self::build(record, years, &mut group_assignments(assignments))
    }

    fn build(
        record: ClassRecord,
        mut years: Vec<AcademicYearRecord>,
        assignments_by_year: &mut HashMap<AcademicYearId, Vec<TeacherAssignment>>,
    ) -> Class {
        years.sort_by_key(|y| y.position);
        let academic_years = years
            .into_iter()
            .map(|y| {
                let teachers = assignments_by_year.remove(&y.id).unwrap_or_default();
                AcademicYear::from_record(y, teachers)
            })
            .collect();

        Class {
            id: record.id,
            designation: record.designation,
            level_id: record.level_id,
            subject_ids: record.subject_ids,
            timetable: record.timetable.0,
            academic_years,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// The year enrollment and assignment operate on.
    pub fn current_academic_year(&self) -> Option<&AcademicYear> {
        self.academic_years.last()
    }

    pub fn require_current_academic_year(&self) -> Result<&AcademicYear, AppError> {
        self.current_academic_year().ok_or_else(|| {
            AppError::not_found(anyhow!(
                "Class {} has no academic year yet, please generate one first.",
                self.designation
            ))
        })
    }

    pub fn academic_year(&self, id: AcademicYearId) -> Option<&AcademicYear> {
        self.academic_years.iter().find(|y| y.id == id)
    }

    pub fn has_subject(&self, subject_id: SubjectId) -> bool {
        self.subject_ids.contains(&subject_id)
    }

    pub fn has_year(&self, label: &str) -> bool {
        let label = label.trim();
        self.academic_years.iter().any(|y| y.year == label)
    }

    /// Position the next appended academic year takes.
    pub fn next_year_position(&self) -> i32 {
        self.academic_years.len() as i32
    }

    /// Rejects a label this class already used with a 404.
    pub fn ensure_year_available(&self, label: &str) -> Result<(), AppError> {
        if self.has_year(label) {
            return Err(AppError::not_found(anyhow!(
                "The academic year {} already exists for class {}.",
                label.trim(),
                self.designation
            )));
        }
        Ok(())
    }

    /// First class (if any) among `classes` that already used `label`.
    pub fn find_year_conflict<'a>(classes: &'a [Class], label: &str) -> Option<&'a Class> {
        classes.iter().find(|c| c.has_year(label))
    }

    /// Resolves where assigning a teacher for `subject_id` in `academic_year_id` goes.
    pub fn teacher_slot(
        &self,
        academic_year_id: AcademicYearId,
        subject_id: SubjectId,
    ) -> Result<TeacherSlot, AppError> {
        let year = self.academic_year(academic_year_id).ok_or_else(|| {
            AppError::not_found(anyhow!(
                "Could not find this academic year in class {}.",
                self.designation
            ))
        })?;

        if self.current_academic_year().map(|current| current.id) != Some(year.id) {
            return Err(AppError::unprocessable(anyhow!(
                "Teachers can only be assigned in the current academic year of a class."
            )));
        }

        if !self.has_subject(subject_id) {
            return Err(AppError::not_found(anyhow!(
                "This subject is not taught in class {}.",
                self.designation
            )));
        }

        Ok(match year.assignment_for(subject_id) {
            Some(existing) => TeacherSlot::Existing(existing.id),
            None => TeacherSlot::Vacant {
                position: year.next_assignment_position(),
            },
        })
    }

    /// Checks assignments seeded into a new academic year: every subject must
    /// belong to this class and appear once.
    pub fn check_seed_assignments(&self, seeds: &[TeacherAssignmentSeed]) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        for seed in seeds {
            if !self.has_subject(seed.subject_id) {
                return Err(AppError::not_found(anyhow!(
                    "This subject is not taught in class {}.",
                    self.designation
                )));
            }
            if !seen.insert(seed.subject_id) {
                return Err(AppError::unprocessable(anyhow!(
                    "A subject can only be assigned once per academic year."
                )));
            }
        }
        Ok(())
    }

    /// Academic years whose roster holds `student_id`.
    ///
    /// The student's stored pointer is tried first; when it is stale every
    /// roster of the class is scanned.
    pub fn rosters_holding(
        &self,
        student_id: StudentId,
        pointer: Option<AcademicYearId>,
    ) -> Vec<AcademicYearId> {
        if let Some(year) = pointer.and_then(|id| self.academic_year(id)) {
            if year.has_student(student_id) {
                return vec![year.id];
            }
        }
        self.academic_years
            .iter()
            .filter(|y| y.has_student(student_id))
            .map(|y| y.id)
            .collect()
    }

    pub fn summary(&self) -> ClassSummary {
        ClassSummary {
            id: self.id,
            designation: self.designation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassSummary {
    pub id: ClassId,
    pub designation: String,
}

/// A class together with its level and subjects.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClassDetails {
    #[serde(flatten)]
    pub class: Class,
    pub level: Option<Level>,
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub designation: String,
    #[serde(alias = "level")]
    pub level_id: LevelId,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub designation: Option<String>,
    /// Moves the class to another level
    #[serde(alias = "level")]
    pub level_id: Option<LevelId>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignSubjectsDto {
    /// Replaces the whole subject set of the class
    pub subjects: Vec<SubjectId>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignTeacherDto {
    #[serde(alias = "classId")]
    pub class_id: ClassId,
    #[serde(alias = "subjectId")]
    pub subject_id: SubjectId,
    #[serde(alias = "academicYearId")]
    pub academic_year_id: AcademicYearId,
    /// Teacher to assign; `null`, `""` or `"empty"` unassigns
    #[serde(
        default,
        alias = "teacherId",
        deserialize_with = "deserialize_assignable_id"
    )]
    pub teacher_id: Option<TeacherId>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TeacherAssignmentSeed {
    #[serde(alias = "subjectId")]
    pub subject_id: SubjectId,
    #[serde(
        default,
        alias = "teacherId",
        deserialize_with = "deserialize_assignable_id"
    )]
    pub teacher_id: Option<TeacherId>,
    #[serde(default, alias = "isClassTeacher")]
    pub is_class_teacher: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewAcademicYearDto {
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 6, max = 50, message = "Please provide a valid academic year."))]
    pub year: String,
    /// Teacher assignments the new year starts with
    #[serde(default)]
    pub teachers: Vec<TeacherAssignmentSeed>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateAcademicYearDto {
    #[serde(alias = "newAcademicYear")]
    #[validate(nested)]
    pub new_academic_year: NewAcademicYearDto,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct YearLabelDto {
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 6, max = 50, message = "Please provide a valid academic year."))]
    pub year: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateAcademicYearForAllDto {
    #[serde(alias = "newAcademicYear")]
    #[validate(nested)]
    pub new_academic_year: YearLabelDto,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TimetableDto {
    #[serde(alias = "timeTable")]
    #[schema(value_type = Vec<Object>)]
    pub time_table: Vec<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RolloverResponse {
    pub class_id: ClassId,
    pub academic_year: AcademicYear,
    /// Students whose enrollment was cleared
    pub released_students: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkRolloverResponse {
    pub year: String,
    pub classes: Vec<RolloverResponse>,
    pub released_students: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedClassesResponse {
    pub data: Vec<Class>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteClassResponse {
    pub message: String,
    pub class: Class,
    pub released_students: u64,
}
