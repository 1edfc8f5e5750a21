//! Fake record generation.
//!
//! Everything here is pure and runs on the rayon pool; inserting happens in
//! [`super`].

use chrono::NaiveDate;
use fake::Fake;
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rayon::prelude::*;

use schoolyard_models::{
    ClassId, CreateLevelDto, CreateStudentDto, CreateSubjectDto, CreateTeacherDto, ParentInfo,
    SubjectId,
};

const SUBJECT_NAMES: [&str; 12] = [
    "Mathematics",
    "French",
    "English",
    "History",
    "Geography",
    "Physics",
    "Chemistry",
    "Biology",
    "Philosophy",
    "Physical Education",
    "Arts",
    "Music",
];

const CLASS_SUFFIXES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// How much data `seed` creates.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub levels: usize,
    pub classes_per_level: usize,
    pub subjects: usize,
    pub teachers: usize,
    pub students_per_class: usize,
    /// Label of the academic year every seeded class starts with
    pub year: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            levels: 6,
            classes_per_level: 2,
            subjects: 8,
            teachers: 12,
            students_per_class: 25,
            year: "2024/2025".to_string(),
        }
    }
}

impl SeedConfig {
    pub fn total_classes(&self) -> usize {
        self.levels * self.classes_per_level
    }

    pub fn total_students(&self) -> usize {
        self.total_classes() * self.students_per_class
    }
}

pub fn level_designation(index: usize) -> String {
    format!("Grade {}", index + 1)
}

pub fn class_designation(level: &str, index: usize) -> String {
    match CLASS_SUFFIXES.get(index) {
        Some(suffix) => format!("{level} {suffix}"),
        None => format!("{level} {}", index + 1),
    }
}

pub fn generate_levels(count: usize) -> Vec<CreateLevelDto> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let tuition_fee = (100..400).fake::<u32>() as f64 * 1000.0;
            CreateLevelDto {
                designation: level_designation(i),
                registration_fee: (10..50).fake::<u32>() as f64 * 1000.0,
                tuition_fee,
                tuition_payment_division: vec![tuition_fee / 3.0; 3],
            }
        })
        .collect()
}

pub fn generate_subjects(count: usize) -> Vec<CreateSubjectDto> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let base = SUBJECT_NAMES[i % SUBJECT_NAMES.len()];
            let round = i / SUBJECT_NAMES.len();
            let designation = if round == 0 {
                base.to_string()
            } else {
                format!("{base} {}", round + 1)
            };
            let prefix: String = base
                .chars()
                .filter(|c| c.is_ascii_alphabetic())
                .take(4)
                .collect::<String>()
                .to_uppercase();
            CreateSubjectDto {
                designation,
                code: format!("{prefix}-{:02}", i + 1),
                coefficient: (1..5).fake::<u32>() as f64,
            }
        })
        .collect()
}

/// Each teacher teaches two consecutive subjects (one when only one exists),
/// so every subject ends up with a teacher once there are enough of them.
pub fn generate_teachers(count: usize, subject_ids: &[SubjectId]) -> Vec<CreateTeacherDto> {
    if subject_ids.is_empty() {
        return Vec::new();
    }

    (0..count)
        .into_par_iter()
        .map(|i| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let mut subjects = vec![subject_ids[i % subject_ids.len()]];
            let second = subject_ids[(i + 1) % subject_ids.len()];
            if !subjects.contains(&second) {
                subjects.push(second);
            }

            CreateTeacherDto {
                email: email(&first_name, &last_name, "teacher", i),
                first_name,
                last_name,
                pin_number: format!("T{:05}", i + 1),
                phone: PhoneNumber().fake(),
                date_of_birth: birth_date(1965..1995),
                place_of_birth: Some(CityName().fake()),
                address: Some(StreetName().fake()),
                salary: (150..600).fake::<u32>() as f64 * 1000.0,
                subjects,
            }
        })
        .collect()
}

pub fn generate_students(class_ids: &[ClassId], per_class: usize) -> Vec<CreateStudentDto> {
    class_ids
        .par_iter()
        .enumerate()
        .flat_map(|(class_idx, &class_id)| {
            (0..per_class)
                .map(|student_idx| {
                    let index = class_idx * per_class + student_idx;
                    generate_student(class_id, index)
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn generate_student(class_id: ClassId, index: usize) -> CreateStudentDto {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let parent_first_name: String = FirstName().fake();

    CreateStudentDto {
        email: email(&first_name, &last_name, "student", index),
        parent: ParentInfo {
            first_name: parent_first_name,
            last_name: last_name.clone(),
            email: None,
            phone: PhoneNumber().fake(),
            address: Some(StreetName().fake()),
        },
        first_name,
        last_name,
        pin_number: format!("S{:06}", index + 1),
        phone: PhoneNumber().fake(),
        date_of_birth: birth_date(2008..2018),
        place_of_birth: Some(CityName().fake()),
        address: Some(StreetName().fake()),
        class_id: Some(class_id),
    }
}

fn email(first_name: &str, last_name: &str, role: &str, index: usize) -> String {
    let clean = |s: &str| {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase()
    };
    format!(
        "{}.{}+{role}{index}@example.com",
        clean(first_name),
        clean(last_name)
    )
}

fn birth_date(years: std::ops::Range<i32>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(years.fake(), (1..13).fake(), (1..29).fake())
}
