//! Database seeding.
//!
//! [`seed_all`] inserts levels, subjects, teachers, classes (each with one
//! academic year and a teacher per subject) and enrolled students inside a
//! single transaction. [`clear_all`] removes all of it and keeps admins.

mod models;

use std::collections::HashMap;
use std::time::Instant;

use sqlx::PgPool;

use schoolyard_db::relations;
use schoolyard_db::repositories::{
    ClassRepository, LevelRepository, StudentRepository, SubjectRepository, TeacherRepository,
};
use schoolyard_models::{AcademicYearId, ClassId, SubjectId, TeacherId};

pub use models::{
    SeedConfig, class_designation, generate_levels, generate_students, generate_subjects,
    generate_teachers, level_designation,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub levels: usize,
    pub classes: usize,
    pub subjects: usize,
    pub teachers: usize,
    pub students: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClearSummary {
    pub students: u64,
    pub classes: u64,
    pub teachers: u64,
    pub subjects: u64,
    pub levels: u64,
}

pub async fn seed_all(db: &PgPool, config: &SeedConfig) -> anyhow::Result<SeedSummary> {
    let start_time = Instant::now();
    println!(
        "🌱 Seeding {} levels, {} classes, {} subjects, {} teachers, {} students...",
        config.levels,
        config.total_classes(),
        config.subjects,
        config.teachers,
        config.total_students()
    );

    let mut tx = db.begin().await?;
    let mut summary = SeedSummary::default();

    let mut subject_ids: Vec<SubjectId> = Vec::with_capacity(config.subjects);
    for dto in generate_subjects(config.subjects) {
        let subject = SubjectRepository::insert(&mut tx, &dto).await?;
        subject_ids.push(subject.id);
    }
    summary.subjects = subject_ids.len();
    println!("   ✓ Inserted {} subjects", summary.subjects);

    let mut teachers_by_subject: HashMap<SubjectId, Vec<TeacherId>> = HashMap::new();
    for dto in generate_teachers(config.teachers, &subject_ids) {
        let teacher = TeacherRepository::insert(&mut tx, &dto, &dto.subjects).await?;
        relations::link_teacher_subjects(&mut tx, teacher.id, &dto.subjects).await?;
        for subject_id in &dto.subjects {
            teachers_by_subject
                .entry(*subject_id)
                .or_default()
                .push(teacher.id);
        }
        summary.teachers += 1;
    }
    println!("   ✓ Inserted {} teachers", summary.teachers);

    let mut enrollments: HashMap<ClassId, AcademicYearId> = HashMap::new();
    let mut class_ids: Vec<ClassId> = Vec::with_capacity(config.total_classes());
    for dto in generate_levels(config.levels) {
        let level = LevelRepository::insert(&mut tx, &dto).await?;
        summary.levels += 1;

        for class_idx in 0..config.classes_per_level {
            let designation = class_designation(&level.designation, class_idx);
            let class = ClassRepository::insert(&mut tx, &designation, level.id).await?;
            relations::link_class_to_level(&mut tx, level.id, class.id).await?;
            relations::replace_class_subjects(&mut tx, class.id, &subject_ids).await?;

            let year = ClassRepository::insert_academic_year(&mut tx, class.id, 0, &config.year)
                .await?;
            for (position, subject_id) in subject_ids.iter().enumerate() {
                let teacher_id = teachers_by_subject
                    .get(subject_id)
                    .and_then(|teachers| teachers.get(class_ids.len() % teachers.len()))
                    .copied();
                ClassRepository::insert_assignment(
                    &mut tx,
                    year.id,
                    *subject_id,
                    teacher_id,
                    position == 0 && teacher_id.is_some(),
                    position as i32,
                )
                .await?;
            }

            enrollments.insert(class.id, year.id);
            class_ids.push(class.id);
        }
    }
    summary.classes = class_ids.len();
    println!(
        "   ✓ Inserted {} levels and {} classes",
        summary.levels, summary.classes
    );

    for dto in generate_students(&class_ids, config.students_per_class) {
        let Some(class_id) = dto.class_id else {
            continue;
        };
        let Some(&year_id) = enrollments.get(&class_id) else {
            continue;
        };
        let student = StudentRepository::insert(&mut tx, &dto, Some((class_id, year_id))).await?;
        ClassRepository::push_student(&mut tx, year_id, student.id).await?;
        summary.students += 1;
    }
    println!("   ✓ Inserted {} students", summary.students);

    tx.commit().await?;

    println!("✅ Seeding finished in {:?}", start_time.elapsed());
    Ok(summary)
}

/// Deletes every school record. Admins are kept.
pub async fn clear_all(db: &PgPool) -> anyhow::Result<ClearSummary> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let mut tx = db.begin().await?;
    let summary = ClearSummary {
        students: StudentRepository::delete_all(&mut tx).await?,
        // academic years and assignments cascade
        classes: ClassRepository::delete_all(&mut tx).await?,
        teachers: TeacherRepository::delete_all(&mut tx).await?,
        subjects: SubjectRepository::delete_all(&mut tx).await?,
        levels: LevelRepository::delete_all(&mut tx).await?,
    };
    tx.commit().await?;

    println!(
        "   ✓ Deleted {} students, {} classes, {} teachers, {} subjects, {} levels in {:?}",
        summary.students,
        summary.classes,
        summary.teachers,
        summary.subjects,
        summary.levels,
        start_time.elapsed()
    );

    Ok(summary)
}
