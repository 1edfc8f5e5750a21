//! Bidirectional references between aggregates.
//!
//! The store keeps id sets on both sides of a relationship (level ↔ classes,
//! subject ↔ teachers, academic-year roster ↔ student). Teacher assignments
//! also point at subjects and are pruned when those go away. Every function
//! here updates both sides, so a relationship is only ever changed through
//! this module. None of them open a transaction: callers pass `&mut tx` and
//! commit once the whole request succeeded.
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let teacher = TeacherRepository::insert(&mut tx, &dto, &subject_ids).await?;
//! relations::link_teacher_subjects(&mut tx, teacher.id, &subject_ids).await?;
//! tx.commit().await?;
//! ```

use sqlx::PgConnection;

use schoolyard_models::{AcademicYearId, ClassId, LevelId, StudentId, SubjectId, TeacherId};

use crate::repositories::{
    ClassRepository, LevelRepository, StudentRepository, SubjectRepository, TeacherRepository,
};

/// Counts of back-references removed when a subject goes away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubjectDetachment {
    pub teachers: u64,
    pub classes: u64,
    pub assignments: u64,
}

/// Counts of back-references removed when a teacher goes away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeacherDetachment {
    pub subjects: u64,
    pub assignments: u64,
}

pub async fn link_class_to_level(
    conn: &mut PgConnection,
    level_id: LevelId,
    class_id: ClassId,
) -> Result<(), sqlx::Error> {
    LevelRepository::add_class(conn, level_id, class_id).await?;
    Ok(())
}

pub async fn unlink_class_from_level(
    conn: &mut PgConnection,
    level_id: LevelId,
    class_id: ClassId,
) -> Result<(), sqlx::Error> {
    LevelRepository::remove_class(conn, level_id, class_id).await?;
    Ok(())
}

/// Moves `class_id` from the class set of `from` (if any) to that of `to`.
/// The class row's own `level_id` is written by the caller.
pub async fn move_class(
    conn: &mut PgConnection,
    class_id: ClassId,
    from: Option<LevelId>,
    to: LevelId,
) -> Result<(), sqlx::Error> {
    if from == Some(to) {
        return Ok(());
    }
    if let Some(from) = from {
        LevelRepository::remove_class(&mut *conn, from, class_id).await?;
    }
    LevelRepository::add_class(conn, to, class_id).await?;
    Ok(())
}

/// Clears the level reference of every class of a level about to be deleted.
pub async fn detach_level(conn: &mut PgConnection, level_id: LevelId) -> Result<u64, sqlx::Error> {
    ClassRepository::clear_level(conn, level_id).await
}

/// Detaches a class about to be deleted: removes it from every level and
/// clears the enrollment of its students. Returns the students released.
pub async fn detach_class(conn: &mut PgConnection, class_id: ClassId) -> Result<u64, sqlx::Error> {
    LevelRepository::remove_class_everywhere(&mut *conn, class_id).await?;
    StudentRepository::clear_enrollment_for_classes(conn, &[class_id]).await
}

/// Replaces the subject set of a class. Teacher assignments for subjects the
/// class no longer has are deleted. Returns the number deleted.
pub async fn replace_class_subjects(
    conn: &mut PgConnection,
    class_id: ClassId,
    subject_ids: &[SubjectId],
) -> Result<u64, sqlx::Error> {
    ClassRepository::set_subjects(&mut *conn, class_id, subject_ids).await?;
    ClassRepository::delete_assignments_outside(conn, class_id, subject_ids).await
}

/// Adds the teacher to each subject's teacher set. The teacher's own subject
/// list is written when the teacher row is inserted or by
/// [`replace_teacher_subjects`].
pub async fn link_teacher_subjects(
    conn: &mut PgConnection,
    teacher_id: TeacherId,
    subject_ids: &[SubjectId],
) -> Result<(), sqlx::Error> {
    SubjectRepository::add_teacher(conn, subject_ids, teacher_id).await?;
    Ok(())
}

/// Replaces a teacher's subject list: the old subjects lose the teacher, then
/// the new ones gain it.
pub async fn replace_teacher_subjects(
    conn: &mut PgConnection,
    teacher_id: TeacherId,
    old_subjects: &[SubjectId],
    new_subjects: &[SubjectId],
) -> Result<(), sqlx::Error> {
    SubjectRepository::remove_teacher(&mut *conn, old_subjects, teacher_id).await?;
    TeacherRepository::set_subjects(&mut *conn, teacher_id, new_subjects).await?;
    SubjectRepository::add_teacher(conn, new_subjects, teacher_id).await?;
    Ok(())
}

/// Removes the pair from both sides. Either side may already be missing it.
pub async fn unlink_teacher_from_subject(
    conn: &mut PgConnection,
    subject_id: SubjectId,
    teacher_id: TeacherId,
) -> Result<(), sqlx::Error> {
    SubjectRepository::remove_teacher(&mut *conn, &[subject_id], teacher_id).await?;
    TeacherRepository::remove_subject(conn, teacher_id, subject_id).await?;
    Ok(())
}

/// Detaches a teacher about to be deleted.
pub async fn detach_teacher(
    conn: &mut PgConnection,
    teacher_id: TeacherId,
) -> Result<TeacherDetachment, sqlx::Error> {
    let subjects = SubjectRepository::remove_teacher_everywhere(&mut *conn, teacher_id).await?;
    let assignments = ClassRepository::vacate_teacher(conn, teacher_id).await?;
    Ok(TeacherDetachment {
        subjects,
        assignments,
    })
}

/// Detaches a subject about to be deleted from teachers, classes and the
/// teacher assignments of every academic year.
pub async fn detach_subject(
    conn: &mut PgConnection,
    subject_id: SubjectId,
) -> Result<SubjectDetachment, sqlx::Error> {
    let teachers = TeacherRepository::remove_subject_everywhere(&mut *conn, subject_id).await?;
    let classes = ClassRepository::remove_subject_everywhere(&mut *conn, subject_id).await?;
    let assignments = ClassRepository::delete_subject_assignments(conn, subject_id).await?;
    Ok(SubjectDetachment {
        teachers,
        classes,
        assignments,
    })
}

/// Puts the student on the roster of `academic_year_id` and points the
/// student at it.
pub async fn enroll_student(
    conn: &mut PgConnection,
    student_id: StudentId,
    class_id: ClassId,
    academic_year_id: AcademicYearId,
) -> Result<(), sqlx::Error> {
    ClassRepository::push_student(&mut *conn, academic_year_id, student_id).await?;
    StudentRepository::set_enrollment(conn, student_id, Some((class_id, academic_year_id)))
        .await?;
    Ok(())
}

/// Pulls the student from `rosters` and clears its enrollment pointer.
pub async fn withdraw_student(
    conn: &mut PgConnection,
    student_id: StudentId,
    rosters: &[AcademicYearId],
) -> Result<(), sqlx::Error> {
    if !rosters.is_empty() {
        ClassRepository::pull_student(&mut *conn, rosters, student_id).await?;
    }
    StudentRepository::set_enrollment(conn, student_id, None).await?;
    Ok(())
}

/// Ends the enrollment of everyone in `class_ids`: rosters are emptied and
/// every student pointing at one of the classes is released. Returns the
/// number of students released.
pub async fn release_classes(
    conn: &mut PgConnection,
    class_ids: &[ClassId],
) -> Result<u64, sqlx::Error> {
    if class_ids.is_empty() {
        return Ok(0);
    }
    ClassRepository::clear_rosters(&mut *conn, class_ids).await?;
    StudentRepository::clear_enrollment_for_classes(conn, class_ids).await
}
