//! Class lifecycle: creation under a level, subject and teacher assignment,
//! academic-year rollover and deletion.
//!
//! Every write loads the class with [`ClassRepository::load_for_update`] so
//! concurrent requests on the same class run one after the other, decides on
//! the locked aggregate, then applies the writes in the same transaction.

use std::collections::HashSet;

use anyhow::{Context, anyhow};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use schoolyard_core::{AppError, PaginationMeta, PaginationParams};
use schoolyard_db::relations;
use schoolyard_db::repositories::{
    ClassRepository, LevelRepository, SubjectRepository, TeacherRepository,
};
use schoolyard_models::{
    AssignSubjectsDto, AssignTeacherDto, BulkRolloverResponse, Class, ClassDetails, ClassId,
    CreateClassDto, DeleteClassResponse, GenerateAcademicYearDto, GenerateAcademicYearForAllDto,
    PaginatedClassesResponse, RolloverResponse, SubjectId, TeacherAssignmentSeed, TeacherId,
    TeacherSlot, TimetableDto, UpdateClassDto,
};

use crate::metrics;
use crate::modules::dedup_ids;

const DUPLICATE_CLASS: &str = "A class with this designation already exists.";
const CREATE_FAILED: &str = "Creating class failed, please try again.";
const FETCH_FAILED: &str = "Fetching classes failed, please try again later.";
const UPDATE_FAILED: &str = "Updating class failed, please try again.";
const ASSIGN_FAILED: &str = "Assigning the teacher failed, please try again.";
const ROLLOVER_FAILED: &str = "Generating the new academic year failed, please try again.";
const DELETE_FAILED: &str = "Deleting class failed, please try again.";

fn class_not_found() -> AppError {
    AppError::not_found(anyhow!("Could not find this class."))
}

fn level_not_found() -> AppError {
    AppError::not_found(anyhow!("Could not find this level."))
}

async fn lock_class(
    conn: &mut PgConnection,
    id: ClassId,
    context: &'static str,
) -> Result<Class, AppError> {
    ClassRepository::load_for_update(conn, id)
        .await
        .context(context)?
        .ok_or_else(class_not_found)
}

async fn reload(
    conn: &mut PgConnection,
    id: ClassId,
    context: &'static str,
) -> Result<Class, AppError> {
    ClassRepository::load(conn, id)
        .await
        .context(context)?
        .ok_or_else(class_not_found)
}

/// Fails with 404 unless every id in `teacher_ids` names an existing teacher.
async fn ensure_teachers_exist(
    conn: &mut PgConnection,
    teacher_ids: &[TeacherId],
    context: &'static str,
) -> Result<(), AppError> {
    let wanted = dedup_ids(teacher_ids);
    if wanted.is_empty() {
        return Ok(());
    }
    let found: HashSet<TeacherId> = TeacherRepository::existing_ids(conn, &wanted)
        .await
        .context(context)?
        .into_iter()
        .collect();

    match wanted.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(AppError::not_found(anyhow!(
            "Could not find teacher {missing}."
        ))),
        None => Ok(()),
    }
}

/// Fails with 404 unless every id in `subject_ids` names an existing subject.
/// The subjects cannot be deleted until the transaction ends.
async fn ensure_subjects_exist(
    conn: &mut PgConnection,
    subject_ids: &[SubjectId],
    context: &'static str,
) -> Result<(), AppError> {
    let wanted = dedup_ids(subject_ids);
    if wanted.is_empty() {
        return Ok(());
    }
    let found: HashSet<SubjectId> = SubjectRepository::existing_ids(conn, &wanted)
        .await
        .context(context)?
        .into_iter()
        .collect();

    match wanted.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(AppError::not_found(anyhow!(
            "Could not find subject {missing}."
        ))),
        None => Ok(()),
    }
}

/// Appends the academic year to `class`, seeds its teacher assignments and
/// releases the students of the superseded years.
async fn roll_over(
    conn: &mut PgConnection,
    class: &Class,
    label: &str,
    seeds: &[TeacherAssignmentSeed],
) -> Result<RolloverResponse, AppError> {
    let year = ClassRepository::insert_academic_year(
        &mut *conn,
        class.id,
        class.next_year_position(),
        label,
    )
    .await
    .context(ROLLOVER_FAILED)?;

    for (position, seed) in seeds.iter().enumerate() {
        ClassRepository::insert_assignment(
            &mut *conn,
            year.id,
            seed.subject_id,
            seed.teacher_id,
            seed.is_class_teacher,
            position as i32,
        )
        .await
        .context(ROLLOVER_FAILED)?;
    }

    let released_students = relations::release_classes(&mut *conn, &[class.id])
        .await
        .context(ROLLOVER_FAILED)?;

    let academic_year = reload(conn, class.id, ROLLOVER_FAILED)
        .await?
        .current_academic_year()
        .cloned()
        .ok_or_else(|| AppError::internal(anyhow!("academic year vanished after insert")))?;

    Ok(RolloverResponse {
        class_id: class.id,
        academic_year,
        released_students,
    })
}

pub struct ClassService;

impl ClassService {
    /// Creates the class under its level. The year label of the most recently
    /// created class seeds the first academic year of the new one.
    #[instrument(skip(db))]
    pub async fn create_class(db: &PgPool, dto: CreateClassDto) -> Result<Class, AppError> {
        let mut tx = db.begin().await.context(CREATE_FAILED)?;

        if !LevelRepository::lock(&mut tx, dto.level_id)
            .await
            .context(CREATE_FAILED)?
        {
            return Err(level_not_found());
        }

        let running_year = ClassRepository::latest(&mut tx)
            .await
            .context(CREATE_FAILED)?
            .and_then(|latest| latest.current_academic_year().map(|y| y.year.clone()));

        let record = ClassRepository::insert(&mut tx, &dto.designation, dto.level_id)
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_CLASS, CREATE_FAILED))?;

        if let Some(label) = running_year.as_deref() {
            ClassRepository::insert_academic_year(&mut tx, record.id, 0, label)
                .await
                .context(CREATE_FAILED)?;
        }

        relations::link_class_to_level(&mut tx, dto.level_id, record.id)
            .await
            .context(CREATE_FAILED)?;

        let class = reload(&mut tx, record.id, CREATE_FAILED).await?;
        tx.commit().await.context(CREATE_FAILED)?;

        metrics::track_class_created();
        tracing::info!(class_id = %class.id, level_id = %dto.level_id, "Class created");

        Ok(class)
    }

    #[instrument(skip(db))]
    pub async fn get_classes(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<PaginatedClassesResponse, AppError> {
        let mut conn = db.acquire().await.context(FETCH_FAILED)?;

        let total = ClassRepository::count(&mut conn).await.context(FETCH_FAILED)?;
        let classes = ClassRepository::list(&mut conn, params.limit(), params.offset())
            .await
            .context(FETCH_FAILED)?;

        Ok(PaginatedClassesResponse {
            data: classes,
            meta: PaginationMeta::new(total, &params),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_class(db: &PgPool, id: ClassId) -> Result<ClassDetails, AppError> {
        let mut conn = db.acquire().await.context(FETCH_FAILED)?;

        let class = reload(&mut conn, id, FETCH_FAILED).await?;
        let level = match class.level_id {
            Some(level_id) => LevelRepository::find(&mut conn, level_id)
                .await
                .context(FETCH_FAILED)?,
            None => None,
        };
        let subjects = SubjectRepository::find_many(&mut conn, &class.subject_ids)
            .await
            .context(FETCH_FAILED)?;

        Ok(ClassDetails {
            class,
            level,
            subjects,
        })
    }

    /// Renames the class and/or moves it to another level.
    #[instrument(skip(db))]
    pub async fn update_class(
        db: &PgPool,
        id: ClassId,
        dto: UpdateClassDto,
    ) -> Result<Class, AppError> {
        let mut tx = db.begin().await.context(UPDATE_FAILED)?;
        let class = lock_class(&mut tx, id, UPDATE_FAILED).await?;

        if let Some(level_id) = dto.level_id {
            if !LevelRepository::lock(&mut tx, level_id)
                .await
                .context(UPDATE_FAILED)?
            {
                return Err(level_not_found());
            }
            relations::move_class(&mut tx, class.id, class.level_id, level_id)
                .await
                .context(UPDATE_FAILED)?;
        }

        ClassRepository::update(&mut tx, id, dto.designation.as_deref(), dto.level_id)
            .await
            .map_err(|e| AppError::from_write(e, DUPLICATE_CLASS, UPDATE_FAILED))?;

        let class = reload(&mut tx, id, UPDATE_FAILED).await?;
        tx.commit().await.context(UPDATE_FAILED)?;

        Ok(class)
    }

    /// Replaces the subject set of the class. Nothing is written unless every
    /// subject exists. Teacher assignments for subjects the class no longer
    /// has are deleted.
    #[instrument(skip(db))]
    pub async fn assign_subjects(
        db: &PgPool,
        id: ClassId,
        dto: AssignSubjectsDto,
    ) -> Result<Class, AppError> {
        let subject_ids = dedup_ids(&dto.subjects);

        let mut tx = db.begin().await.context(UPDATE_FAILED)?;
        lock_class(&mut tx, id, UPDATE_FAILED).await?;

        ensure_subjects_exist(&mut tx, &subject_ids, UPDATE_FAILED).await?;

        let dropped_assignments = relations::replace_class_subjects(&mut tx, id, &subject_ids)
            .await
            .context(UPDATE_FAILED)?;

        let class = reload(&mut tx, id, UPDATE_FAILED).await?;
        tx.commit().await.context(UPDATE_FAILED)?;

        tracing::info!(
            class_id = %id,
            subjects = subject_ids.len(),
            dropped_assignments,
            "Class subjects replaced"
        );

        Ok(class)
    }

    /// Assigns (or with `teacher_id: None`, unassigns) the teacher of a subject
    /// in the current academic year. An existing assignment for the subject is
    /// updated in place.
    #[instrument(skip(db))]
    pub async fn assign_teacher(db: &PgPool, dto: AssignTeacherDto) -> Result<Class, AppError> {
        let mut tx = db.begin().await.context(ASSIGN_FAILED)?;
        let class = lock_class(&mut tx, dto.class_id, ASSIGN_FAILED).await?;

        let slot = class.teacher_slot(dto.academic_year_id, dto.subject_id)?;

        if let Some(teacher_id) = dto.teacher_id {
            if !TeacherRepository::exists(&mut tx, teacher_id)
                .await
                .context(ASSIGN_FAILED)?
            {
                return Err(AppError::not_found(anyhow!("Could not find this teacher.")));
            }
        }

        match slot {
            TeacherSlot::Existing(assignment_id) => {
                ClassRepository::set_assignment_teacher(&mut tx, assignment_id, dto.teacher_id)
                    .await
                    .context(ASSIGN_FAILED)?;
            }
            TeacherSlot::Vacant { position } => {
                ClassRepository::insert_assignment(
                    &mut tx,
                    dto.academic_year_id,
                    dto.subject_id,
                    dto.teacher_id,
                    false,
                    position,
                )
                .await
                .context(ASSIGN_FAILED)?;
            }
        }

        let class = reload(&mut tx, class.id, ASSIGN_FAILED).await?;
        tx.commit().await.context(ASSIGN_FAILED)?;

        tracing::info!(
            class_id = %class.id,
            subject_id = %dto.subject_id,
            teacher_id = ?dto.teacher_id,
            "Teacher assignment updated"
        );

        Ok(class)
    }

    /// Appends a new academic year to one class. Only this class's history is
    /// checked for a duplicate label.
    #[instrument(skip(db))]
    pub async fn generate_year_for_class(
        db: &PgPool,
        id: ClassId,
        dto: GenerateAcademicYearDto,
    ) -> Result<RolloverResponse, AppError> {
        let new_year = dto.new_academic_year;
        let label = new_year.year.trim();

        let mut tx = db.begin().await.context(ROLLOVER_FAILED)?;
        let class = lock_class(&mut tx, id, ROLLOVER_FAILED).await?;

        class.ensure_year_available(label)?;
        class.check_seed_assignments(&new_year.teachers)?;

        let seeded_subjects: Vec<SubjectId> =
            new_year.teachers.iter().map(|seed| seed.subject_id).collect();
        ensure_subjects_exist(&mut tx, &seeded_subjects, ROLLOVER_FAILED).await?;
        let seeded_teachers: Vec<TeacherId> =
            new_year.teachers.iter().filter_map(|seed| seed.teacher_id).collect();
        ensure_teachers_exist(&mut tx, &seeded_teachers, ROLLOVER_FAILED).await?;

        let response = roll_over(&mut tx, &class, label, &new_year.teachers).await?;
        tx.commit().await.context(ROLLOVER_FAILED)?;

        metrics::track_rollover("one", 1);
        tracing::info!(
            class_id = %id,
            year = label,
            released_students = response.released_students,
            "Academic year generated"
        );

        Ok(response)
    }

    /// Appends the same academic year to every class. The label must be new
    /// to all of them; otherwise nothing is written.
    #[instrument(skip(db))]
    pub async fn generate_year_for_all(
        db: &PgPool,
        dto: GenerateAcademicYearForAllDto,
    ) -> Result<BulkRolloverResponse, AppError> {
        let label = dto.new_academic_year.year.trim().to_string();

        let mut tx = db.begin().await.context(ROLLOVER_FAILED)?;
        let classes = ClassRepository::load_all_for_update(&mut tx)
            .await
            .context(ROLLOVER_FAILED)?;

        if classes.is_empty() {
            return Err(AppError::not_found(anyhow!(
                "No class found, please create a class first."
            )));
        }
        if let Some(conflict) = Class::find_year_conflict(&classes, &label) {
            conflict.ensure_year_available(&label)?;
        }

        let mut rolled = Vec::with_capacity(classes.len());
        for class in &classes {
            rolled.push(roll_over(&mut tx, class, &label, &[]).await?);
        }
        tx.commit().await.context(ROLLOVER_FAILED)?;

        let released_students = rolled.iter().map(|r| r.released_students).sum();
        metrics::track_rollover("all", rolled.len());
        tracing::info!(
            year = %label,
            classes = rolled.len(),
            released_students,
            "Academic year generated for every class"
        );

        Ok(BulkRolloverResponse {
            year: label,
            classes: rolled,
            released_students,
        })
    }

    /// Replaces the whole timetable.
    #[instrument(skip(db, dto))]
    pub async fn set_timetable(
        db: &PgPool,
        id: ClassId,
        dto: TimetableDto,
    ) -> Result<Class, AppError> {
        let mut conn = db.acquire().await.context(UPDATE_FAILED)?;

        ClassRepository::set_timetable(&mut conn, id, &dto.time_table)
            .await
            .context(UPDATE_FAILED)?
            .ok_or_else(class_not_found)?;

        reload(&mut conn, id, UPDATE_FAILED).await
    }

    /// Deletes the class after removing it from its level and releasing its
    /// students. Academic years and assignments go with the class row.
    #[instrument(skip(db))]
    pub async fn delete_class(db: &PgPool, id: ClassId) -> Result<DeleteClassResponse, AppError> {
        let mut tx = db.begin().await.context(DELETE_FAILED)?;
        let class = lock_class(&mut tx, id, DELETE_FAILED).await?;

        let released_students = relations::detach_class(&mut tx, id)
            .await
            .context(DELETE_FAILED)?;
        ClassRepository::delete(&mut tx, id)
            .await
            .context(DELETE_FAILED)?;

        tx.commit().await.context(DELETE_FAILED)?;

        tracing::info!(class_id = %id, released_students, "Class deleted");

        Ok(DeleteClassResponse {
            message: "Class deleted.".to_string(),
            class,
            released_students,
        })
    }
}
