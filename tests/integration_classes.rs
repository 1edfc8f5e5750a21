mod common;

use axum::Router;
use axum::http::StatusCode;
use common::{
    admin_token, create_class, create_level, create_student, create_subject, create_teacher, get,
    id_of, roll_over, send, setup_test_app,
};
use serde_json::{Value, json};
use sqlx::PgPool;

fn years(class: &Value) -> &Vec<Value> {
    class["academic_years"].as_array().unwrap()
}

async fn set_subjects(
    app: &Router,
    token: &str,
    class_id: &str,
    subjects: Value,
) -> (StatusCode, Value) {
    send(
        app,
        "PATCH",
        &format!("/api/class/add-subjects/{class_id}"),
        Some(token),
        Some(json!({ "subjects": subjects })),
    )
    .await
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_enrollment_lifecycle_across_rollovers(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;

    let level_id = id_of(&create_level(&app, &token, "Primary 5").await);
    let class = create_class(&app, &token, "CM2 A", &level_id).await;
    let class_id = id_of(&class);
    assert!(years(&class).is_empty());

    let level = get(&app, &token, &format!("/api/level/{level_id}")).await;
    assert_eq!(level["class_ids"], json!([class_id]));

    let (status, body) = roll_over(&app, &token, &class_id, "2024/2025").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["academic_year"]["year"], "2024/2025");
    let class = get(&app, &token, &format!("/api/class/{class_id}")).await;
    assert_eq!(years(&class).len(), 1);
    let first_year = years(&class)[0]["id"].clone();

    let student = create_student(&app, &token, Some(&class_id)).await;
    let student_id = id_of(&student);
    assert_eq!(student["academic_year_id"], first_year);
    assert_eq!(student["class_id"], json!(class_id));

    let class = get(&app, &token, &format!("/api/class/{class_id}")).await;
    assert_eq!(years(&class)[0]["students"], json!([student_id]));

    let (status, body) = roll_over(&app, &token, &class_id, "2025/2026").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released_students"], 1);

    let class = get(&app, &token, &format!("/api/class/{class_id}")).await;
    assert_eq!(years(&class).len(), 2);
    assert_eq!(years(&class)[1]["year"], "2025/2026");
    assert_eq!(years(&class)[0]["students"], json!([]));

    let student = get(&app, &token, &format!("/api/student/{student_id}")).await;
    assert!(student["class_id"].is_null());
    assert!(student["academic_year_id"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_duplicate_year_leaves_history_unchanged(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let level_id = id_of(&create_level(&app, &token, "Primary 1").await);
    let class_id = id_of(&create_class(&app, &token, "CP A", &level_id).await);

    let (status, _) = roll_over(&app, &token, &class_id, "2024/2025").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = roll_over(&app, &token, &class_id, "2024/2025").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("already exists"));

    let class = get(&app, &token, &format!("/api/class/{class_id}")).await;
    assert_eq!(years(&class).len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_new_class_starts_in_the_running_year(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let level_id = id_of(&create_level(&app, &token, "Primary 2").await);
    let first = id_of(&create_class(&app, &token, "CE1 A", &level_id).await);
    roll_over(&app, &token, &first, "2024/2025").await;

    let second = create_class(&app, &token, "CE1 B", &level_id).await;
    assert_eq!(years(&second).len(), 1);
    assert_eq!(years(&second)[0]["year"], "2024/2025");

    let level = get(&app, &token, &format!("/api/level/{level_id}")).await;
    assert_eq!(level["class_ids"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_rollover_for_all_classes(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/class/generate-new-year-for-classes",
        Some(&token),
        Some(json!({ "newAcademicYear": { "year": "2024/2025" } })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let level_id = id_of(&create_level(&app, &token, "Primary 3").await);
    let a = id_of(&create_class(&app, &token, "CE2 A", &level_id).await);
    let b = id_of(&create_class(&app, &token, "CE2 B", &level_id).await);
    roll_over(&app, &token, &a, "2025/2026").await;

    // one class already has the label: nothing is written
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/class/generate-new-year-for-classes",
        Some(&token),
        Some(json!({ "newAcademicYear": { "year": "2025/2026" } })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let class_b = get(&app, &token, &format!("/api/class/{b}")).await;
    assert!(years(&class_b).is_empty());

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/class/generate-new-year-for-classes",
        Some(&token),
        Some(json!({ "newAcademicYear": { "year": "2026/2027" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["classes"].as_array().unwrap().len(), 2);

    let class_a = get(&app, &token, &format!("/api/class/{a}")).await;
    assert_eq!(years(&class_a).last().unwrap()["year"], "2026/2027");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_assigning_a_teacher_replaces_the_previous_one(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let level_id = id_of(&create_level(&app, &token, "Primary 4").await);
    let class_id = id_of(&create_class(&app, &token, "CM1 A", &level_id).await);
    let subject_id = id_of(&create_subject(&app, &token, "French", "FR").await);
    let first = id_of(&create_teacher(&app, &token, &[&subject_id]).await);
    let second = id_of(&create_teacher(&app, &token, &[&subject_id]).await);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/class/add-subjects/{class_id}"),
        Some(&token),
        Some(json!({ "subjects": [subject_id, subject_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, rollover) = roll_over(&app, &token, &class_id, "2024/2025").await;
    let year_id = rollover["academic_year"]["id"].as_str().unwrap().to_string();

    let assign = |teacher: Value| {
        json!({
            "classId": class_id,
            "subjectId": subject_id,
            "academicYearId": year_id,
            "teacherId": teacher,
        })
    };

    for teacher in [&first, &second] {
        let (status, body) = send(
            &app,
            "PATCH",
            "/api/class/assign-teacher-to-a-subject",
            Some(&token),
            Some(assign(json!(teacher))),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let class = get(&app, &token, &format!("/api/class/{class_id}")).await;
    assert_eq!(class["subject_ids"], json!([subject_id]));
    let teachers = years(&class)[0]["teachers"].as_array().unwrap();
    assert_eq!(teachers.len(), 1);
    assert_eq!(teachers[0]["teacher_id"], json!(second));

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/class/assign-teacher-to-a-subject",
        Some(&token),
        Some(assign(json!("empty"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let class = get(&app, &token, &format!("/api/class/{class_id}")).await;
    assert!(years(&class)[0]["teachers"][0]["teacher_id"].is_null());

    roll_over(&app, &token, &class_id, "2025/2026").await;
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/class/assign-teacher-to-a-subject",
        Some(&token),
        Some(assign(json!(first))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_dropping_a_subject_drops_its_assignments(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let level_id = id_of(&create_level(&app, &token, "Primary 6").await);
    let class_id = id_of(&create_class(&app, &token, "CM2 B", &level_id).await);
    let maths = id_of(&create_subject(&app, &token, "Mathematics", "MATH").await);
    let french = id_of(&create_subject(&app, &token, "French", "FR").await);
    let teacher = id_of(&create_teacher(&app, &token, &[&maths, &french]).await);

    let (status, _) = set_subjects(&app, &token, &class_id, json!([maths, french])).await;
    assert_eq!(status, StatusCode::OK);
    let (_, rollover) = roll_over(&app, &token, &class_id, "2024/2025").await;
    let year_id = rollover["academic_year"]["id"].as_str().unwrap().to_string();

    for subject in [&maths, &french] {
        let (status, body) = send(
            &app,
            "PATCH",
            "/api/class/assign-teacher-to-a-subject",
            Some(&token),
            Some(json!({
                "classId": class_id,
                "subjectId": subject,
                "academicYearId": year_id,
                "teacherId": teacher,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (status, body) = set_subjects(&app, &token, &class_id, json!([french])).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["subject_ids"], json!([french]));

    let class = get(&app, &token, &format!("/api/class/{class_id}")).await;
    let teachers = years(&class)[0]["teachers"].as_array().unwrap();
    assert_eq!(teachers.len(), 1);
    assert_eq!(teachers[0]["subject_id"], json!(french));
    assert_eq!(teachers[0]["teacher_id"], json!(teacher));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_rollover_seeds_assignments_for_class_subjects_only(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let level_id = id_of(&create_level(&app, &token, "Secondary 2").await);
    let class_id = id_of(&create_class(&app, &token, "5e A", &level_id).await);
    let taught = id_of(&create_subject(&app, &token, "Physics", "PHY").await);
    let other = id_of(&create_subject(&app, &token, "Music", "MUS").await);
    let teacher = id_of(&create_teacher(&app, &token, &[&taught]).await);
    send(
        &app,
        "PATCH",
        &format!("/api/class/add-subjects/{class_id}"),
        Some(&token),
        Some(json!({ "subjects": [taught] })),
    )
    .await;

    let seeded = |subject: &str| {
        json!({
            "newAcademicYear": {
                "year": "2024/2025",
                "teachers": [{ "subjectId": subject, "teacherId": teacher, "isClassTeacher": true }],
            }
        })
    };

    let uri = format!("/api/class/generate-new-year-for-one-class/{class_id}");
    let (status, _) = send(&app, "PATCH", &uri, Some(&token), Some(seeded(&other))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "PATCH", &uri, Some(&token), Some(seeded(&taught))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let teachers = body["academic_year"]["teachers"].as_array().unwrap();
    assert_eq!(teachers[0]["teacher_id"], json!(teacher));
    assert_eq!(teachers[0]["is_class_teacher"], true);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_moving_and_deleting_a_class(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let from = id_of(&create_level(&app, &token, "Primary 5").await);
    let to = id_of(&create_level(&app, &token, "Primary 6").await);
    let class_id = id_of(&create_class(&app, &token, "CM2 B", &from).await);
    roll_over(&app, &token, &class_id, "2024/2025").await;
    let student_id = id_of(&create_student(&app, &token, Some(&class_id)).await);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/class/{class_id}"),
        Some(&token),
        Some(json!({ "level": to })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level_id"], json!(to));
    let old_level = get(&app, &token, &format!("/api/level/{from}")).await;
    assert_eq!(old_level["class_ids"], json!([]));
    let new_level = get(&app, &token, &format!("/api/level/{to}")).await;
    assert_eq!(new_level["class_ids"], json!([class_id]));

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/class/generate-time-table/{class_id}"),
        Some(&token),
        Some(json!({ "timeTable": [{ "day": "monday", "slots": ["08:00"] }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timetable"][0]["day"], "monday");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/class/{class_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released_students"], 1);

    let new_level = get(&app, &token, &format!("/api/level/{to}")).await;
    assert_eq!(new_level["class_ids"], json!([]));
    let student = get(&app, &token, &format!("/api/student/{student_id}")).await;
    assert!(student["class_id"].is_null());
}
