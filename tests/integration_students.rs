mod common;

use axum::http::StatusCode;
use common::{
    admin_token, create_class, create_level, create_student, get, id_of, roll_over, send,
    setup_test_app, student_body, unique_pin,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn class_with_year(app: &axum::Router, token: &str, designation: &str) -> String {
    let level_id = id_of(&create_level(app, token, &format!("Level of {designation}")).await);
    let class = create_class(app, token, designation, &level_id).await;
    let class_id = id_of(&class);
    // later classes start in the running year already
    if class["academic_years"].as_array().unwrap().is_empty() {
        let (status, _) = roll_over(app, token, &class_id, "2024/2025").await;
        assert_eq!(status, StatusCode::OK);
    }
    class_id
}

async fn transfer(
    app: &axum::Router,
    token: &str,
    student_id: &str,
    class_id: &str,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        "PATCH",
        &format!("/api/student/{student_id}"),
        Some(token),
        Some(json!({ "classe": class_id })),
    )
    .await
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_enrolling_requires_an_academic_year(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let level_id = id_of(&create_level(&app, &token, "Primary 1").await);
    let class_id = id_of(&create_class(&app, &token, "CP B", &level_id).await);

    let (status, body) = send(
        &app,
        "POST",
        "/api/student",
        Some(&token),
        Some(student_body(&unique_pin("S"), Some(&class_id))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    let unknown = Uuid::new_v4().to_string();
    let (status, _) = send(
        &app,
        "POST",
        "/api/student",
        Some(&token),
        Some(student_body(&unique_pin("S"), Some(&unknown))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let page = get(&app, &token, "/api/student").await;
    assert_eq!(page["meta"]["total"], 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_student_without_class(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;

    let student = create_student(&app, &token, None).await;
    assert!(student["class_id"].is_null());
    assert!(student.get("pin_number").is_none());
    assert_eq!(student["parent"]["first_name"], "Aminata");

    let student = get(&app, &token, &format!("/api/student/{}", id_of(&student))).await;
    assert!(student["class"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_transfer_moves_the_student_between_rosters(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let from = class_with_year(&app, &token, "CM1 A").await;
    let to = class_with_year(&app, &token, "CM1 B").await;
    let student_id = id_of(&create_student(&app, &token, Some(&from)).await);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/student/{student_id}"),
        Some(&token),
        Some(json!({ "classe": to, "phone": "785550000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["class_id"], json!(to));
    assert_eq!(body["phone"], "785550000");

    let old_class = get(&app, &token, &format!("/api/class/{from}")).await;
    assert_eq!(old_class["academic_years"][0]["students"], json!([]));
    let new_class = get(&app, &token, &format!("/api/class/{to}")).await;
    assert_eq!(new_class["academic_years"][0]["students"], json!([student_id]));
    assert_eq!(body["academic_year_id"], new_class["academic_years"][0]["id"]);

    let student = get(&app, &token, &format!("/api/student/{student_id}")).await;
    assert_eq!(student["class"]["designation"], "CM1 B");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_crossed_transfers_run_concurrently(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let left = class_with_year(&app, &token, "CE2 A").await;
    let right = class_with_year(&app, &token, "CE2 B").await;
    let first = id_of(&create_student(&app, &token, Some(&left)).await);
    let second = id_of(&create_student(&app, &token, Some(&right)).await);

    let (mut first_in, mut second_in) = (left.clone(), right.clone());
    for _ in 0..20 {
        std::mem::swap(&mut first_in, &mut second_in);
        let ((a, a_body), (b, b_body)) = tokio::join!(
            transfer(&app, &token, &first, &first_in),
            transfer(&app, &token, &second, &second_in)
        );
        assert_eq!(a, StatusCode::OK, "{a_body}");
        assert_eq!(b, StatusCode::OK, "{b_body}");
    }

    for (class_id, student_id) in [(&first_in, &first), (&second_in, &second)] {
        let class = get(&app, &token, &format!("/api/class/{class_id}")).await;
        assert_eq!(class["academic_years"][0]["students"], json!([student_id]));
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_failed_transfer_keeps_the_old_enrollment(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let level_id = id_of(&create_level(&app, &token, "Empty level").await);
    let without_year = id_of(&create_class(&app, &token, "CE2 Z", &level_id).await);
    let from = class_with_year(&app, &token, "CE2 A").await;
    let student_id = id_of(&create_student(&app, &token, Some(&from)).await);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/student/{student_id}"),
        Some(&token),
        Some(json!({ "classe": without_year })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let class = get(&app, &token, &format!("/api/class/{from}")).await;
    assert_eq!(class["academic_years"][0]["students"], json!([student_id]));
    let student = get(&app, &token, &format!("/api/student/{student_id}")).await;
    assert_eq!(student["class_id"], json!(from));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_duplicate_student_email(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let first = student_body(&unique_pin("S"), None);
    let mut second = student_body(&unique_pin("S"), None);
    second["email"] = first["email"].clone();

    let (status, _) = send(&app, "POST", "/api/student", Some(&token), Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "POST", "/api/student", Some(&token), Some(second)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "A student with this email already exists.");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_deleting_a_student_pulls_it_from_the_roster(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let class_id = class_with_year(&app, &token, "6e B").await;
    let staying = id_of(&create_student(&app, &token, Some(&class_id)).await);
    let leaving = id_of(&create_student(&app, &token, Some(&class_id)).await);

    let uri = format!("/api/student/{leaving}");
    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student"]["id"], json!(leaving));

    let class = get(&app, &token, &format!("/api/class/{class_id}")).await;
    assert_eq!(class["academic_years"][0]["students"], json!([staying]));
    let (status, _) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
