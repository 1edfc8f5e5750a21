mod common;

use axum::http::StatusCode;
use common::{
    ADMIN_PASSWORD, admin_token, create_subject, send, setup_test_app, student_body,
    teacher_body, unique_email, unique_pin,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_signup_then_login_as_admin(pool: PgPool) {
    let app = setup_test_app(pool);
    let email = unique_email("head");

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/signup",
        None,
        Some(json!({ "name": "Head", "email": email, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());
    assert!(body.get("password").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({ "email": email, "password": ADMIN_PASSWORD, "user_type": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_type"], "admin");
    assert_eq!(body["expires_in"], 3600);

    let token = body["token"].as_str().unwrap();
    let (status, _) = send(&app, "GET", "/api/level", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_duplicate_signup_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool);
    let body = json!({ "name": "Head", "email": unique_email("dup"), "password": ADMIN_PASSWORD });

    let (status, _) = send(&app, "POST", "/api/admin/signup", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/admin/signup", None, Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "User exists already, please login instead.");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_wrong_password_is_forbidden(pool: PgPool) {
    let app = setup_test_app(pool);
    let email = unique_email("head");
    send(
        &app,
        "POST",
        "/api/admin/signup",
        None,
        Some(json!({ "name": "Head", "email": email, "password": ADMIN_PASSWORD })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({ "email": email, "password": "wrong-password", "user_type": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid credentials, could not log you in.");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_teacher_logs_in_with_pin_ignoring_case(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let subject = create_subject(&app, &token, "Mathematics", "MATH").await;
    let subject_id = subject["id"].as_str().unwrap();

    let pin = "TEACH-42";
    let teacher = teacher_body(pin, &[subject_id]);
    let (status, _) = send(&app, "POST", "/api/teacher", Some(&token), Some(teacher.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({
            "email": teacher["email"],
            "password": pin.to_lowercase(),
            "userType": "professeur",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user_type"], "teacher");
    assert!(body.get("is_admin").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_student_login_rejects_wrong_pin(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let student = student_body(&unique_pin("S"), None);
    let (status, _) = send(&app, "POST", "/api/student", Some(&token), Some(student.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({ "email": student["email"], "password": "0000", "user_type": "eleve" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({
            "email": student["email"],
            "password": student["pin_number"],
            "user_type": "student",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}
