mod common;

use axum::http::StatusCode;
use common::{send, setup_offline_app, test_jwt_config};
use schoolyard_auth::{UserType, create_access_token};
use uuid::Uuid;

#[tokio::test]
async fn test_health_check() {
    let app = setup_offline_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = setup_offline_app();
    let (status, body) = send(&app, "GET", "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Could not find this route.");
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let app = setup_offline_app();
    for uri in [
        "/api/level",
        "/api/class",
        "/api/subject",
        "/api/teacher",
        "/api/student",
    ] {
        let (status, body) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = setup_offline_app();
    let (status, _) = send(&app, "GET", "/api/class", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_another_secret_is_rejected() {
    let app = setup_offline_app();
    let mut config = test_jwt_config();
    config.secret = "some-other-secret".to_string();
    let token =
        create_access_token(Uuid::new_v4(), "head@school.org", UserType::Admin, &config).unwrap();

    let (status, _) = send(&app, "GET", "/api/level", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validation_runs_before_the_database() {
    let app = setup_offline_app();
    let token = create_access_token(
        Uuid::new_v4(),
        "head@school.org",
        UserType::Admin,
        &test_jwt_config(),
    )
    .unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/class",
        Some(&token),
        Some(serde_json::json!({ "designation": "CM2" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert!(body["message"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn test_blank_academic_year_is_rejected() {
    let app = setup_offline_app();
    let token = create_access_token(
        Uuid::new_v4(),
        "head@school.org",
        UserType::Admin,
        &test_jwt_config(),
    )
    .unwrap();

    for uri in [
        format!("/api/class/generate-new-year-for-one-class/{}", Uuid::new_v4()),
        "/api/class/generate-new-year-for-classes".to_string(),
    ] {
        let (status, body) = send(
            &app,
            "PATCH",
            &uri,
            Some(&token),
            Some(serde_json::json!({ "newAcademicYear": { "year": "        " } })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}: {body}");
        assert_eq!(body["message"], "Please provide a valid academic year.");
    }
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_offline_app();
    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/class/{id}"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}
