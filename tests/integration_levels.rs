mod common;

use axum::http::StatusCode;
use common::{admin_token, create_class, create_level, get, id_of, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_level_lists_its_classes(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;

    let level = create_level(&app, &token, "Primary 5").await;
    let level_id = id_of(&level);
    assert_eq!(level["registration_fee"], 100.0);
    assert_eq!(level["class_ids"], json!([]));

    let class = create_class(&app, &token, "CM2 A", &level_id).await;
    let class_id = id_of(&class);

    let level = get(&app, &token, &format!("/api/level/{level_id}")).await;
    assert_eq!(level["class_ids"], json!([class_id]));
    assert_eq!(level["classes"][0]["designation"], "CM2 A");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_duplicate_designation_is_unprocessable(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    create_level(&app, &token, "Primary 6").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/level",
        Some(&token),
        Some(json!({ "designation": "Primary 6", "registration_fee": 1, "tuition_fee": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_update_and_paginated_list(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    for name in ["Nursery", "Primary 1", "Primary 2"] {
        create_level(&app, &token, name).await;
    }

    let page = get(&app, &token, "/api/level?limit=2").await;
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["meta"]["total"], 3);
    assert_eq!(page["meta"]["has_more"], true);

    let id = id_of(&page["data"][0]);
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/level/{id}"),
        Some(&token),
        Some(json!({ "tuition_fee": 1200.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tuition_fee"], 1200.0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
async fn test_deleting_a_level_detaches_its_classes(pool: PgPool) {
    let app = setup_test_app(pool);
    let token = admin_token(&app).await;
    let level_id = id_of(&create_level(&app, &token, "Secondary 1").await);
    let class_id = id_of(&create_class(&app, &token, "6e A", &level_id).await);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/level/{level_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detached_classes"], 1);

    let class = get(&app, &token, &format!("/api/class/{class_id}")).await;
    assert!(class["level_id"].is_null());

    let (status, _) = send(&app, "GET", &format!("/api/level/{level_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
