mod common;

use axum::http::{Method, StatusCode};
use tower::util::ServiceExt;

#[tokio::test]
async fn test_admin_route_rejects_missing_token() {
    let config = common::test_config_with_admin_token("festival-admin-token");
    let app = common::create_test_app(config, common::lazy_pool());

    let response = app
        .oneshot(common::get_request("/api/admin/stats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::parse_response_body(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_admin_route_rejects_wrong_token() {
    let config = common::test_config_with_admin_token("festival-admin-token");
    let app = common::create_test_app(config, common::lazy_pool());

    let response = app
        .oneshot(common::get_request_with_token(
            "/api/admin/stats",
            "not-the-token",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_write_route_rejects_missing_token() {
    let config = common::test_config_with_admin_token("festival-admin-token");
    let app = common::create_test_app(config, common::lazy_pool());

    let response = app
        .oneshot(common::json_request(
            Method::POST,
            "/api/admin/bracelets",
            serde_json::json!({ "prefix": "evt", "count": 5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_routes_ignore_admin_token() {
    let config = common::test_config_with_admin_token("festival-admin-token");
    let app = common::create_test_app(config, common::lazy_pool());

    let response = app
        .oneshot(common::get_request("/api/health/live"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_admin_route_accepts_correct_token() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    let config = common::test_config_with_admin_token("festival-admin-token");
    let app = common::create_test_app(config, pool);

    let response = app
        .oneshot(common::get_request_with_token(
            "/api/admin/stats",
            "festival-admin-token",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
