mod common;

use axum::http::StatusCode;
use tower::util::ServiceExt;

#[tokio::test]
async fn test_liveness_probe() {
    let app = common::create_test_app(common::test_config(), common::lazy_pool());

    let response = app
        .oneshot(common::get_request("/api/health/live"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_health_check_reports_database() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    let app = common::create_test_app(common::test_config(), pool);

    let response = app
        .oneshot(common::get_request("/api/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["connected"], true);
    // No fortune backend configured in tests
    assert_eq!(body["fortune_backend"]["configured"], false);
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_readiness_probe() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    let app = common::create_test_app(common::test_config(), pool);

    let response = app
        .oneshot(common::get_request("/api/health/ready"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_metrics_endpoint_without_recorder() {
    // Tests never call init_metrics, so the endpoint reports the missing
    // recorder instead of panicking.
    let app = common::create_test_app(common::test_config(), common::lazy_pool());

    let response = app.oneshot(common::get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
