mod common;

use axum::http::{Method, StatusCode};
use tower::util::ServiceExt;

#[tokio::test]
async fn test_seed_rejects_zero_count() {
    let app = common::create_test_app(common::test_config(), common::lazy_pool());

    let response = app
        .oneshot(common::json_request(
            Method::POST,
            "/api/admin/bracelets",
            serde_json::json!({ "prefix": "evt", "count": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_seed_rejects_oversized_batch() {
    let app = common::create_test_app(common::test_config(), common::lazy_pool());

    let response = app
        .oneshot(common::json_request(
            Method::POST,
            "/api/admin/bracelets",
            serde_json::json!({ "prefix": "evt", "count": 1001 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_seed_inserts_fresh_uids() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    common::cleanup_prefix(&pool, "seedtest-").await;
    let app = common::create_test_app(common::test_config(), pool.clone());

    let response = app
        .oneshot(common::json_request(
            Method::POST,
            "/api/admin/bracelets",
            serde_json::json!({ "prefix": "seedtest", "count": 5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    assert_eq!(body["requested"], 5);
    assert_eq!(body["inserted"], 5);
    assert_eq!(body["uids"].as_array().unwrap().len(), 5);
    for uid in body["uids"].as_array().unwrap() {
        assert!(uid.as_str().unwrap().starts_with("seedtest-"));
    }

    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM bracelets WHERE nfc_uid LIKE 'seedtest-%'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count.0, 5);
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_list_includes_bound_user() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    common::cleanup_prefix(&pool, "brlist-").await;
    common::seed_bracelet(&pool, "brlist-001", "active").await;
    common::seed_user(&pool, Some("brlist-001"), "阿明", "brlist-wx-001").await;
    let app = common::create_test_app(common::test_config(), pool);

    let response = app
        .oneshot(common::get_request(
            "/api/admin/bracelets?search=brlist-001",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    assert_eq!(body["total"], 1);
    let item = &body["items"][0];
    assert_eq!(item["uid"], "brlist-001");
    assert_eq!(item["status"], "active");
    assert_eq!(item["boundUser"]["name"], "阿明");
    assert_eq!(item["boundUser"]["wechatId"], "brlist-wx-001");
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_retiring_bracelet_unbinds_user() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    common::cleanup_prefix(&pool, "brretire-").await;
    common::seed_bracelet(&pool, "brretire-001", "active").await;
    let user_id = common::seed_user(&pool, Some("brretire-001"), "阿明", "brretire-wx-001").await;
    let app = common::create_test_app(common::test_config(), pool.clone());

    let response = app
        .oneshot(common::json_request(
            Method::PUT,
            "/api/admin/bracelets/brretire-001",
            serde_json::json!({ "status": "inactive" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    assert_eq!(body["status"], "inactive");

    // The user profile survives but no longer references the uid
    let row: (Option<String>,) = sqlx::query_as("SELECT nfc_uid FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(row.0.is_none());
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_status_update_unknown_uid_is_404() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    let app = common::create_test_app(common::test_config(), pool);

    let response = app
        .oneshot(common::json_request(
            Method::PUT,
            "/api/admin/bracelets/no-such-uid",
            serde_json::json!({ "status": "inactive" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_delete_refused_while_bound() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    common::cleanup_prefix(&pool, "brdel-").await;
    common::seed_bracelet(&pool, "brdel-001", "active").await;
    common::seed_user(&pool, Some("brdel-001"), "阿明", "brdel-wx-001").await;
    let app = common::create_test_app(common::test_config(), pool.clone());

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method(Method::DELETE)
                .uri("/api/admin/bracelets/brdel-001")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Still present
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM bracelets WHERE nfc_uid = 'brdel-001'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count.0, 1);
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_delete_unbound_bracelet() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    common::cleanup_prefix(&pool, "brfree-").await;
    common::seed_bracelet(&pool, "brfree-001", "available").await;
    let app = common::create_test_app(common::test_config(), pool.clone());

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method(Method::DELETE)
                .uri("/api/admin/bracelets/brfree-001")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    assert_eq!(body["deleted"], true);

    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM bracelets WHERE nfc_uid = 'brfree-001'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count.0, 0);
}
