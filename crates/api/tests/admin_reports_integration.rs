mod common;

use axum::http::{header, StatusCode};
use tower::util::ServiceExt;

#[tokio::test]
async fn test_export_rejects_unknown_type() {
    let app = common::create_test_app(common::test_config(), common::lazy_pool());

    let response = app
        .oneshot(common::get_request("/api/admin/export?type=everything"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_rejects_unknown_format() {
    let app = common::create_test_app(common::test_config(), common::lazy_pool());

    let response = app
        .oneshot(common::get_request("/api/admin/export?format=xml"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_event_stats_counts_seeded_data() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    common::cleanup_prefix(&pool, "stats-").await;
    common::seed_bracelet(&pool, "stats-001", "active").await;
    common::seed_bracelet(&pool, "stats-002", "active").await;
    let a = common::seed_user(&pool, Some("stats-001"), "甲", "stats-wx-001").await;
    let b = common::seed_user(&pool, Some("stats-002"), "乙", "stats-wx-002").await;
    let (u1, u2) = if a < b { (a, b) } else { (b, a) };
    sqlx::query("INSERT INTO matches (user1_id, user2_id) VALUES ($1, $2)")
        .bind(u1)
        .bind(u2)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::create_test_app(common::test_config(), pool);
    let response = app
        .oneshot(common::get_request("/api/admin/stats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    // Other tests share the database, so counts are lower bounds
    assert!(body["totalUsers"].as_i64().unwrap() >= 2);
    assert!(body["activeUsers"].as_i64().unwrap() >= 2);
    assert!(body["totalMatches"].as_i64().unwrap() >= 1);
    assert!(body["todayMatches"].as_i64().unwrap() >= 1);
    assert!(body["totalBracelets"].as_i64().unwrap() >= 2);
    assert!(body["activeBracelets"].as_i64().unwrap() >= 2);
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_recent_activities_merges_registrations_and_matches() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    common::cleanup_prefix(&pool, "act-").await;
    common::seed_bracelet(&pool, "act-001", "active").await;
    common::seed_bracelet(&pool, "act-002", "active").await;
    let a = common::seed_user(&pool, Some("act-001"), "甲", "act-wx-001").await;
    let b = common::seed_user(&pool, Some("act-002"), "乙", "act-wx-002").await;
    let (u1, u2) = if a < b { (a, b) } else { (b, a) };
    sqlx::query("INSERT INTO matches (user1_id, user2_id) VALUES ($1, $2)")
        .bind(u1)
        .bind(u2)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::create_test_app(common::test_config(), pool);
    let response = app
        .oneshot(common::get_request("/api/admin/activities?limit=100"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    let items = body.as_array().unwrap();
    assert!(!items.is_empty());

    // Newest first
    let times: Vec<&str> = items
        .iter()
        .map(|i| i["occurredAt"].as_str().unwrap())
        .collect();
    let mut sorted = times.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(times, sorted);

    assert!(items
        .iter()
        .any(|i| i["kind"] == "user_registration" && i["details"] == "甲"));
    assert!(items
        .iter()
        .any(|i| i["kind"] == "match_success" && i["details"].as_str().unwrap().contains("与")));
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_activities_limit_is_clamped() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    let app = common::create_test_app(common::test_config(), pool);

    let response = app
        .oneshot(common::get_request("/api/admin/activities?limit=5000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    assert!(body.as_array().unwrap().len() <= 100);
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_list_matches_shows_both_sides() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    common::cleanup_prefix(&pool, "mlist-").await;
    common::seed_bracelet(&pool, "mlist-001", "active").await;
    common::seed_bracelet(&pool, "mlist-002", "active").await;
    let a = common::seed_user(&pool, Some("mlist-001"), "甲", "mlist-wx-001").await;
    let b = common::seed_user(&pool, Some("mlist-002"), "乙", "mlist-wx-002").await;
    let (u1, u2) = if a < b { (a, b) } else { (b, a) };
    sqlx::query("INSERT INTO matches (user1_id, user2_id) VALUES ($1, $2)")
        .bind(u1)
        .bind(u2)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::create_test_app(common::test_config(), pool);
    let response = app
        .oneshot(common::get_request("/api/admin/matches?limit=100"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    let item = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["user1Id"] == u1 && m["user2Id"] == u2)
        .expect("seeded match expected in listing");
    assert!(item["user1Name"].is_string());
    assert!(item["user2Name"].is_string());
    assert!(item["matchedAt"].is_string());
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_export_json_document_shape() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    common::cleanup_prefix(&pool, "expjson-").await;
    common::seed_bracelet(&pool, "expjson-001", "active").await;
    common::seed_user(&pool, Some("expjson-001"), "甲", "expjson-wx-001").await;
    let app = common::create_test_app(common::test_config(), pool);

    let response = app
        .oneshot(common::get_request("/api/admin/export?type=all&format=json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"autopia-all-"));
    assert!(disposition.ends_with(".json\""));

    let body = common::parse_response_body(response).await;
    assert_eq!(body["type"], "all");
    assert!(body["exportedAt"].is_string());
    assert!(body["users"].is_array());
    assert!(body["matches"].is_array());
    assert!(body["bracelets"].is_array());
    assert!(body["users"]
        .as_array()
        .unwrap()
        .iter()
        .any(|u| u["wechatId"] == "expjson-wx-001"));
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_export_users_only_omits_other_sections() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    let app = common::create_test_app(common::test_config(), pool);

    let response = app
        .oneshot(common::get_request("/api/admin/export?type=users"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::parse_response_body(response).await;
    assert_eq!(body["type"], "users");
    assert!(body["users"].is_array());
    assert!(body.get("matches").is_none());
    assert!(body.get("bracelets").is_none());
}

#[tokio::test]
#[ignore] // requires PostgreSQL (TEST_DATABASE_URL)
async fn test_export_csv_has_bom_and_attachment_headers() {
    let pool = common::create_test_pool().await;
    common::run_migrations(&pool).await;
    common::cleanup_prefix(&pool, "expcsv-").await;
    common::seed_bracelet(&pool, "expcsv-001", "active").await;
    common::seed_user(&pool, Some("expcsv-001"), "甲", "expcsv-wx-001").await;
    let app = common::create_test_app(common::test_config(), pool);

    let response = app
        .oneshot(common::get_request(
            "/api/admin/export?type=bracelets&format=csv",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.ends_with(".csv\""));

    let bytes = common::response_bytes(response).await;
    // UTF-8 BOM for spreadsheet apps
    assert_eq!(&bytes[..3], [0xEF, 0xBB, 0xBF]);
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("expcsv-001"));
}
