//! Admin reporting routes: dashboard stats, activity feed, data export.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use domain::models::{ActivityItem, ActivityKind, EventStats, ExportFormat, ExportKind, User};
use domain::services::fortune_schedule;
use persistence::entities::{BraceletEntity, MatchWithUsersEntity, UserEntity};
use persistence::repositories::{BraceletRepository, MatchRepository, UserRepository};
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;

/// Default number of entries in the activity feed.
const DEFAULT_ACTIVITY_LIMIT: i64 = 20;

/// Hard cap on the activity feed size.
const MAX_ACTIVITY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub format: Option<String>,
}

/// GET /api/admin/stats
///
/// "Today" is bounded by the event-time midnight, not the server's.
pub async fn event_stats(
    State(state): State<AppState>,
) -> Result<Json<EventStats>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let stats = users
        .event_stats(fortune_schedule::day_start(Utc::now()))
        .await?;
    Ok(Json(stats))
}

/// GET /api/admin/activities?limit=
///
/// Recent registrations and matches merged into one time-ordered feed.
pub async fn recent_activities(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityItem>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT);

    let users = UserRepository::new(state.pool.clone());
    let matches = MatchRepository::new(state.pool.clone());

    let registrations = users.recent_registrations(limit).await?;
    let recent_matches = matches.recent(limit).await?;

    let mut items: Vec<ActivityItem> = registrations
        .into_iter()
        .map(|u| ActivityItem {
            kind: ActivityKind::UserRegistration,
            description: ActivityKind::UserRegistration.description().to_string(),
            details: u.name,
            occurred_at: u.created_at,
        })
        .chain(recent_matches.into_iter().map(|m| ActivityItem {
            kind: ActivityKind::MatchSuccess,
            description: ActivityKind::MatchSuccess.description().to_string(),
            details: format!(
                "{} 与 {}",
                m.user1_name.as_deref().unwrap_or("已删除用户"),
                m.user2_name.as_deref().unwrap_or("已删除用户")
            ),
            occurred_at: m.matched_at,
        }))
        .collect();

    items.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    items.truncate(limit as usize);

    Ok(Json(items))
}

/// GET /api/admin/export?type=users|matches|bracelets|all&format=json|csv
///
/// CSV documents carry a UTF-8 BOM and RFC-4180 quoting; both formats are
/// served as dated attachment downloads.
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let kind: ExportKind = query
        .kind
        .as_deref()
        .unwrap_or("all")
        .parse()
        .map_err(ApiError::Validation)?;
    let format: ExportFormat = query
        .format
        .as_deref()
        .unwrap_or("json")
        .parse()
        .map_err(ApiError::Validation)?;

    let users_repo = UserRepository::new(state.pool.clone());
    let matches_repo = MatchRepository::new(state.pool.clone());
    let bracelets_repo = BraceletRepository::new(state.pool.clone());

    let users = if kind.includes_users() {
        users_repo.export_all().await?
    } else {
        Vec::new()
    };
    let matches = if kind.includes_matches() {
        matches_repo.export_all().await?
    } else {
        Vec::new()
    };
    let bracelets = if kind.includes_bracelets() {
        bracelets_repo.export_all().await?
    } else {
        Vec::new()
    };

    let body = match format {
        ExportFormat::Json => export_json(kind, &users, &matches, &bracelets)?,
        ExportFormat::Csv => export_csv(kind, &users, &matches, &bracelets),
    };

    let filename = format!(
        "autopia-{}-{}.{}",
        kind.as_str(),
        Utc::now().format("%Y%m%d"),
        format.extension()
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

fn export_json(
    kind: ExportKind,
    users: &[UserEntity],
    matches: &[MatchWithUsersEntity],
    bracelets: &[BraceletEntity],
) -> Result<Vec<u8>, ApiError> {
    let mut doc = serde_json::Map::new();
    doc.insert("exportedAt".into(), json!(Utc::now().to_rfc3339()));
    doc.insert("type".into(), json!(kind.as_str()));

    if kind.includes_users() {
        let users: Vec<User> = users.iter().cloned().map(Into::into).collect();
        doc.insert("users".into(), serde_json::to_value(users).unwrap_or_default());
    }
    if kind.includes_matches() {
        let matches: Vec<_> = matches
            .iter()
            .map(|m| {
                json!({
                    "id": m.id,
                    "user1Id": m.user1_id,
                    "user2Id": m.user2_id,
                    "user1Name": m.user1_name,
                    "user2Name": m.user2_name,
                    "matchedAt": m.matched_at.to_rfc3339(),
                })
            })
            .collect();
        doc.insert("matches".into(), json!(matches));
    }
    if kind.includes_bracelets() {
        let bracelets: Vec<_> = bracelets
            .iter()
            .map(|b| {
                json!({
                    "uid": b.nfc_uid,
                    "status": domain::models::BraceletStatus::from(b.status).as_str(),
                    "createdAt": b.created_at.to_rfc3339(),
                })
            })
            .collect();
        doc.insert("bracelets".into(), json!(bracelets));
    }

    serde_json::to_vec_pretty(&doc).map_err(|e| ApiError::Internal(e.to_string()))
}

fn export_csv(
    kind: ExportKind,
    users: &[UserEntity],
    matches: &[MatchWithUsersEntity],
    bracelets: &[BraceletEntity],
) -> Vec<u8> {
    let mut doc = String::new();
    doc.push(shared::csv::UTF8_BOM);

    if kind.includes_users() {
        shared::csv::write_header(
            &mut doc,
            &[
                "id",
                "name",
                "gender",
                "wechat_id",
                "bracelet_uid",
                "status",
                "is_matchable",
                "created_at",
            ],
        );
        for u in users {
            shared::csv::write_row(
                &mut doc,
                &[
                    u.id.to_string(),
                    u.name.clone(),
                    u.gender.clone().unwrap_or_default(),
                    u.wechat_id.clone(),
                    u.nfc_uid.clone().unwrap_or_default(),
                    domain::models::UserStatus::from(u.status).to_string(),
                    u.is_matchable.to_string(),
                    u.created_at.to_rfc3339(),
                ],
            );
        }
        doc.push('\n');
    }

    if kind.includes_matches() {
        shared::csv::write_header(
            &mut doc,
            &["id", "user1_id", "user1_name", "user2_id", "user2_name", "matched_at"],
        );
        for m in matches {
            shared::csv::write_row(
                &mut doc,
                &[
                    m.id.to_string(),
                    m.user1_id.to_string(),
                    m.user1_name.clone().unwrap_or_default(),
                    m.user2_id.to_string(),
                    m.user2_name.clone().unwrap_or_default(),
                    m.matched_at.to_rfc3339(),
                ],
            );
        }
        doc.push('\n');
    }

    if kind.includes_bracelets() {
        shared::csv::write_header(&mut doc, &["uid", "status", "created_at"]);
        for b in bracelets {
            shared::csv::write_row(
                &mut doc,
                &[
                    b.nfc_uid.clone(),
                    domain::models::BraceletStatus::from(b.status).to_string(),
                    b.created_at.to_rfc3339(),
                ],
            );
        }
    }

    doc.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::entities::BraceletStatusDb;

    fn sample_bracelet() -> BraceletEntity {
        BraceletEntity {
            nfc_uid: "prod-A1B2C3D4".to_string(),
            status: BraceletStatusDb::Available,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_export_csv_starts_with_bom() {
        let csv = export_csv(ExportKind::Bracelets, &[], &[], &[sample_bracelet()]);
        assert_eq!(&csv[..3], &[0xEF, 0xBB, 0xBF]);
    }

    #[test]
    fn test_export_csv_bracelets_only() {
        let csv = export_csv(ExportKind::Bracelets, &[], &[], &[sample_bracelet()]);
        let text = String::from_utf8(csv).unwrap();
        assert!(text.contains("uid,status,created_at"));
        assert!(text.contains("prod-A1B2C3D4,available"));
        assert!(!text.contains("wechat_id"));
    }

    #[test]
    fn test_export_json_sections_follow_kind() {
        let body = export_json(ExportKind::Bracelets, &[], &[], &[sample_bracelet()]).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc.get("bracelets").is_some());
        assert!(doc.get("users").is_none());
        assert!(doc.get("matches").is_none());
        assert_eq!(doc.get("type").unwrap(), "bracelets");
    }

    #[test]
    fn test_export_json_all_sections() {
        let body = export_json(ExportKind::All, &[], &[], &[]).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc.get("users").is_some());
        assert!(doc.get("matches").is_some());
        assert!(doc.get("bracelets").is_some());
    }
}
