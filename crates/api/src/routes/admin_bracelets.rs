//! Admin bracelet registry routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use domain::models::BraceletStatus;
use persistence::entities::BraceletWithUserEntity;
use persistence::repositories::{BraceletRepository, UserRepository};
use serde::{Deserialize, Serialize};
use shared::pagination::{PageParams, Paginated};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Upper bound on one seeding batch.
const MAX_SEED_COUNT: u32 = 1000;

/// One row of the admin bracelet listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BraceletListItem {
    pub uid: String,
    pub status: BraceletStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_user: Option<BoundUser>,
}

/// The attendee currently bound to a bracelet.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundUser {
    pub name: String,
    pub wechat_id: String,
    pub status: String,
}

impl From<BraceletWithUserEntity> for BraceletListItem {
    fn from(row: BraceletWithUserEntity) -> Self {
        let bound_user = match (row.user_name, row.user_wechat_id, row.user_status) {
            (Some(name), Some(wechat_id), Some(status)) => Some(BoundUser {
                name,
                wechat_id,
                status: domain::models::UserStatus::from(status).to_string(),
            }),
            _ => None,
        };
        Self {
            uid: row.nfc_uid,
            status: row.status.into(),
            created_at: row.created_at,
            bound_user,
        }
    }
}

/// Body for bulk pre-seeding.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeedRequest {
    #[validate(length(max = 16, message = "Prefix must be at most 16 characters"))]
    #[serde(default)]
    pub prefix: String,
    pub count: u32,
}

/// Seeding result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub requested: u32,
    pub inserted: i64,
    pub uids: Vec<String>,
}

/// Body for the status update.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: BraceletStatus,
}

/// Deletion confirmation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// GET /api/admin/bracelets
pub async fn list_bracelets(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<BraceletListItem>>, ApiError> {
    let bracelets = BraceletRepository::new(state.pool.clone());
    let (rows, total) = bracelets.list(&params).await?;
    let items: Vec<BraceletListItem> = rows.into_iter().map(Into::into).collect();
    Ok(Json(Paginated::new(items, total, &params)))
}

/// POST /api/admin/bracelets
///
/// Generates `count` fresh uids with the given prefix and inserts them as
/// `available`. Collisions with existing uids are skipped, so `inserted`
/// can be lower than `requested`.
pub async fn seed_bracelets(
    State(state): State<AppState>,
    Json(request): Json<SeedRequest>,
) -> Result<Json<SeedResponse>, ApiError> {
    request.validate()?;
    if request.count == 0 || request.count > MAX_SEED_COUNT {
        return Err(ApiError::Validation(format!(
            "count must be between 1 and {}",
            MAX_SEED_COUNT
        )));
    }

    let uids: Vec<String> = (0..request.count)
        .map(|_| shared::crypto::generate_bracelet_uid(&request.prefix))
        .collect();

    let bracelets = BraceletRepository::new(state.pool.clone());
    let inserted = bracelets.create_batch(&uids).await?;
    info!(requested = request.count, inserted, "bracelets seeded");

    Ok(Json(SeedResponse {
        requested: request.count,
        inserted,
        uids,
    }))
}

/// PUT /api/admin/bracelets/:uid
///
/// Retiring a bracelet (`inactive`) also unbinds any user referencing it.
pub async fn set_bracelet_status(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<BraceletListItem>, ApiError> {
    let bracelets = BraceletRepository::new(state.pool.clone());
    let updated = bracelets.update_status(&uid, request.status).await?;
    info!(uid = %uid, status = %request.status, "bracelet status updated");

    Ok(Json(BraceletListItem {
        uid: updated.nfc_uid,
        status: updated.status.into(),
        created_at: updated.created_at,
        bound_user: None,
    }))
}

/// DELETE /api/admin/bracelets/:uid
///
/// Refused while an attendee still references the uid.
pub async fn delete_bracelet(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    if users.find_active_by_bracelet(&uid).await?.is_some() {
        return Err(ApiError::Conflict(
            "Bracelet is still bound to a user".into(),
        ));
    }

    let bracelets = BraceletRepository::new(state.pool.clone());
    bracelets.delete(&uid).await?;
    info!(uid = %uid, "bracelet deleted");
    Ok(Json(DeleteResponse { deleted: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::entities::{BraceletStatusDb, UserStatusDb};

    #[test]
    fn test_list_item_with_bound_user() {
        let row = BraceletWithUserEntity {
            nfc_uid: "prod-A1B2C3D4".to_string(),
            status: BraceletStatusDb::Active,
            created_at: Utc::now(),
            user_name: Some("张三".to_string()),
            user_wechat_id: Some("wxid_zhangsan".to_string()),
            user_status: Some(UserStatusDb::Active),
        };
        let item: BraceletListItem = row.into();
        assert_eq!(item.status, BraceletStatus::Active);
        let bound = item.bound_user.expect("bound user expected");
        assert_eq!(bound.name, "张三");
        assert_eq!(bound.status, "active");
    }

    #[test]
    fn test_list_item_unbound() {
        let row = BraceletWithUserEntity {
            nfc_uid: "prod-E5F6G7H8".to_string(),
            status: BraceletStatusDb::Available,
            created_at: Utc::now(),
            user_name: None,
            user_wechat_id: None,
            user_status: None,
        };
        let item: BraceletListItem = row.into();
        assert!(item.bound_user.is_none());
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("boundUser").is_none());
    }

    #[test]
    fn test_seed_request_defaults_prefix() {
        let request: SeedRequest = serde_json::from_str(r#"{"count": 10}"#).unwrap();
        assert_eq!(request.prefix, "");
        assert_eq!(request.count, 10);
    }

    #[test]
    fn test_set_status_request_parses() {
        let request: SetStatusRequest =
            serde_json::from_str(r#"{"status": "inactive"}"#).unwrap();
        assert_eq!(request.status, BraceletStatus::Inactive);
    }
}
