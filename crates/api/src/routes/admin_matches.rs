//! Admin match history routes.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use persistence::entities::MatchWithUsersEntity;
use persistence::repositories::MatchRepository;
use serde::Serialize;
use shared::pagination::{PageParams, Paginated};

use crate::app::AppState;
use crate::error::ApiError;

/// One row of the admin match listing: the pair plus both profiles' display
/// fields. Names are `None` when a side was deleted after the match.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListItem {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub matched_at: DateTime<Utc>,
    pub user1_name: Option<String>,
    pub user1_wechat_id: Option<String>,
    pub user2_name: Option<String>,
    pub user2_wechat_id: Option<String>,
}

impl From<MatchWithUsersEntity> for MatchListItem {
    fn from(row: MatchWithUsersEntity) -> Self {
        Self {
            id: row.id,
            user1_id: row.user1_id,
            user2_id: row.user2_id,
            matched_at: row.matched_at,
            user1_name: row.user1_name,
            user1_wechat_id: row.user1_wechat_id,
            user2_name: row.user2_name,
            user2_wechat_id: row.user2_wechat_id,
        }
    }
}

/// GET /api/admin/matches
pub async fn list_matches(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<MatchListItem>>, ApiError> {
    let matches = MatchRepository::new(state.pool.clone());
    let (rows, total) = matches.list(&params).await?;
    let items: Vec<MatchListItem> = rows.into_iter().map(Into::into).collect();
    Ok(Json(Paginated::new(items, total, &params)))
}
