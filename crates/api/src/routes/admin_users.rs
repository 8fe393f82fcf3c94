//! Admin user management routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{UpdateUserRequest, User};
use persistence::repositories::UserRepository;
use serde::Serialize;
use shared::pagination::{PageParams, Paginated};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Deletion confirmation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// GET /api/admin/users
///
/// Paginated profile list, newest first.
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<User>>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let (rows, total) = users.list(&params).await?;
    let items: Vec<User> = rows.into_iter().map(Into::into).collect();
    Ok(Json(Paginated::new(items, total, &params)))
}

/// PUT /api/admin/users/:id
///
/// Partial update; absent fields keep their value.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    request.validate()?;

    let users = UserRepository::new(state.pool.clone());
    let updated = users.update(id, &request).await?;
    info!(user_id = id, "user updated by admin");
    Ok(Json(updated.into()))
}

/// DELETE /api/admin/users/:id
///
/// Removes the profile, its match history, and frees the bracelet.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    users.delete_cascade(id).await?;
    info!(user_id = id, "user deleted by admin");
    Ok(Json(DeleteResponse { deleted: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_response_shape() {
        let json = serde_json::to_value(DeleteResponse { deleted: true }).unwrap();
        assert_eq!(json.get("deleted").unwrap(), true);
    }
}
