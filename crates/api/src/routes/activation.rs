//! Visitor-facing activation routes: bracelet validation, registration, and
//! the daily fortune fetch.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::RegisterRequest;
use persistence::repositories::{BraceletRepository, RegistrationOutcome, UserRepository};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::FortuneService;

/// Query string for uid-keyed lookups.
#[derive(Debug, Deserialize)]
pub struct UidQuery {
    pub uid: String,
}

/// Response for the pre-navigation bracelet probe.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
}

/// Response for the fortune fetch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FortuneResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Registration confirmation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
}

/// GET /api/bracelets/validate?uid=
///
/// Cheap probe the frontend runs before deciding which page to show.
pub async fn validate_bracelet(
    State(state): State<AppState>,
    Query(query): Query<UidQuery>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let uid = query.uid.trim();
    if uid.is_empty() {
        return Err(ApiError::Validation("uid is required".into()));
    }

    let bracelets = BraceletRepository::new(state.pool.clone());
    let users = UserRepository::new(state.pool.clone());

    if bracelets.find_by_uid(uid).await?.is_none() {
        return Err(ApiError::InvalidUid);
    }

    let bound = users.find_active_by_bracelet(uid).await?.is_some();
    Ok(Json(ValidateResponse {
        exists: bound,
        action: Some(if bound { "fortune" } else { "register" }),
    }))
}

/// GET /api/fortune?uid=
///
/// Returns the cached message, or generates a new one when today's 08:00
/// boundary has passed since the last generation.
pub async fn fetch_fortune(
    State(state): State<AppState>,
    Query(query): Query<UidQuery>,
) -> Result<Json<FortuneResponse>, ApiError> {
    let uid = query.uid.trim();
    if uid.is_empty() {
        return Err(ApiError::Validation("uid is required".into()));
    }

    let bracelets = BraceletRepository::new(state.pool.clone());
    let users = UserRepository::new(state.pool.clone());

    if bracelets.find_by_uid(uid).await?.is_none() {
        return Err(ApiError::InvalidUid);
    }

    let Some(user) = users.find_active_by_bracelet(uid).await? else {
        // Valid bracelet with nobody bound: send the visitor to the form
        return Ok(Json(FortuneResponse {
            action: Some("register"),
            message: Some("User not found. Please register first.".to_string()),
        }));
    };

    if FortuneService::needs_refresh(&user) {
        info!(user_id = user.id, "fortune refresh due");
        let fortune = FortuneService::new(state.pool.clone(), state.llm.clone());
        let message = fortune.generate(&user).await?;
        return Ok(Json(FortuneResponse {
            action: None,
            message: Some(message),
        }));
    }

    Ok(Json(FortuneResponse {
        action: None,
        message: user.last_fortune_message,
    }))
}

/// POST /api/register
///
/// One transaction: claim the bracelet, create the profile, mark the
/// bracelet active. The first fortune is generated on the first fetch, not
/// here, so a double-submit cannot trigger two generations.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let request = request.normalized();
    request.validate()?;
    if let Some(birthdate) = &request.birthdate {
        shared::validation::validate_birthdate(birthdate)
            .map_err(|e| ApiError::Validation(e.message.map(|m| m.to_string()).unwrap_or_default()))?;
    }

    let users = UserRepository::new(state.pool.clone());

    match users.register(&request).await? {
        RegistrationOutcome::Created(user) => {
            info!(user_id = user.id, uid = %request.bracelet_uid, "registration completed");
            Ok(Json(RegisterResponse {
                message: "注册成功！正在为您生成初始运势...".to_string(),
            }))
        }
        // Double-submit from the same bracelet: success, not an error
        RegistrationOutcome::AlreadyRegistered(user) => {
            info!(user_id = user.id, uid = %request.bracelet_uid, "duplicate registration, treated as success");
            Ok(Json(RegisterResponse {
                message: "您已经注册成功，正在跳转到运势页面...".to_string(),
            }))
        }
        RegistrationOutcome::BraceletMissing => Err(ApiError::InvalidUid),
        RegistrationOutcome::BraceletUnavailable => Err(ApiError::AlreadyBound),
    }
}
