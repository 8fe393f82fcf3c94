//! Bracelet entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Bracelet, BraceletStatus};
use sqlx::FromRow;

use crate::entities::user::UserStatusDb;

/// Bracelet status as stored in the `bracelets.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum BraceletStatusDb {
    Available,
    Active,
    Inactive,
}

impl From<BraceletStatusDb> for BraceletStatus {
    fn from(db_status: BraceletStatusDb) -> Self {
        match db_status {
            BraceletStatusDb::Available => BraceletStatus::Available,
            BraceletStatusDb::Active => BraceletStatus::Active,
            BraceletStatusDb::Inactive => BraceletStatus::Inactive,
        }
    }
}

impl From<BraceletStatus> for BraceletStatusDb {
    fn from(status: BraceletStatus) -> Self {
        match status {
            BraceletStatus::Available => BraceletStatusDb::Available,
            BraceletStatus::Active => BraceletStatusDb::Active,
            BraceletStatus::Inactive => BraceletStatusDb::Inactive,
        }
    }
}

/// Database row mapping for the bracelets table.
#[derive(Debug, Clone, FromRow)]
pub struct BraceletEntity {
    pub nfc_uid: String,
    pub status: BraceletStatusDb,
    pub created_at: DateTime<Utc>,
}

impl From<BraceletEntity> for Bracelet {
    fn from(entity: BraceletEntity) -> Self {
        Self {
            uid: entity.nfc_uid,
            status: entity.status.into(),
            created_at: entity.created_at,
        }
    }
}

/// Row from the admin listing join: a bracelet plus its bound user, if any.
#[derive(Debug, Clone, FromRow)]
pub struct BraceletWithUserEntity {
    pub nfc_uid: String,
    pub status: BraceletStatusDb,
    pub created_at: DateTime<Utc>,
    pub user_name: Option<String>,
    pub user_wechat_id: Option<String>,
    pub user_status: Option<UserStatusDb>,
}
