//! Attendee entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{User, UserStatus};
use sqlx::FromRow;

/// Account status as stored in the `users.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum UserStatusDb {
    Active,
    Inactive,
}

impl From<UserStatusDb> for UserStatus {
    fn from(db_status: UserStatusDb) -> Self {
        match db_status {
            UserStatusDb::Active => UserStatus::Active,
            UserStatusDb::Inactive => UserStatus::Inactive,
        }
    }
}

impl From<UserStatus> for UserStatusDb {
    fn from(status: UserStatus) -> Self {
        match status {
            UserStatus::Active => UserStatusDb::Active,
            UserStatus::Inactive => UserStatusDb::Inactive,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub nfc_uid: Option<String>,
    pub name: String,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub wechat_id: String,
    pub mbti: Option<String>,
    pub favorite_song: Option<String>,
    pub bio: Option<String>,
    pub status: UserStatusDb,
    pub is_matchable: bool,
    pub last_fortune_at: Option<DateTime<Utc>>,
    pub last_fortune_message: Option<String>,
    pub last_matched_as_target_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            bracelet_uid: entity.nfc_uid,
            name: entity.name,
            gender: entity.gender,
            birthdate: entity.birthdate,
            wechat_id: entity.wechat_id,
            mbti: entity.mbti,
            favorite_song: entity.favorite_song,
            bio: entity.bio,
            status: entity.status.into(),
            is_matchable: entity.is_matchable,
            last_fortune_at: entity.last_fortune_at,
            last_fortune_message: entity.last_fortune_message,
            last_matched_as_target_at: entity.last_matched_as_target_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
