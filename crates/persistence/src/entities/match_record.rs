//! Match entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{MatchCandidate, MatchRecord};
use sqlx::FromRow;

/// Database row mapping for the matches table.
#[derive(Debug, Clone, FromRow)]
pub struct MatchRecordEntity {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub matched_at: DateTime<Utc>,
}

impl From<MatchRecordEntity> for MatchRecord {
    fn from(entity: MatchRecordEntity) -> Self {
        Self {
            id: entity.id,
            user1_id: entity.user1_id,
            user2_id: entity.user2_id,
            matched_at: entity.matched_at,
        }
    }
}

/// Row from the admin listing join: a match plus both attendee profiles.
#[derive(Debug, Clone, FromRow)]
pub struct MatchWithUsersEntity {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub matched_at: DateTime<Utc>,
    pub user1_name: Option<String>,
    pub user1_wechat_id: Option<String>,
    pub user2_name: Option<String>,
    pub user2_wechat_id: Option<String>,
}

/// Profile columns selected for recommendation candidates.
#[derive(Debug, Clone, FromRow)]
pub struct MatchCandidateEntity {
    pub id: i64,
    pub name: String,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub wechat_id: String,
    pub mbti: Option<String>,
    pub favorite_song: Option<String>,
    pub bio: Option<String>,
}

impl From<MatchCandidateEntity> for MatchCandidate {
    fn from(entity: MatchCandidateEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            gender: entity.gender,
            birthdate: entity.birthdate,
            wechat_id: entity.wechat_id,
            mbti: entity.mbti,
            favorite_song: entity.favorite_song,
            bio: entity.bio,
        }
    }
}
