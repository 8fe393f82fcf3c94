//! Match repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::canonical_pair;
use shared::pagination::PageParams;
use sqlx::PgPool;

use crate::entities::{MatchCandidateEntity, MatchWithUsersEntity};
use crate::error::StoreError;
use crate::metrics::QueryTimer;

const MATCH_JOIN_COLUMNS: &str = "m.id, m.user1_id, m.user2_id, m.matched_at, \
     u1.name AS user1_name, u1.wechat_id AS user1_wechat_id, \
     u2.name AS user2_name, u2.wechat_id AS user2_wechat_id";

/// Repository for match-related database operations.
#[derive(Clone)]
pub struct MatchRepository {
    pool: PgPool,
}

impl MatchRepository {
    /// Creates a new MatchRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pick today's recommendation for a user.
    ///
    /// Candidates must be active and matchable, must not have been paired
    /// with the seeker inside the cooldown window, and must not already have
    /// been somebody's recommendation today. Among those, a different gender
    /// ranks first and ties break randomly.
    pub async fn find_candidate(
        &self,
        user_id: i64,
        gender: Option<&str>,
        cooldown_start: DateTime<Utc>,
        day_start: DateTime<Utc>,
    ) -> Result<Option<MatchCandidateEntity>, StoreError> {
        let timer = QueryTimer::new("find_match_candidate");
        let result = sqlx::query_as::<_, MatchCandidateEntity>(
            r#"
            SELECT u.id, u.name, u.gender, u.birthdate, u.wechat_id, u.mbti,
                   u.favorite_song, u.bio
            FROM users u
            WHERE u.status = 'active'
              AND u.is_matchable = true
              AND u.id != $1
              AND NOT EXISTS (
                  SELECT 1 FROM matches m
                  WHERE m.matched_at > $3
                    AND ((m.user1_id = $1 AND m.user2_id = u.id)
                      OR (m.user1_id = u.id AND m.user2_id = $1))
              )
              AND (u.last_matched_as_target_at IS NULL
                   OR u.last_matched_as_target_at < $4)
            ORDER BY CASE WHEN u.gender IS DISTINCT FROM $2 THEN 1 ELSE 2 END, RANDOM()
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(gender)
        .bind(cooldown_start)
        .bind(day_start)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result.map_err(Into::into)
    }

    /// Record a pairing and stamp the target's daily recommendation slot.
    ///
    /// The pair is stored with the smaller id first; pairing the same two
    /// people again refreshes `matched_at` on the existing row.
    pub async fn record(
        &self,
        seeker_id: i64,
        target_id: i64,
        matched_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let (user1_id, user2_id) = canonical_pair(seeker_id, target_id);
        let timer = QueryTimer::new("record_match");
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO matches (user1_id, user2_id, matched_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user1_id, user2_id) DO UPDATE SET matched_at = EXCLUDED.matched_at
            "#,
        )
        .bind(user1_id)
        .bind(user2_id)
        .bind(matched_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET last_matched_as_target_at = $2 WHERE id = $1")
            .bind(target_id)
            .bind(matched_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    /// List matches with both attendee names, newest first.
    ///
    /// The optional search term matches either side's name or wechat id.
    pub async fn list(
        &self,
        params: &PageParams,
    ) -> Result<(Vec<MatchWithUsersEntity>, i64), StoreError> {
        let pattern = params.search_term().map(|term| format!("%{}%", term));
        let timer = QueryTimer::new("list_matches");

        let rows = sqlx::query_as::<_, MatchWithUsersEntity>(&format!(
            r#"
            SELECT {MATCH_JOIN_COLUMNS}
            FROM matches m
            LEFT JOIN users u1 ON u1.id = m.user1_id
            LEFT JOIN users u2 ON u2.id = m.user2_id
            WHERE ($3::text IS NULL
                   OR u1.name ILIKE $3 OR u1.wechat_id ILIKE $3
                   OR u2.name ILIKE $3 OR u2.wechat_id ILIKE $3)
            ORDER BY m.matched_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(params.limit())
        .bind(params.offset())
        .bind(pattern.as_deref())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM matches m
            LEFT JOIN users u1 ON u1.id = m.user1_id
            LEFT JOIN users u2 ON u2.id = m.user2_id
            WHERE ($1::text IS NULL
                   OR u1.name ILIKE $1 OR u1.wechat_id ILIKE $1
                   OR u2.name ILIKE $1 OR u2.wechat_id ILIKE $1)
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        timer.record();
        Ok((rows, total.0))
    }

    /// Most recent matches for the activity feed.
    pub async fn recent(&self, limit: i64) -> Result<Vec<MatchWithUsersEntity>, StoreError> {
        let timer = QueryTimer::new("recent_matches");
        let result = sqlx::query_as::<_, MatchWithUsersEntity>(&format!(
            r#"
            SELECT {MATCH_JOIN_COLUMNS}
            FROM matches m
            LEFT JOIN users u1 ON u1.id = m.user1_id
            LEFT JOIN users u2 ON u2.id = m.user2_id
            ORDER BY m.matched_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result.map_err(Into::into)
    }

    /// All matches for export, newest first.
    pub async fn export_all(&self) -> Result<Vec<MatchWithUsersEntity>, StoreError> {
        let timer = QueryTimer::new("export_matches");
        let result = sqlx::query_as::<_, MatchWithUsersEntity>(&format!(
            r#"
            SELECT {MATCH_JOIN_COLUMNS}
            FROM matches m
            LEFT JOIN users u1 ON u1.id = m.user1_id
            LEFT JOIN users u2 ON u2.id = m.user2_id
            ORDER BY m.matched_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result.map_err(Into::into)
    }
}
