//! Attendee repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{EventStats, RegisterRequest, UpdateUserRequest};
use shared::pagination::PageParams;
use sqlx::PgPool;

use crate::entities::{BraceletEntity, BraceletStatusDb, UserEntity, UserStatusDb};
use crate::error::StoreError;
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, nfc_uid, name, gender, birthdate, wechat_id, mbti, \
     favorite_song, bio, status, is_matchable, last_fortune_at, last_fortune_message, \
     last_matched_as_target_at, created_at, updated_at";

/// Result of a registration attempt.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// A new profile was created and the bracelet claimed.
    Created(UserEntity),
    /// An active profile already owns this bracelet.
    AlreadyRegistered(UserEntity),
    /// The uid is not in the registry.
    BraceletMissing,
    /// The bracelet was retired by an admin.
    BraceletUnavailable,
}

/// Repository for attendee-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, StoreError> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result.map_err(Into::into)
    }

    /// Find the active user bound to a bracelet.
    pub async fn find_active_by_bracelet(
        &self,
        uid: &str,
    ) -> Result<Option<UserEntity>, StoreError> {
        let timer = QueryTimer::new("find_active_user_by_bracelet");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE nfc_uid = $1 AND status = 'active'"
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result.map_err(Into::into)
    }

    /// Register a new attendee against a bracelet.
    ///
    /// The bracelet row is locked for the duration of the transaction so two
    /// taps of the same fresh bracelet cannot both claim it. A bracelet that
    /// was claimed before but has no bound user (the previous profile was
    /// deleted) can be claimed again.
    pub async fn register(&self, req: &RegisterRequest) -> Result<RegistrationOutcome, StoreError> {
        let timer = QueryTimer::new("register_user");
        let mut tx = self.pool.begin().await?;

        let bracelet = sqlx::query_as::<_, BraceletEntity>(
            "SELECT nfc_uid, status, created_at FROM bracelets WHERE nfc_uid = $1 FOR UPDATE",
        )
        .bind(&req.bracelet_uid)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(bracelet) = bracelet else {
            timer.record();
            return Ok(RegistrationOutcome::BraceletMissing);
        };

        match bracelet.status {
            BraceletStatusDb::Available => {}
            BraceletStatusDb::Active => {
                let existing = sqlx::query_as::<_, UserEntity>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE nfc_uid = $1 AND status = 'active'"
                ))
                .bind(&req.bracelet_uid)
                .fetch_optional(&mut *tx)
                .await?;

                if let Some(existing) = existing {
                    timer.record();
                    return Ok(RegistrationOutcome::AlreadyRegistered(existing));
                }
                // freed bracelet, claim it again
            }
            BraceletStatusDb::Inactive => {
                timer.record();
                return Ok(RegistrationOutcome::BraceletUnavailable);
            }
        }

        let created = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (nfc_uid, name, gender, birthdate, wechat_id, mbti,
                               favorite_song, bio, status, is_matchable)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, ''), 'active', $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&req.bracelet_uid)
        .bind(&req.name)
        .bind(&req.gender)
        .bind(req.birthdate)
        .bind(&req.wechat_id)
        .bind(req.mbti.as_deref())
        .bind(req.favorite_song.as_deref())
        .bind(req.bio.as_deref())
        .bind(req.is_matchable)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE bracelets SET status = 'active' WHERE nfc_uid = $1")
            .bind(&req.bracelet_uid)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        tracing::info!(user_id = created.id, uid = %created.nfc_uid.as_deref().unwrap_or(""), "user registered");
        Ok(RegistrationOutcome::Created(created))
    }

    /// List users, newest first.
    ///
    /// The optional search term matches name, wechat id, bracelet uid, or
    /// status, case-insensitively.
    pub async fn list(&self, params: &PageParams) -> Result<(Vec<UserEntity>, i64), StoreError> {
        let pattern = params.search_term().map(|term| format!("%{}%", term));
        let timer = QueryTimer::new("list_users");

        let rows = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE ($3::text IS NULL
                   OR name ILIKE $3
                   OR wechat_id ILIKE $3
                   OR nfc_uid ILIKE $3
                   OR status ILIKE $3)
            ORDER BY created_at DESC
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
            SELECT COUNT(*) FROM users
            WHERE ($1::text IS NULL
                   OR name ILIKE $1
                   OR wechat_id ILIKE $1
                   OR nfc_uid ILIKE $1
                   OR status ILIKE $1)
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        timer.record();
        Ok((rows, total.0))
    }

    /// Apply a partial update to a user. Absent fields keep their value.
    ///
    /// Rebinding to a different bracelet marks the new bracelet active; the
    /// old one keeps its status and becomes claimable again. A retired
    /// bracelet cannot be a rebind target.
    pub async fn update(
        &self,
        id: i64,
        req: &UpdateUserRequest,
    ) -> Result<UserEntity, StoreError> {
        let timer = QueryTimer::new("update_user");
        let mut tx = self.pool.begin().await?;

        if let Some(uid) = req.bracelet_uid.as_deref() {
            let target = sqlx::query_as::<_, BraceletEntity>(
                "SELECT nfc_uid, status, created_at FROM bracelets WHERE nfc_uid = $1 FOR UPDATE",
            )
            .bind(uid)
            .fetch_optional(&mut *tx)
            .await?;
            if matches!(target.map(|b| b.status), Some(BraceletStatusDb::Inactive)) {
                timer.record();
                return Err(StoreError::BraceletRetired);
            }
            // a missing uid falls through to the foreign key check below
        }

        let updated = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                gender = COALESCE($3, gender),
                birthdate = COALESCE($4, birthdate),
                wechat_id = COALESCE($5, wechat_id),
                nfc_uid = COALESCE($6, nfc_uid),
                mbti = COALESCE($7, mbti),
                favorite_song = COALESCE($8, favorite_song),
                bio = COALESCE($9, bio),
                status = COALESCE($10, status),
                is_matchable = COALESCE($11, is_matchable),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.name.as_deref())
        .bind(req.gender.as_deref())
        .bind(req.birthdate)
        .bind(req.wechat_id.as_deref())
        .bind(req.bracelet_uid.as_deref())
        .bind(req.mbti.as_deref())
        .bind(req.favorite_song.as_deref())
        .bind(req.bio.as_deref())
        .bind(req.status.map(UserStatusDb::from))
        .bind(req.is_matchable)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        if let Some(uid) = req.bracelet_uid.as_deref() {
            sqlx::query("UPDATE bracelets SET status = 'active' WHERE nfc_uid = $1")
                .bind(uid)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(updated)
    }

    /// Delete a user together with their match history, freeing the bracelet.
    pub async fn delete_cascade(&self, id: i64) -> Result<(), StoreError> {
        let timer = QueryTimer::new("delete_user_cascade");
        let mut tx = self.pool.begin().await?;

        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT nfc_uid FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((nfc_uid,)) = row else {
            timer.record();
            return Err(StoreError::NotFound);
        };

        sqlx::query("DELETE FROM matches WHERE user1_id = $1 OR user2_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(uid) = nfc_uid.as_deref() {
            sqlx::query("UPDATE bracelets SET status = 'active' WHERE nfc_uid = $1")
                .bind(uid)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    /// Store a freshly generated fortune on the user's profile.
    pub async fn persist_fortune(
        &self,
        id: i64,
        message: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let timer = QueryTimer::new("persist_fortune");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_fortune_message = $2, last_fortune_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(message)
        .bind(generated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        if result?.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Counters for the admin dashboard. `day_start` bounds "today" in event
    /// time.
    pub async fn event_stats(&self, day_start: DateTime<Utc>) -> Result<EventStats, StoreError> {
        let timer = QueryTimer::new("event_stats");

        let user_counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'active')
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let match_counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE matched_at >= $1)
            FROM matches
            "#,
        )
        .bind(day_start)
        .fetch_one(&self.pool)
        .await?;

        let bracelet_counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'active')
            FROM bracelets
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        timer.record();
        Ok(EventStats {
            total_users: user_counts.0,
            active_users: user_counts.1,
            total_matches: match_counts.0,
            today_matches: match_counts.1,
            total_bracelets: bracelet_counts.0,
            active_bracelets: bracelet_counts.1,
        })
    }

    /// Most recent registrations for the activity feed.
    pub async fn recent_registrations(&self, limit: i64) -> Result<Vec<UserEntity>, StoreError> {
        let timer = QueryTimer::new("recent_registrations");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result.map_err(Into::into)
    }

    /// All users for export, newest first.
    pub async fn export_all(&self) -> Result<Vec<UserEntity>, StoreError> {
        let timer = QueryTimer::new("export_users");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result.map_err(Into::into)
    }
}
