//! Bracelet repository for database operations.

use domain::models::BraceletStatus;
use shared::pagination::PageParams;
use sqlx::PgPool;

use crate::entities::{BraceletEntity, BraceletStatusDb, BraceletWithUserEntity};
use crate::error::StoreError;
use crate::metrics::QueryTimer;

/// Repository for bracelet registry operations.
#[derive(Clone)]
pub struct BraceletRepository {
    pool: PgPool,
}

impl BraceletRepository {
    /// Creates a new BraceletRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a bracelet by its NFC uid.
    pub async fn find_by_uid(&self, uid: &str) -> Result<Option<BraceletEntity>, StoreError> {
        let timer = QueryTimer::new("find_bracelet_by_uid");
        let result = sqlx::query_as::<_, BraceletEntity>(
            r#"
            SELECT nfc_uid, status, created_at
            FROM bracelets
            WHERE nfc_uid = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result.map_err(Into::into)
    }

    /// List bracelets with their bound user, newest first.
    ///
    /// The optional search term matches the uid or the bound user's name or
    /// wechat id, case-insensitively.
    pub async fn list(
        &self,
        params: &PageParams,
    ) -> Result<(Vec<BraceletWithUserEntity>, i64), StoreError> {
        let pattern = params.search_term().map(|term| format!("%{}%", term));
        let timer = QueryTimer::new("list_bracelets");

        let rows = sqlx::query_as::<_, BraceletWithUserEntity>(
            r#"
            SELECT b.nfc_uid, b.status, b.created_at,
                   u.name AS user_name, u.wechat_id AS user_wechat_id,
                   u.status AS user_status
            FROM bracelets b
            LEFT JOIN users u ON u.nfc_uid = b.nfc_uid
            WHERE ($3::text IS NULL
                   OR b.nfc_uid ILIKE $3
                   OR u.name ILIKE $3
                   OR u.wechat_id ILIKE $3)
            ORDER BY b.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(params.limit())
        .bind(params.offset())
        .bind(pattern.as_deref())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM bracelets b
            LEFT JOIN users u ON u.nfc_uid = b.nfc_uid
            WHERE ($1::text IS NULL
                   OR b.nfc_uid ILIKE $1
                   OR u.name ILIKE $1
                   OR u.wechat_id ILIKE $1)
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        timer.record();
        Ok((rows, total.0))
    }

    /// Insert a batch of freshly generated uids as available bracelets.
    ///
    /// Uids already present in the registry are skipped. Returns the number
    /// of rows actually inserted.
    pub async fn create_batch(&self, uids: &[String]) -> Result<i64, StoreError> {
        let timer = QueryTimer::new("create_bracelet_batch");
        let result = sqlx::query(
            r#"
            INSERT INTO bracelets (nfc_uid, status)
            SELECT unnest($1::text[]), 'available'
            ON CONFLICT (nfc_uid) DO NOTHING
            "#,
        )
        .bind(uids)
        .execute(&self.pool)
        .await;
        timer.record();
        let inserted = result?.rows_affected() as i64;
        tracing::info!(
            requested = uids.len(),
            inserted,
            "bracelet batch created"
        );
        Ok(inserted)
    }

    /// Set a bracelet's status. Retiring a bracelet also unbinds its user.
    pub async fn update_status(
        &self,
        uid: &str,
        status: BraceletStatus,
    ) -> Result<BraceletEntity, StoreError> {
        let timer = QueryTimer::new("update_bracelet_status");
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, BraceletEntity>(
            r#"
            UPDATE bracelets
            SET status = $2
            WHERE nfc_uid = $1
            RETURNING nfc_uid, status, created_at
            "#,
        )
        .bind(uid)
        .bind(BraceletStatusDb::from(status))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        if status == BraceletStatus::Inactive {
            sqlx::query("UPDATE users SET nfc_uid = NULL, updated_at = NOW() WHERE nfc_uid = $1")
                .bind(uid)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(updated)
    }

    /// Delete a bracelet. Fails with a foreign key violation while a user is
    /// still bound to it.
    pub async fn delete(&self, uid: &str) -> Result<(), StoreError> {
        let timer = QueryTimer::new("delete_bracelet");
        let result = sqlx::query("DELETE FROM bracelets WHERE nfc_uid = $1")
            .bind(uid)
            .execute(&self.pool)
            .await;
        timer.record();
        if result?.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// All bracelets for export, newest first.
    pub async fn export_all(&self) -> Result<Vec<BraceletEntity>, StoreError> {
        let timer = QueryTimer::new("export_bracelets");
        let result = sqlx::query_as::<_, BraceletEntity>(
            r#"
            SELECT nfc_uid, status, created_at
            FROM bracelets
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result.map_err(Into::into)
    }
}
