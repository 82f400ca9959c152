//! Session ledger storage backed by PostgreSQL.
//!
//! Writers that change which session of a user is valid first lock that
//! user's row (`SELECT ... FOR UPDATE`), so two logins or a login and a
//! refresh for the same user run one after the other. The partial unique
//! index `idx_sessions_one_valid_per_user` rejects anything that slips past.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use ddup_core::error::AppError;
use ddup_core::result::AppResult;
use ddup_core::types::{SessionId, UserId};
use ddup_entity::session::{NewSession, Session};

use super::db_error;
use crate::store::SessionStore;

/// PostgreSQL session store.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a new session store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the user row for the rest of the transaction.
    async fn lock_user(tx: &mut Transaction<'_, Postgres>, user_id: UserId) -> AppResult<()> {
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(db_error("Failed to lock user row"))?;

        match locked {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(format!("User {user_id} not found"))),
        }
    }

    /// Invalidate every valid session of the user, then insert the new one.
    async fn swap_in(
        tx: &mut Transaction<'_, Postgres>,
        session: &NewSession,
    ) -> AppResult<Session> {
        sqlx::query(
            "UPDATE sessions SET valid = FALSE, invalidated_at = NOW() \
             WHERE user_id = $1 AND valid",
        )
        .bind(session.user_id)
        .execute(&mut **tx)
        .await
        .map_err(db_error("Failed to invalidate prior sessions"))?;

        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(session.user_id)
        .bind(&session.token_hash)
        .bind(session.expires_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error("Failed to insert session"))
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn replace_for_user(&self, session: NewSession) -> AppResult<Session> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin login transaction"))?;

        Self::lock_user(&mut tx, session.user_id).await?;
        let inserted = Self::swap_in(&mut tx, &session).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit login transaction"))?;
        Ok(inserted)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find session by token"))
    }

    async fn invalidate_by_token_hash(&self, token_hash: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET valid = FALSE, invalidated_at = NOW() \
             WHERE token_hash = $1 AND valid",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to invalidate session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn invalidate(&self, id: SessionId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET valid = FALSE, invalidated_at = NOW() WHERE id = $1 AND valid",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to invalidate session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn rotate(
        &self,
        old_token_hash: &str,
        session: NewSession,
    ) -> AppResult<Option<Session>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin refresh transaction"))?;

        let owner: Option<UserId> =
            sqlx::query_scalar("SELECT user_id FROM sessions WHERE token_hash = $1")
                .bind(old_token_hash)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to find session by token"))?;

        match owner {
            Some(user_id) if user_id == session.user_id => {}
            _ => return Ok(None),
        }

        Self::lock_user(&mut tx, session.user_id).await?;

        // A concurrent login may have superseded the row while we waited.
        let still_valid: Option<SessionId> =
            sqlx::query_scalar("SELECT id FROM sessions WHERE token_hash = $1 AND valid")
                .bind(old_token_hash)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to re-check session"))?;
        if still_valid.is_none() {
            return Ok(None);
        }

        let inserted = Self::swap_in(&mut tx, &session).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit refresh transaction"))?;
        Ok(Some(inserted))
    }

    async fn purge_stale(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM sessions \
             WHERE (NOT valid AND COALESCE(invalidated_at, created_at) < $1) \
                OR expires_at < $1",
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to purge stale sessions"))?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Storage ping failed"))?;
        Ok(())
    }
}
