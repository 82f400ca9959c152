use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ddup_core::error::AppError;
use ddup_core::result::AppResult;
use ddup_core::types::{SessionId, UserId};
use ddup_entity::session::{NewSession, Session};

use super::{MemoryStore, Tables};
use crate::store::SessionStore;

impl Tables {
    fn invalidate_user_sessions(&mut self, user_id: UserId, now: DateTime<Utc>) {
        for session in self
            .sessions
            .values_mut()
            .filter(|s| s.user_id == user_id && s.valid)
        {
            session.valid = false;
            session.invalidated_at = Some(now);
        }
    }

    fn swap_in(&mut self, new: NewSession) -> AppResult<Session> {
        if !self.users.contains_key(&new.user_id) {
            return Err(AppError::not_found(format!("User {} not found", new.user_id)));
        }

        let now = Utc::now();
        self.invalidate_user_sessions(new.user_id, now);

        let session = Session {
            id: self.next_session_id(),
            user_id: new.user_id,
            token_hash: new.token_hash,
            valid: true,
            expires_at: new.expires_at,
            created_at: now,
            invalidated_at: None,
        };
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn replace_for_user(&self, session: NewSession) -> AppResult<Session> {
        self.tables.lock().await.swap_in(session)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        Ok(self
            .tables
            .lock()
            .await
            .sessions
            .values()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn invalidate_by_token_hash(&self, token_hash: &str) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables
            .sessions
            .values_mut()
            .find(|s| s.token_hash == token_hash && s.valid)
        {
            Some(session) => {
                session.valid = false;
                session.invalidated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn invalidate(&self, id: SessionId) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables.sessions.get_mut(&id).filter(|s| s.valid) {
            Some(session) => {
                session.valid = false;
                session.invalidated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn rotate(
        &self,
        old_token_hash: &str,
        session: NewSession,
    ) -> AppResult<Option<Session>> {
        let mut tables = self.tables.lock().await;
        let current = tables
            .sessions
            .values()
            .any(|s| s.token_hash == old_token_hash && s.valid && s.user_id == session.user_id);
        if !current {
            return Ok(None);
        }
        tables.swap_in(session).map(Some)
    }

    async fn purge_stale(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.lock().await;
        let initial = tables.sessions.len();
        tables.sessions.retain(|_, s| {
            let lapsed = s.expires_at < before;
            let invalidated = !s.valid && s.invalidated_at.unwrap_or(s.created_at) < before;
            !(lapsed || invalidated)
        });
        Ok((initial - tables.sessions.len()) as u64)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
