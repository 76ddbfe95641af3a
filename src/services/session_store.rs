//! Persisted session state: who is signed in, and their avatar choice.
//!
//! The session lives in a single-row table. Avatars are keyed per user so
//! switching accounts on one device keeps each user's selection.

use crate::models::user::{Avatar, Session};
use crate::services::mirror_store::StoreResult;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct SessionStore {
    db: Arc<SqlitePool>,
}

impl SessionStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Persist the signed-in user, replacing any previous session.
    pub async fn save_session(&self, session: &Session) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO session (slot, user_id, email, logged_in_at) VALUES (1, ?, ?, ?) \
             ON CONFLICT(slot) DO UPDATE SET \
                user_id = excluded.user_id, \
                email = excluded.email, \
                logged_in_at = excluded.logged_in_at",
        )
        .bind(&session.user_id)
        .bind(&session.email)
        .bind(Utc::now())
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    /// The current session, or `None` when nobody is signed in.
    pub async fn load_session(&self) -> StoreResult<Option<Session>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT user_id, email FROM session WHERE slot = 1")
                .fetch_optional(&*self.db)
                .await?;
        Ok(row.map(|(user_id, email)| Session { user_id, email }))
    }

    /// Forget the session (logout).
    pub async fn clear_session(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM session").execute(&*self.db).await?;
        Ok(())
    }

    /// Remember `avatar` for `user_id`.
    pub async fn set_avatar(&self, user_id: &str, avatar: Avatar) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO avatars (user_id, avatar) VALUES (?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET avatar = excluded.avatar",
        )
        .bind(user_id)
        .bind(avatar.id())
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    /// The avatar stored for `user_id`, falling back to the default when
    /// none was chosen or the stored id is from a legacy install.
    pub async fn avatar_for(&self, user_id: &str) -> StoreResult<Avatar> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT avatar FROM avatars WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&*self.db)
                .await?;
        match row {
            Some((raw,)) => Ok(raw.parse().unwrap_or_else(|_| {
                warn!("stored avatar `{}` for user {} is unknown, using default", raw, user_id);
                Avatar::DEFAULT
            })),
            None => Ok(Avatar::DEFAULT),
        }
    }
}
