// src/chat/store.rs

use sqlx::{FromRow, SqlitePool};

use super::session::SessionStatus;
use super::types::{ChatMessageRecord, ChatSessionRecord};

#[derive(Debug, Clone, FromRow)]
pub struct SessionWithPersona {
    #[sqlx(flatten)]
    pub session: ChatSessionRecord,
    pub persona_name: String,
}

const SESSION_SELECT: &str = r#"
    SELECT s.id, s.user_id, s.persona_id, s.status, s.system_prompt, s.started_at, s.ended_at,
           s.created_at, s.updated_at, p.name AS persona_name
    FROM chat_sessions s
    JOIN personas p ON p.id = s.persona_id
"#;

#[derive(Clone)]
pub struct ChatStore {
    pool: SqlitePool,
}

impl ChatStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn active_exists(&self, user_id: i64, persona_id: i64) -> Result<bool, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM chat_sessions WHERE user_id = ? AND persona_id = ? AND status = ?",
        )
        .bind(user_id)
        .bind(persona_id)
        .bind(SessionStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Insert a session in `INIT` and move it to `next` in the same transaction.
    pub async fn create_session(
        &self,
        user_id: i64,
        persona_id: i64,
        system_prompt: &str,
        next: SessionStatus,
    ) -> Result<i64, sqlx::Error> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let session_id = sqlx::query(
            r#"
            INSERT INTO chat_sessions (user_id, persona_id, status, system_prompt, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(persona_id)
        .bind(SessionStatus::Init.as_str())
        .bind(system_prompt)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("UPDATE chat_sessions SET status = ?, started_at = ?, updated_at = ? WHERE id = ?")
            .bind(next.as_str())
            .bind(now)
            .bind(now)
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(session_id)
    }

    pub async fn find_owned(
        &self,
        user_id: i64,
        session_id: i64,
    ) -> Result<Option<SessionWithPersona>, sqlx::Error> {
        let sql = format!("{} WHERE s.id = ? AND s.user_id = ?", SESSION_SELECT);
        sqlx::query_as::<_, SessionWithPersona>(&sql)
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<SessionWithPersona>, sqlx::Error> {
        let sql = format!(
            "{} WHERE s.user_id = ? ORDER BY s.updated_at DESC, s.id DESC",
            SESSION_SELECT
        );
        sqlx::query_as::<_, SessionWithPersona>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn finish_session(
        &self,
        session_id: i64,
        next: SessionStatus,
        ended_at: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chat_sessions SET status = ?, ended_at = ?, updated_at = ? WHERE id = ?")
            .bind(next.as_str())
            .bind(ended_at)
            .bind(ended_at)
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store one chat message and bump the session's `updated_at`.
    pub async fn insert_message(
        &self,
        session: &ChatSessionRecord,
        content: &str,
        is_from_user: bool,
    ) -> Result<ChatMessageRecord, sqlx::Error> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let message_id = sqlx::query(
            r#"
            INSERT INTO chat_messages (user_id, persona_id, session_id, content, is_from_user, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session.user_id)
        .bind(session.persona_id)
        .bind(session.id)
        .bind(content)
        .bind(is_from_user)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(session.id)
            .execute(&mut *tx)
            .await?;

        let record = sqlx::query_as::<_, ChatMessageRecord>("SELECT * FROM chat_messages WHERE id = ?")
            .bind(message_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Up to `limit` messages of the (user, persona) pair older than `before_id`,
    /// oldest first.
    pub async fn history_before(
        &self,
        user_id: i64,
        persona_id: i64,
        before_id: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessageRecord>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessageRecord>(
            r#"
            SELECT * FROM (
                SELECT * FROM chat_messages
                WHERE user_id = ? AND persona_id = ? AND id < ?
                ORDER BY id DESC LIMIT ?
            ) ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .bind(persona_id)
        .bind(before_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_messages(
        &self,
        user_id: i64,
        persona_id: i64,
    ) -> Result<Vec<ChatMessageRecord>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessageRecord>(
            "SELECT * FROM chat_messages WHERE user_id = ? AND persona_id = ? ORDER BY id ASC",
        )
        .bind(user_id)
        .bind(persona_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn last_message(
        &self,
        user_id: i64,
        persona_id: i64,
    ) -> Result<Option<ChatMessageRecord>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessageRecord>(
            "SELECT * FROM chat_messages WHERE user_id = ? AND persona_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(persona_id)
        .fetch_optional(&self.pool)
        .await
    }
}
