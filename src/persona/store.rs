// src/persona/store.rs
// SQLite persistence for personas, traits and conversation samples

use sqlx::SqlitePool;
use tracing::debug;

use super::types::{ConversationSample, NewSample, PersonaMetadata, PersonaRecord};

#[derive(Clone)]
pub struct PersonaStore {
    pool: SqlitePool,
}

impl PersonaStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the persona, its trait and every sample in a single transaction.
    pub async fn create_with_samples(
        &self,
        user_id: i64,
        metadata: &PersonaMetadata,
        trait_text: Option<&str>,
        samples: &[NewSample],
    ) -> Result<PersonaRecord, sqlx::Error> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let persona_id = sqlx::query(
            r#"
            INSERT INTO personas (user_id, name, phone_number, relationship, memo, is_deleted, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&metadata.name)
        .bind(&metadata.phone_number)
        .bind(&metadata.relationship)
        .bind(&metadata.memo)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        if let Some(content) = trait_text {
            sqlx::query(
                r#"
                INSERT INTO persona_traits (persona_id, content, created_at, updated_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(persona_id) DO UPDATE SET content = excluded.content, updated_at = excluded.updated_at
                "#,
            )
            .bind(persona_id)
            .bind(content)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        for sample in samples {
            sqlx::query(
                "INSERT INTO conversation_samples (persona_id, role, message, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(persona_id)
            .bind(sample.role.as_str())
            .bind(&sample.message)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let record = sqlx::query_as::<_, PersonaRecord>("SELECT * FROM personas WHERE id = ?")
            .bind(persona_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            persona_id,
            samples = samples.len(),
            has_trait = trait_text.is_some(),
            "Persona rows committed"
        );
        Ok(record)
    }

    /// Live (not soft-deleted) persona owned by `user_id`
    pub async fn find_owned(
        &self,
        user_id: i64,
        persona_id: i64,
    ) -> Result<Option<PersonaRecord>, sqlx::Error> {
        sqlx::query_as::<_, PersonaRecord>(
            "SELECT * FROM personas WHERE id = ? AND user_id = ? AND is_deleted = 0",
        )
        .bind(persona_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_owned(&self, user_id: i64) -> Result<Vec<PersonaRecord>, sqlx::Error> {
        sqlx::query_as::<_, PersonaRecord>(
            "SELECT * FROM personas WHERE user_id = ? AND is_deleted = 0 ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update(
        &self,
        persona_id: i64,
        metadata: &PersonaMetadata,
    ) -> Result<PersonaRecord, sqlx::Error> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            UPDATE personas
            SET name = ?, phone_number = ?, relationship = ?, memo = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&metadata.name)
        .bind(&metadata.phone_number)
        .bind(&metadata.relationship)
        .bind(&metadata.memo)
        .bind(now)
        .bind(persona_id)
        .execute(&self.pool)
        .await?;

        sqlx::query_as::<_, PersonaRecord>("SELECT * FROM personas WHERE id = ?")
            .bind(persona_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Returns false when nothing matched (not owned or already deleted).
    pub async fn soft_delete(&self, user_id: i64, persona_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE personas SET is_deleted = 1, updated_at = ? WHERE id = ? AND user_id = ? AND is_deleted = 0",
        )
        .bind(chrono::Utc::now().timestamp())
        .bind(persona_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_trait(&self, persona_id: i64) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT content FROM persona_traits WHERE persona_id = ?")
                .bind(persona_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| r.0))
    }

    pub async fn count_samples(&self, persona_id: i64) -> Result<i64, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM conversation_samples WHERE persona_id = ?")
                .bind(persona_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    pub async fn list_samples(&self, persona_id: i64) -> Result<Vec<ConversationSample>, sqlx::Error> {
        sqlx::query_as::<_, ConversationSample>(
            "SELECT * FROM conversation_samples WHERE persona_id = ? ORDER BY id ASC",
        )
        .bind(persona_id)
        .fetch_all(&self.pool)
        .await
    }

    /// The `limit` most recent samples, returned oldest first.
    pub async fn recent_samples(
        &self,
        persona_id: i64,
        limit: usize,
    ) -> Result<Vec<ConversationSample>, sqlx::Error> {
        sqlx::query_as::<_, ConversationSample>(
            r#"
            SELECT * FROM (
                SELECT * FROM conversation_samples WHERE persona_id = ? ORDER BY id DESC LIMIT ?
            ) ORDER BY id ASC
            "#,
        )
        .bind(persona_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
    }
}
