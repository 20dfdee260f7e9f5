// src/chat/types.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::session::SessionStatus;

#[derive(Debug, Clone, FromRow)]
pub struct ChatSessionRecord {
    pub id: i64,
    pub user_id: i64,
    pub persona_id: i64,
    pub status: String,
    pub system_prompt: String,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ChatSessionRecord {
    pub fn session_status(&self) -> SessionStatus {
        SessionStatus::parse(&self.status).unwrap_or(SessionStatus::Ended)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageRecord {
    pub id: i64,
    pub user_id: i64,
    pub persona_id: i64,
    pub session_id: i64,
    pub content: String,
    pub is_from_user: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: i64,
    pub persona_id: i64,
    pub persona_name: String,
    pub status: SessionStatus,
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
}

impl SessionResponse {
    pub fn from_record(record: &ChatSessionRecord, persona_name: String) -> Self {
        let duration_seconds = match (record.started_at, record.ended_at) {
            (Some(start), Some(end)) => Some((end - start).max(0)),
            _ => None,
        };

        Self {
            session_id: record.id,
            persona_id: record.persona_id,
            persona_name,
            status: record.session_status(),
            started_at: record.started_at,
            ended_at: record.ended_at,
            duration_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: i64,
    pub persona_id: i64,
    pub persona_name: String,
    pub status: SessionStatus,
    pub last_message: String,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message_id: i64,
    pub content: String,
    /// "USER" or "ASSISTANT"
    pub role: String,
    pub is_from_user: bool,
    pub created_at: i64,
}

impl From<ChatMessageRecord> for MessageResponse {
    fn from(record: ChatMessageRecord) -> Self {
        Self {
            message_id: record.id,
            role: if record.is_from_user { "USER" } else { "ASSISTANT" }.to_string(),
            is_from_user: record.is_from_user,
            content: record.content,
            created_at: record.created_at,
        }
    }
}
