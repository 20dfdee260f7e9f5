// src/chat/service.rs
// Chat session lifecycle and message exchange with the persona model

use std::sync::Arc;
use tracing::{error, info, warn};

use super::session::{SessionStatus, build_system_prompt};
use super::store::{ChatStore, SessionWithPersona};
use super::types::{MessageResponse, SessionResponse, SessionSummary};
use super::{ChatError, MAX_MESSAGE_CHARS};
use crate::config::persona::PersonaConfig;
use crate::llm::{HistoryTurn, TextGenerator};
use crate::persona::PersonaStore;

const NO_MESSAGES_YET: &str = "아직 대화가 없습니다.";
const OWN_MESSAGE_PREFIX: &str = "나: ";

fn validate_content(content: &str) -> Result<&str, ChatError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ChatError::InvalidMessage("Message content is required".to_string()));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ChatError::InvalidMessage(format!(
            "Message must be at most {} characters",
            MAX_MESSAGE_CHARS
        )));
    }
    Ok(content)
}

#[derive(Clone)]
pub struct ChatService {
    store: ChatStore,
    personas: PersonaStore,
    generator: Arc<dyn TextGenerator>,
    config: PersonaConfig,
}

impl ChatService {
    pub fn new(
        store: ChatStore,
        personas: PersonaStore,
        generator: Arc<dyn TextGenerator>,
        config: PersonaConfig,
    ) -> Self {
        Self {
            store,
            personas,
            generator,
            config,
        }
    }

    pub async fn create_session(
        &self,
        user_id: i64,
        persona_id: i64,
    ) -> Result<SessionResponse, ChatError> {
        let Some(persona) = self.personas.find_owned(user_id, persona_id).await? else {
            warn!(user_id, persona_id, "Session requested for unknown persona");
            return Err(ChatError::PersonaNotFound);
        };

        let sample_count = self.personas.count_samples(persona_id).await?;
        if sample_count == 0 && !persona.has_memo() {
            warn!(user_id, persona_id, "Persona has neither samples nor memo");
            return Err(ChatError::PersonaNotReady);
        }

        if self.store.active_exists(user_id, persona_id).await? {
            warn!(user_id, persona_id, "Active session already exists");
            return Err(ChatError::ActiveSessionExists);
        }

        let trait_text = self.personas.get_trait(persona_id).await?;
        let samples = self
            .personas
            .recent_samples(persona_id, self.config.chat_prompt_samples)
            .await?;
        let system_prompt = build_system_prompt(
            &persona.name,
            persona.memo.as_deref(),
            trait_text.as_deref(),
            &samples,
        );

        let next = SessionStatus::Init.start()?;
        let session_id = self
            .store
            .create_session(user_id, persona_id, &system_prompt, next)
            .await
            .map_err(|e| {
                // Lost a race with a concurrent create for the same persona
                let duplicate =
                    matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
                if duplicate {
                    ChatError::ActiveSessionExists
                } else {
                    ChatError::Database(e)
                }
            })?;

        info!(
            user_id,
            persona_id,
            session_id,
            prompt_chars = system_prompt.chars().count(),
            "Chat session started"
        );

        let created = self.load_session(user_id, session_id).await?;
        Ok(SessionResponse::from_record(&created.session, created.persona_name))
    }

    pub async fn list_sessions(&self, user_id: i64) -> Result<Vec<SessionSummary>, ChatError> {
        let sessions = self.store.list_by_user(user_id).await?;
        let mut summaries = Vec::with_capacity(sessions.len());

        for row in sessions {
            let last_message = self
                .store
                .last_message(user_id, row.session.persona_id)
                .await?
                .map(|m| {
                    if m.is_from_user {
                        format!("{}{}", OWN_MESSAGE_PREFIX, m.content)
                    } else {
                        m.content
                    }
                })
                .unwrap_or_else(|| NO_MESSAGES_YET.to_string());

            summaries.push(SessionSummary {
                session_id: row.session.id,
                persona_id: row.session.persona_id,
                persona_name: row.persona_name,
                status: row.session.session_status(),
                last_message,
                updated_at: row.session.updated_at,
            });
        }

        Ok(summaries)
    }

    pub async fn get_session(&self, user_id: i64, session_id: i64) -> Result<SessionResponse, ChatError> {
        let row = self.load_session(user_id, session_id).await?;
        Ok(SessionResponse::from_record(&row.session, row.persona_name))
    }

    pub async fn end_session(&self, user_id: i64, session_id: i64) -> Result<SessionResponse, ChatError> {
        let row = self.load_session(user_id, session_id).await?;
        let next = row.session.session_status().end().inspect_err(|e| {
            warn!(
                user_id,
                session_id,
                persona_id = row.session.persona_id,
                error = %e,
                "Session end rejected"
            );
        })?;

        let now = chrono::Utc::now().timestamp();
        self.store.finish_session(session_id, next, now).await?;
        info!(user_id, session_id, "Chat session ended");

        let ended = self.load_session(user_id, session_id).await?;
        Ok(SessionResponse::from_record(&ended.session, ended.persona_name))
    }

    /// Store the user's message, ask the model with recent history, store and
    /// return the reply. The user's message stays stored if generation fails.
    pub async fn send_message(
        &self,
        user_id: i64,
        session_id: i64,
        content: &str,
    ) -> Result<MessageResponse, ChatError> {
        let content = validate_content(content)
            .inspect_err(|e| warn!(user_id, session_id, error = %e, "Message rejected"))?;

        let row = self.load_session(user_id, session_id).await?;
        let session = row.session;
        let status = session.session_status();
        if status != SessionStatus::Active {
            warn!(
                user_id,
                session_id,
                persona_id = session.persona_id,
                status = ?status,
                "Message sent to inactive session"
            );
            return Err(ChatError::SessionNotActive(status));
        }

        let user_message = self.store.insert_message(&session, content, true).await?;

        let history: Vec<HistoryTurn> = self
            .store
            .history_before(
                user_id,
                session.persona_id,
                user_message.id,
                self.config.chat_history_limit,
            )
            .await?
            .into_iter()
            .map(|m| HistoryTurn {
                content: m.content,
                from_user: m.is_from_user,
            })
            .collect();

        let reply = self
            .generator
            .generate(&session.system_prompt, &history, content)
            .await
            .map_err(|e| {
                error!(
                    user_id,
                    session_id,
                    persona_id = session.persona_id,
                    provider = self.generator.name(),
                    "Reply generation failed: {}", e
                );
                ChatError::Llm(e)
            })?;

        let assistant = self.store.insert_message(&session, &reply, false).await?;
        info!(
            user_id,
            session_id,
            history = history.len(),
            reply_chars = reply.chars().count(),
            "Persona reply stored"
        );

        Ok(assistant.into())
    }

    pub async fn list_messages(&self, user_id: i64, session_id: i64) -> Result<Vec<MessageResponse>, ChatError> {
        let row = self.load_session(user_id, session_id).await?;
        let messages = self
            .store
            .list_messages(user_id, row.session.persona_id)
            .await?;

        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    async fn load_session(
        &self,
        user_id: i64,
        session_id: i64,
    ) -> Result<SessionWithPersona, ChatError> {
        let row = self.store.find_owned(user_id, session_id).await?;
        row.ok_or_else(|| {
            warn!(user_id, session_id, "Chat session not found");
            ChatError::SessionNotFound
        })
    }
}
