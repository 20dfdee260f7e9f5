// src/chat/mod.rs
// Persona chat: sessions, message history, model replies

pub mod service;
pub mod session;
pub mod store;
pub mod types;

use thiserror::Error;

use crate::llm::LlmError;
pub use service::ChatService;
pub use session::{SessionStatus, build_system_prompt};
pub use store::ChatStore;
pub use types::*;

pub const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Persona not found")]
    PersonaNotFound,
    #[error("Persona has no conversation samples or memo yet")]
    PersonaNotReady,
    #[error("Chat session not found")]
    SessionNotFound,
    #[error("An active chat session already exists for this persona")]
    ActiveSessionExists,
    #[error("Chat session is not active ({0})")]
    SessionNotActive(SessionStatus),
    #[error("Cannot move session from {from} to {to}")]
    InvalidTransition { from: SessionStatus, to: SessionStatus },
    #[error("{0}")]
    InvalidMessage(String),
    #[error("Failed to generate reply: {0}")]
    Llm(#[from] LlmError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
