// src/llm/mod.rs
// Text generation collaborator: provider-agnostic trait plus the Gemini client

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::GeminiClient;

/// One prior chat turn handed to the model as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub content: String,
    /// true for the human side, false for the persona/model side
    pub from_user: bool,
}

impl HistoryTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            from_user: true,
        }
    }

    pub fn persona(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            from_user: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM provider is not configured: {0}")]
    NotConfigured(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

/// Anything that can turn (system instruction, history, prompt) into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        system_instruction: &str,
        history: &[HistoryTurn],
        prompt: &str,
    ) -> Result<String, LlmError>;
}
