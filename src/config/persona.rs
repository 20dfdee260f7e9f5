// src/config/persona.rs
// Persona ingestion and chat prompt limits

use serde::{Deserialize, Serialize};

use super::helpers::env_usize;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Earliest parsed messages fed to trait analysis
    pub trait_sample_cap: usize,
    /// Conversation samples re-included in a chat session system prompt
    pub chat_prompt_samples: usize,
    /// Earlier messages sent as history on each chat turn
    pub chat_history_limit: usize,
    pub max_upload_bytes: usize,
}

impl PersonaConfig {
    pub fn from_env() -> Self {
        Self {
            trait_sample_cap: env_usize("TRAIT_SAMPLE_CAP", 150),
            chat_prompt_samples: env_usize("CHAT_PROMPT_SAMPLES", 20),
            chat_history_limit: env_usize("CHAT_HISTORY_LIMIT", 10),
            max_upload_bytes: env_usize("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            trait_sample_cap: 150,
            chat_prompt_samples: 20,
            chat_history_limit: 10,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
