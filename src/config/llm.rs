// src/config/llm.rs
// Gemini generateContent configuration

use serde::{Deserialize, Serialize};

use super::helpers::{env_or, env_parsed_or};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_or("GEMINI_API_KEY", ""),
            model: env_or("GEMINI_MODEL", "gemini-2.0-flash"),
            base_url: env_or("GEMINI_BASE_URL", GEMINI_BASE_URL),
            timeout_secs: env_parsed_or("GEMINI_TIMEOUT_SECS", 120),
            temperature: env_parsed_or("GEMINI_TEMPERATURE", 0.3),
            top_k: env_parsed_or("GEMINI_TOP_K", 40),
            top_p: env_parsed_or("GEMINI_TOP_P", 0.95),
            max_output_tokens: env_parsed_or("GEMINI_MAX_OUTPUT_TOKENS", 1024),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("GEMINI_API_KEY is required"));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(anyhow::anyhow!("GEMINI_TEMPERATURE must be between 0.0 and 2.0"));
        }

        Ok(())
    }
}
