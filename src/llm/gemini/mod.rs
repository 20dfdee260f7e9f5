// src/llm/gemini/mod.rs
// Google Gemini generateContent client

pub mod types;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{HistoryTurn, LlmError, TextGenerator};
use crate::config::llm::GeminiConfig;
use types::{
    GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiResponse,
    GeminiSystemInstruction,
};

/// Gemini provider used for trait analysis and persona chat
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::NotConfigured("Google API key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn api_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Assemble the request body: history in order, then the new prompt as the
    /// final user turn.
    pub fn build_request(
        &self,
        system_instruction: &str,
        history: &[HistoryTurn],
        prompt: &str,
    ) -> GeminiRequest {
        let mut contents: Vec<GeminiContent> = history
            .iter()
            .map(|turn| {
                let role = if turn.from_user { "user" } else { "model" };
                GeminiContent::text(role, turn.content.clone())
            })
            .collect();
        contents.push(GeminiContent::text("user", prompt));

        let system_instruction = (!system_instruction.is_empty()).then(|| {
            GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: Some(system_instruction.to_string()),
                }],
            }
        });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }

    /// Pull the first candidate's text out of a decoded response.
    pub fn extract_text(response: GeminiResponse) -> Result<String, LlmError> {
        if let Some(error) = response.error {
            return Err(LlmError::Api {
                status: error.code.unwrap_or(500),
                message: error.message,
            });
        }

        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| LlmError::EmptyResponse("no candidates".to_string()))?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" {
                warn!("Gemini finishReason: {}", reason);
            }
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyResponse("candidate has no text parts".to_string()));
        }

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        system_instruction: &str,
        history: &[HistoryTurn],
        prompt: &str,
    ) -> Result<String, LlmError> {
        info!(
            model = %self.config.model,
            history = history.len(),
            prompt_chars = prompt.chars().count(),
            "Calling Gemini API"
        );

        let request = self.build_request(system_instruction, history, prompt);

        let response = self
            .client
            .post(self.api_url())
            .header("X-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let decoded: GeminiResponse = response.json().await?;
        let text = Self::extract_text(decoded)?;

        debug!("Gemini API response received: {} characters", text.chars().count());
        Ok(text)
    }
}
