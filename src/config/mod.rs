// src/config/mod.rs
// Central configuration for the persona chat backend

pub mod auth;
pub mod helpers;
pub mod llm;
pub mod persona;
pub mod server;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

lazy_static! {
    pub static ref CONFIG: DotConfig = DotConfig::from_env();
}

/// Main configuration structure - composes all domain configs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotConfig {
    pub server: server::ServerConfig,
    pub database: server::DatabaseConfig,
    pub logging: server::LoggingConfig,
    pub gemini: llm::GeminiConfig,
    pub auth: auth::AuthConfig,
    pub persona: persona::PersonaConfig,
}

impl DotConfig {
    pub fn from_env() -> Self {
        // Load .env file; absent in production
        dotenv::dotenv().ok();

        Self {
            server: server::ServerConfig::from_env(),
            database: server::DatabaseConfig::from_env(),
            logging: server::LoggingConfig::from_env(),
            gemini: llm::GeminiConfig::from_env(),
            auth: auth::AuthConfig::from_env(),
            persona: persona::PersonaConfig::from_env(),
        }
    }

    /// Validate config on startup
    pub fn validate(&self) -> anyhow::Result<()> {
        self.gemini.validate()?;
        self.auth.validate()?;
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        self.server.bind_address()
    }
}
