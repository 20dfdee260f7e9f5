// src/state.rs
// Shared application state handed to every axum handler

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{
    auth::{AuthService, JwtKeys},
    chat::{ChatService, ChatStore},
    config::{auth::AuthConfig, persona::PersonaConfig},
    kakao::{KakaoParser, ParserConfig},
    llm::TextGenerator,
    persona::{PersonaIngestor, PersonaService, PersonaStore, TraitSynthesizer},
};

#[derive(Clone)]
pub struct AppState {
    // -------- Storage --------
    pub sqlite_pool: SqlitePool,

    // -------- Services --------
    pub auth_service: AuthService,
    pub persona_service: PersonaService,
    pub ingestor: PersonaIngestor,
    pub chat_service: ChatService,

    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire services over one pool and one text generator.
    pub fn new(
        pool: SqlitePool,
        generator: Arc<dyn TextGenerator>,
        auth: &AuthConfig,
        persona: &PersonaConfig,
    ) -> anyhow::Result<Self> {
        let parser = Arc::new(KakaoParser::new(ParserConfig::default())?);
        let persona_store = PersonaStore::new(pool.clone());

        let auth_service = AuthService::new(pool.clone(), JwtKeys::new(auth), auth.bcrypt_cost);
        let synthesizer = TraitSynthesizer::new(generator.clone(), persona.trait_sample_cap);
        let ingestor = PersonaIngestor::new(
            parser,
            synthesizer,
            persona_store.clone(),
            persona.max_upload_bytes,
        );
        let persona_service = PersonaService::new(persona_store.clone());
        let chat_service = ChatService::new(
            ChatStore::new(pool.clone()),
            persona_store,
            generator,
            persona.clone(),
        );

        Ok(Self {
            sqlite_pool: pool,
            auth_service,
            persona_service,
            ingestor,
            chat_service,
            max_upload_bytes: persona.max_upload_bytes,
        })
    }
}
