// src/persona/mod.rs
// Personas: KakaoTalk-seeded creation, trait synthesis, CRUD

pub mod fields;
pub mod ingest;
pub mod service;
pub mod store;
pub mod traits;
pub mod types;

pub use fields::{FieldError, validate_metadata};
pub use ingest::{IngestError, IngestReport, IngestUser, KakaoUpload, PersonaIngestor, assign_role, validate_upload};
pub use service::{PersonaError, PersonaService};
pub use store::PersonaStore;
pub use traits::{TraitRequest, TraitSource, TraitSynthesizer, fallback_trait};
pub use types::*;
