// src/persona/ingest.rs
// Persona creation from form fields plus an optional KakaoTalk export

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fields::{FieldError, validate_metadata};
use super::store::PersonaStore;
use super::traits::{TraitRequest, TraitSource, TraitSynthesizer};
use super::types::{NewSample, PersonaMetadata, PersonaResponse, SampleRole};
use crate::kakao::{KakaoParser, ParseError, ParsedMessage, contains_speaker, extract_speakers};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Persona name is required")]
    MissingName,
    #[error(transparent)]
    InvalidField(#[from] FieldError),
    #[error("Uploaded file is empty")]
    EmptyFile,
    #[error("Uploaded file is too large ({size} bytes, max {max})")]
    FileTooLarge { size: usize, max: usize },
    #[error("Only .txt KakaoTalk exports are supported: {0}")]
    InvalidExtension(String),
    #[error("Speaker name is required when a KakaoTalk file is attached")]
    MissingSpeaker,
    #[error("No chat messages found in the uploaded file")]
    NoMessages,
    #[error("Failed to parse KakaoTalk export: {0}")]
    Parse(#[from] ParseError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Raw uploaded export as received from the multipart form
#[derive(Debug, Clone)]
pub struct KakaoUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl KakaoUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// The requesting account, as the analysis prompt needs it
#[derive(Debug, Clone)]
pub struct IngestUser {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub persona: PersonaResponse,
    pub samples_stored: usize,
    /// None when no export was attached or the confirmed speaker never spoke
    pub trait_source: Option<TraitSource>,
}

pub fn validate_upload(upload: &KakaoUpload, max_bytes: usize) -> Result<(), IngestError> {
    if upload.bytes.is_empty() {
        return Err(IngestError::EmptyFile);
    }

    if upload.bytes.len() > max_bytes {
        return Err(IngestError::FileTooLarge {
            size: upload.bytes.len(),
            max: max_bytes,
        });
    }

    if !upload.filename.to_lowercase().ends_with(".txt") {
        return Err(IngestError::InvalidExtension(upload.filename.clone()));
    }

    Ok(())
}

/// PERSONA iff the speaker is exactly the confirmed name.
pub fn assign_role(speaker: &str, confirmed: &str) -> SampleRole {
    if speaker == confirmed {
        SampleRole::Persona
    } else {
        SampleRole::User
    }
}

pub fn build_samples(messages: &[ParsedMessage], confirmed: &str) -> Vec<NewSample> {
    messages
        .iter()
        .map(|m| NewSample {
            role: assign_role(&m.speaker, confirmed),
            message: m.content.clone(),
        })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct PersonaIngestor {
    parser: Arc<KakaoParser>,
    synthesizer: TraitSynthesizer,
    store: PersonaStore,
    max_upload_bytes: usize,
}

impl PersonaIngestor {
    pub fn new(
        parser: Arc<KakaoParser>,
        synthesizer: TraitSynthesizer,
        store: PersonaStore,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            parser,
            synthesizer,
            store,
            max_upload_bytes,
        }
    }

    /// Validate and parse an export. An export with no recognizable message
    /// lines is rejected.
    pub fn parse_upload(&self, upload: &KakaoUpload) -> Result<Vec<ParsedMessage>, IngestError> {
        validate_upload(upload, self.max_upload_bytes)?;

        let messages = self.parser.parse_bytes(&upload.bytes)?;
        if messages.is_empty() {
            return Err(IngestError::NoMessages);
        }

        debug!(
            file = %upload.filename,
            bytes = upload.bytes.len(),
            messages = messages.len(),
            "Parsed KakaoTalk export"
        );
        Ok(messages)
    }

    /// Speakers of an export in first-appearance order. Nothing is stored.
    pub fn preview_speakers(
        &self,
        user_id: i64,
        upload: &KakaoUpload,
    ) -> Result<Vec<String>, IngestError> {
        let messages = self.parse_upload(upload).inspect_err(|e| {
            warn!(user_id, file = %upload.filename, error = %e, "Speaker preview rejected");
        })?;
        Ok(extract_speakers(&messages))
    }

    pub async fn ingest(
        &self,
        user: &IngestUser,
        metadata: PersonaMetadata,
        upload: Option<KakaoUpload>,
        speaker_name: Option<String>,
    ) -> Result<IngestReport, IngestError> {
        self.create_persona(user, metadata, upload, speaker_name)
            .await
            .inspect_err(|e| warn!(user_id = user.id, error = %e, "Persona creation rejected"))
    }

    async fn create_persona(
        &self,
        user: &IngestUser,
        metadata: PersonaMetadata,
        upload: Option<KakaoUpload>,
        speaker_name: Option<String>,
    ) -> Result<IngestReport, IngestError> {
        let metadata = PersonaMetadata {
            name: metadata.name.trim().to_string(),
            phone_number: non_blank(metadata.phone_number),
            relationship: non_blank(metadata.relationship),
            memo: non_blank(metadata.memo),
        };
        if metadata.name.is_empty() {
            return Err(IngestError::MissingName);
        }
        validate_metadata(&metadata)?;

        let speaker_name = non_blank(speaker_name);

        let Some(upload) = upload else {
            let record = self.store.create_with_samples(user.id, &metadata, None, &[]).await?;
            info!(user_id = user.id, persona_id = record.id, "Persona created without chat export");
            return Ok(IngestReport {
                persona: record.into(),
                samples_stored: 0,
                trait_source: None,
            });
        };

        let speaker_name = speaker_name.ok_or(IngestError::MissingSpeaker)?;
        let messages = self.parse_upload(&upload)?;
        let speakers = extract_speakers(&messages);

        if !contains_speaker(&speakers, &speaker_name) {
            let record = self.store.create_with_samples(user.id, &metadata, None, &[]).await?;
            warn!(
                user_id = user.id,
                persona_id = record.id,
                speaker = %speaker_name,
                found = ?speakers,
                "Confirmed speaker not present in export; persona created without samples"
            );
            return Ok(IngestReport {
                persona: record.into(),
                samples_stored: 0,
                trait_source: None,
            });
        }

        let request = TraitRequest {
            persona_name: &metadata.name,
            user_name: &user.name,
            relationship: metadata.relationship.as_deref(),
            memo: metadata.memo.as_deref(),
            speaker_name: &speaker_name,
            messages: &messages,
        };
        let (trait_text, trait_source) = self.synthesizer.synthesize_or_fallback(&request).await;

        let samples = build_samples(&messages, &speaker_name);
        let record = self
            .store
            .create_with_samples(user.id, &metadata, Some(&trait_text), &samples)
            .await?;

        info!(
            user_id = user.id,
            persona_id = record.id,
            samples = samples.len(),
            trait_source = ?trait_source,
            "Persona created from chat export"
        );

        Ok(IngestReport {
            persona: record.into(),
            samples_stored: samples.len(),
            trait_source: Some(trait_source),
        })
    }
}
