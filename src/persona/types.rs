// src/persona/types.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Which side of an imported conversation a sample line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SampleRole {
    Persona,
    User,
}

impl SampleRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleRole::Persona => "PERSONA",
            SampleRole::User => "USER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PERSONA" => Some(SampleRole::Persona),
            "USER" => Some(SampleRole::User),
            _ => None,
        }
    }
}

impl fmt::Display for SampleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PersonaRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone_number: Option<String>,
    pub relationship: Option<String>,
    pub profile_image_url: Option<String>,
    pub memo: Option<String>,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PersonaRecord {
    pub fn has_memo(&self) -> bool {
        self.memo.as_deref().is_some_and(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ConversationSample {
    pub id: i64,
    pub persona_id: i64,
    pub role: String,
    pub message: String,
    pub created_at: i64,
}

impl ConversationSample {
    pub fn sample_role(&self) -> SampleRole {
        SampleRole::parse(&self.role).unwrap_or(SampleRole::User)
    }
}

/// Sample line waiting to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSample {
    pub role: SampleRole,
    pub message: String,
}

/// User-entered persona fields, shared by the multipart create form and updates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaMetadata {
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaResponse {
    pub id: i64,
    pub name: String,
    pub phone_number: Option<String>,
    pub relationship: Option<String>,
    pub profile_image_url: Option<String>,
    pub memo: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<PersonaRecord> for PersonaResponse {
    fn from(record: PersonaRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            phone_number: record.phone_number,
            relationship: record.relationship,
            profile_image_url: record.profile_image_url,
            memo: record.memo,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaSummary {
    pub id: i64,
    pub name: String,
    pub phone_number: Option<String>,
    pub relationship: Option<String>,
    pub profile_image_url: Option<String>,
}

impl From<PersonaRecord> for PersonaSummary {
    fn from(record: PersonaRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            phone_number: record.phone_number,
            relationship: record.relationship,
            profile_image_url: record.profile_image_url,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonaRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerPreview {
    pub speakers: Vec<String>,
}
