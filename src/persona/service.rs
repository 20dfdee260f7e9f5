// src/persona/service.rs
// Owner-scoped persona reads, updates and soft deletes

use thiserror::Error;
use tracing::{info, warn};

use super::fields::{FieldError, validate_metadata};
use super::store::PersonaStore;
use super::types::{PersonaMetadata, PersonaRecord, PersonaResponse, PersonaSummary, UpdatePersonaRequest};

#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("Persona not found")]
    NotFound,
    #[error(transparent)]
    InvalidField(#[from] FieldError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct PersonaService {
    store: PersonaStore,
}

impl PersonaService {
    pub fn new(store: PersonaStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<PersonaSummary>, PersonaError> {
        let records = self.store.list_owned(user_id).await?;
        Ok(records.into_iter().map(PersonaSummary::from).collect())
    }

    pub async fn get(&self, user_id: i64, persona_id: i64) -> Result<PersonaResponse, PersonaError> {
        self.find(user_id, persona_id).await.map(PersonaResponse::from)
    }

    /// Blank name/phone keep the stored value; relationship and memo are replaced.
    pub async fn update(
        &self,
        user_id: i64,
        persona_id: i64,
        req: UpdatePersonaRequest,
    ) -> Result<PersonaResponse, PersonaError> {
        let current = self.find(user_id, persona_id).await?;

        let keep_unless_blank = |new: Option<String>, old: Option<String>| match new {
            Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
            _ => old,
        };

        let metadata = PersonaMetadata {
            name: keep_unless_blank(req.name, Some(current.name)).unwrap_or_default(),
            phone_number: keep_unless_blank(req.phone_number, current.phone_number),
            relationship: req.relationship,
            memo: req.memo,
        };
        if let Err(e) = validate_metadata(&metadata) {
            warn!(user_id, persona_id, error = %e, "Persona update rejected");
            return Err(e.into());
        }

        let updated = self.store.update(persona_id, &metadata).await?;
        info!(user_id, persona_id, "Persona updated");
        Ok(updated.into())
    }

    pub async fn delete(&self, user_id: i64, persona_id: i64) -> Result<(), PersonaError> {
        if !self.store.soft_delete(user_id, persona_id).await? {
            warn!(user_id, persona_id, "Persona not found for delete");
            return Err(PersonaError::NotFound);
        }

        info!(user_id, persona_id, "Persona deleted");
        Ok(())
    }

    async fn find(&self, user_id: i64, persona_id: i64) -> Result<PersonaRecord, PersonaError> {
        let record = self.store.find_owned(user_id, persona_id).await?;
        record.ok_or_else(|| {
            warn!(user_id, persona_id, "Persona not found");
            PersonaError::NotFound
        })
    }
}
