// src/persona/fields.rs
// Length and format rules for persona form fields

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use super::types::PersonaMetadata;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_RELATIONSHIP_CHARS: usize = 100;
pub const MAX_MEMO_CHARS: usize = 5000;

/// Korean mobile numbers, e.g. 010-1234-5678
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^01[016789]-\d{3,4}-\d{4}$").expect("valid regex")
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Invalid phone number format (e.g. 010-1234-5678): {0}")]
    InvalidPhone(String),
}

fn check_len(field: &'static str, value: Option<&str>, max: usize) -> Result<(), FieldError> {
    match value {
        Some(v) if v.chars().count() > max => Err(FieldError::TooLong { field, max }),
        _ => Ok(()),
    }
}

pub fn validate_phone(phone: &str) -> Result<(), FieldError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(FieldError::InvalidPhone(phone.to_string()))
    }
}

/// Checks already-trimmed metadata. Absent optional fields always pass.
pub fn validate_metadata(metadata: &PersonaMetadata) -> Result<(), FieldError> {
    check_len("name", Some(&metadata.name), MAX_NAME_CHARS)?;
    check_len("relationship", metadata.relationship.as_deref(), MAX_RELATIONSHIP_CHARS)?;
    check_len("memo", metadata.memo.as_deref(), MAX_MEMO_CHARS)?;

    if let Some(phone) = metadata.phone_number.as_deref() {
        validate_phone(phone)?;
    }

    Ok(())
}
