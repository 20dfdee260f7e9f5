// src/api/http/mod.rs

mod auth;
mod health;
mod personas;
mod sessions;

pub use auth::create_auth_router;
pub use health::{health_check, liveness_check, readiness_check};
pub use personas::create_persona_router;
pub use sessions::{create_chat_session_router, create_upload_router};

use axum::extract::multipart::{Field, MultipartError};

use crate::api::error::ApiError;

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text()))
}

/// Multipart body limit leaves headroom above the file cap so oversized files
/// reach validation instead of being cut off by the transport.
fn multipart_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.saturating_mul(2).max(64 * 1024)
}

async fn field_text(field: Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(multipart_error)
}
