// src/api/error.rs
// HTTP error body and domain error -> status mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

use crate::auth::AuthError;
use crate::chat::ChatError;
use crate::persona::{IngestError, PersonaError};

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
}

impl ApiError {
    fn with_code(status_code: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code: Some(code.to_string()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::CONFLICT, "CONFLICT", message)
    }

    /// Upstream model failure
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_GATEWAY, "LLM_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response_json = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16()
        });

        if let Some(error_code) = self.error_code {
            response_json["error_code"] = json!(error_code);
        }

        (self.status_code, Json(response_json)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

fn db_error(operation: &str, e: &sqlx::Error) -> ApiError {
    error!("Database error during {}: {:?}", operation, e);
    ApiError::internal(format!("Database error during {operation}"))
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidEmail | AuthError::WeakPassword(_) => {
                warn!("Signup rejected: {}", e);
                ApiError::bad_request(e.to_string())
            }
            AuthError::EmailTaken => {
                warn!("Signup rejected: {}", e);
                ApiError::conflict(e.to_string())
            }
            AuthError::InvalidCredentials | AuthError::InvalidToken(_) => {
                warn!("Auth rejected: {}", e);
                ApiError::unauthorized(e.to_string())
            }
            AuthError::UserNotFound => ApiError::not_found(e.to_string()),
            AuthError::Database(ref db) => db_error("auth", db),
            AuthError::Hash(_) | AuthError::Jwt(_) => {
                error!("Auth internals failed: {}", e);
                ApiError::internal("Authentication failed")
            }
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Database(ref db) => db_error("persona ingestion", db),
            _ => ApiError::bad_request(e.to_string()),
        }
    }
}

impl From<PersonaError> for ApiError {
    fn from(e: PersonaError) -> Self {
        match e {
            PersonaError::NotFound => ApiError::not_found(e.to_string()),
            PersonaError::InvalidField(_) => ApiError::bad_request(e.to_string()),
            PersonaError::Database(ref db) => db_error("persona", db),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::PersonaNotFound
            | ChatError::PersonaNotReady
            | ChatError::InvalidMessage(_) => ApiError::bad_request(e.to_string()),
            ChatError::SessionNotFound => ApiError::not_found(e.to_string()),
            ChatError::ActiveSessionExists
            | ChatError::SessionNotActive(_)
            | ChatError::InvalidTransition { .. } => ApiError::conflict(e.to_string()),
            ChatError::Llm(_) => ApiError::bad_gateway(e.to_string()),
            ChatError::Database(ref db) => db_error("chat", db),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        db_error("request", &e)
    }
}
