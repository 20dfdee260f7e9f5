// src/auth/extractor.rs
// Bearer access token -> authenticated user id

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::debug;

use super::jwt::TokenKind;
use crate::api::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let claims = state
            .auth_service
            .keys()
            .verify(token, TokenKind::Access)
            .map_err(|e| {
                debug!("Rejected access token: {}", e);
                ApiError::unauthorized("Invalid or expired token")
            })?;
        let user_id = claims
            .user_id()
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        // Tokens outlive withdrawn accounts
        if state.auth_service.find_by_id(user_id).await?.is_none() {
            return Err(ApiError::unauthorized("Account no longer exists"));
        }

        Ok(AuthUser { user_id })
    }
}
