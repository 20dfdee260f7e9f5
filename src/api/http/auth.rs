// src/api/http/auth.rs

use axum::{
    Router,
    extract::{Json, State},
    http::StatusCode,
    routing::{delete, post},
};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::auth::{
    AccessTokenResponse, AuthUser, LoginRequest, RefreshRequest, SignupRequest, SignupResponse,
    TokenResponse, WithdrawRequest,
};
use crate::state::AppState;

pub fn create_auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/withdraw", delete(withdraw))
}

async fn signup(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let response = app_state.auth_service.signup(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    Ok(Json(app_state.auth_service.login(req).await?))
}

async fn refresh(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<AccessTokenResponse>> {
    Ok(Json(app_state.auth_service.refresh(&req.refresh_token).await?))
}

async fn logout(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<StatusCode> {
    app_state.auth_service.logout(&req.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn withdraw(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<WithdrawRequest>,
) -> ApiResult<StatusCode> {
    app_state.auth_service.withdraw(user.user_id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}
