// src/api/mod.rs

pub mod error;
pub mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use http::{
    create_auth_router, create_chat_session_router, create_persona_router, create_upload_router,
    health_check, liveness_check, readiness_check,
};

/// Full application router: health probes at the root, everything else under `/api`.
pub fn app_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .nest("/api/auth", create_auth_router())
        .nest("/api/personas", create_persona_router(upload_limit))
        .nest("/api/sessions", create_upload_router(upload_limit))
        .nest("/api/chat-sessions", create_chat_session_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
