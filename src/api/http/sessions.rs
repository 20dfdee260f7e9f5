// src/api/http/sessions.rs
// Chat session endpoints plus the speaker preview upload

use axum::{
    Router,
    extract::{DefaultBodyLimit, Json, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{multipart_body_limit, multipart_error};
use crate::api::error::{ApiError, ApiResult};
use crate::auth::AuthUser;
use crate::chat::{MessageResponse, SendMessageRequest, SessionResponse, SessionSummary};
use crate::persona::{KakaoUpload, SpeakerPreview};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionQuery {
    persona_id: i64,
}

pub fn create_chat_session_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/end", post(end_session))
        .route("/{session_id}/messages", get(list_messages).post(send_message))
}

pub fn create_upload_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(preview_speakers))
        .layer(DefaultBodyLimit::max(multipart_body_limit(max_upload_bytes)))
}

/// POST /api/sessions/upload (multipart `file`)
async fn preview_speakers(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<SpeakerPreview>> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some(KakaoUpload::new(filename, bytes.to_vec()));
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("Missing 'file' part"))?;
    let speakers = app_state.ingestor.preview_speakers(user.user_id, &upload)?;

    Ok(Json(SpeakerPreview { speakers }))
}

async fn create_session(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<CreateSessionQuery>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let session = app_state
        .chat_service
        .create_session(user.user_id, query.persona_id)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn list_sessions(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<SessionSummary>>> {
    Ok(Json(app_state.chat_service.list_sessions(user.user_id).await?))
}

async fn get_session(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(session_id): Path<i64>,
) -> ApiResult<Json<SessionResponse>> {
    Ok(Json(
        app_state.chat_service.get_session(user.user_id, session_id).await?,
    ))
}

async fn end_session(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(session_id): Path<i64>,
) -> ApiResult<Json<SessionResponse>> {
    Ok(Json(
        app_state.chat_service.end_session(user.user_id, session_id).await?,
    ))
}

async fn send_message(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(session_id): Path<i64>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let reply = app_state
        .chat_service
        .send_message(user.user_id, session_id, &req.content)
        .await?;
    Ok(Json(reply))
}

async fn list_messages(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(session_id): Path<i64>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    Ok(Json(
        app_state.chat_service.list_messages(user.user_id, session_id).await?,
    ))
}
