// src/api/http/personas.rs

use axum::{
    Router,
    extract::{DefaultBodyLimit, Json, Multipart, Path, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;
use tracing::debug;

use super::{field_text, multipart_body_limit, multipart_error};
use crate::api::error::{ApiError, ApiResult};
use crate::auth::AuthUser;
use crate::persona::{
    IngestUser, KakaoUpload, PersonaMetadata, PersonaResponse, PersonaSummary,
    UpdatePersonaRequest,
};
use crate::state::AppState;

pub fn create_persona_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_personas).post(create_persona))
        .route(
            "/{persona_id}",
            get(get_persona).put(update_persona).delete(delete_persona),
        )
        .layer(DefaultBodyLimit::max(multipart_body_limit(max_upload_bytes)))
}

/// POST /api/personas (multipart)
async fn create_persona(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<PersonaResponse>)> {
    let mut metadata = PersonaMetadata::default();
    let mut upload = None;
    let mut speaker_name = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "name" => metadata.name = field_text(field).await?,
            "phoneNumber" => metadata.phone_number = Some(field_text(field).await?),
            "relationship" => metadata.relationship = Some(field_text(field).await?),
            "memo" => metadata.memo = Some(field_text(field).await?),
            "speakerName" => speaker_name = Some(field_text(field).await?),
            "kakaoFile" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Forms submit an empty, unnamed part when no file was picked
                if !(filename.is_empty() && bytes.is_empty()) {
                    upload = Some(KakaoUpload::new(filename, bytes.to_vec()));
                }
            }
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }

    let account = app_state
        .auth_service
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;
    let ingest_user = IngestUser {
        id: account.id,
        name: account.display_name(),
    };

    let report = app_state
        .ingestor
        .ingest(&ingest_user, metadata, upload, speaker_name)
        .await?;

    Ok((StatusCode::CREATED, Json(report.persona)))
}

async fn list_personas(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<PersonaSummary>>> {
    Ok(Json(app_state.persona_service.list(user.user_id).await?))
}

async fn get_persona(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(persona_id): Path<i64>,
) -> ApiResult<Json<PersonaResponse>> {
    Ok(Json(app_state.persona_service.get(user.user_id, persona_id).await?))
}

async fn update_persona(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(persona_id): Path<i64>,
    Json(req): Json<UpdatePersonaRequest>,
) -> ApiResult<Json<PersonaResponse>> {
    let updated = app_state
        .persona_service
        .update(user.user_id, persona_id, req)
        .await?;
    Ok(Json(updated))
}

async fn delete_persona(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(persona_id): Path<i64>,
) -> ApiResult<StatusCode> {
    app_state.persona_service.delete(user.user_id, persona_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
