// src/api/http/health.rs
//
// Liveness, database health and schema readiness.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    db: &'static str,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    migrations: &'static str,
    missing_tables: Vec<&'static str>,
}

/// Tables every persona and chat request reads from
const REQUIRED_TABLES: &[&str] = &[
    "users",
    "refresh_tokens",
    "personas",
    "persona_traits",
    "conversation_samples",
    "chat_sessions",
    "chat_messages",
];

async fn missing_tables(pool: &SqlitePool) -> Result<Vec<&'static str>, sqlx::Error> {
    let present: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(pool)
            .await?;

    Ok(REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|table| !present.iter().any(|p| p == table))
        .collect())
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_ok = sqlx::query("SELECT 1")
        .fetch_one(&state.sqlite_pool)
        .await
        .is_ok();

    let response = HealthResponse {
        status: if db_ok { "healthy" } else { "unhealthy" },
        db: if db_ok { "ok" } else { "error" },
    };

    if db_ok {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Ready once every table the API uses exists.
///
/// GET /ready
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let missing = match missing_tables(&state.sqlite_pool).await {
        Ok(missing) => missing,
        Err(e) => {
            warn!("Readiness check could not read schema: {}", e);
            REQUIRED_TABLES.to_vec()
        }
    };
    let ready = missing.is_empty();
    if !ready {
        warn!(missing = ?missing, "Schema incomplete");
    }

    let response = ReadyResponse {
        status: if ready { "ready" } else { "not_ready" },
        migrations: if ready { "applied" } else { "pending" },
        missing_tables: missing,
    };

    if ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// GET /live
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "alive" })))
}
