// tests/common/mod.rs
// Shared test utilities: in-memory database, stub model, request helpers
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use dot_backend::api::app_router;
use dot_backend::config::{auth::AuthConfig, persona::PersonaConfig};
use dot_backend::llm::{HistoryTurn, LlmError, TextGenerator};
use dot_backend::state::AppState;

pub const TEST_PASSWORD: &str = "secret12!";

/// Android + iOS lines with notices mixed in. Speakers: 엄마, 민수.
pub const SAMPLE_EXPORT: &str = "저장한 날짜 : 2024-01-20 12:00:00\n\
2024년 1월 15일 오전 10:23, 엄마 : 밥 먹었니?\n\
2024년 1월 15일 오전 10:24, 민수 : 응 먹었어\n\
\n\
2024년 1월 15일 오전 10:25, 엄마 : 뭐 먹었어 우리 아들\n\
민수님이 들어왔습니다\n\
2024-01-15 10:26:00 민수 : 김치찌개\n";

pub const NOTICES_ONLY: &str = "민수님이 들어왔습니다\n지훈님이 나갔습니다\n\n";

// ============================================================================
// Database
// ============================================================================

pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    // Single long-lived connection: each in-memory connection is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub async fn insert_user(pool: &SqlitePool, email: &str, name: Option<&str>) -> i64 {
    sqlx::query(
        "INSERT INTO users (email, password_hash, name, created_at, updated_at) VALUES (?, 'x', ?, 0, 0)",
    )
    .bind(email)
    .bind(name)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(sql).fetch_one(pool).await.unwrap();
    row.0
}

// ============================================================================
// Stub text generator
// ============================================================================

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_instruction: String,
    pub history: Vec<HistoryTurn>,
    pub prompt: String,
}

/// Returns a fixed reply (or a fixed failure) and records every call.
pub struct StubGenerator {
    reply: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubGenerator {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn generate(
        &self,
        system_instruction: &str,
        history: &[HistoryTurn],
        prompt: &str,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system_instruction: system_instruction.to_string(),
            history: history.to_vec(),
            prompt: prompt.to_string(),
        });

        self.reply.clone().ok_or_else(|| LlmError::Api {
            status: 503,
            message: "model overloaded".to_string(),
        })
    }
}

// ============================================================================
// App
// ============================================================================

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 604800,
        bcrypt_cost: 4,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub pool: SqlitePool,
}

pub async fn test_app(generator: Arc<dyn TextGenerator>) -> TestApp {
    let pool = test_pool().await;
    let state = Arc::new(
        AppState::new(
            pool.clone(),
            generator,
            &test_auth_config(),
            &PersonaConfig::default(),
        )
        .expect("Failed to build app state"),
    );

    TestApp {
        router: app_router(state.clone()),
        state,
        pool,
    }
}

// ============================================================================
// Requests
// ============================================================================

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into()))
    };

    (status, json)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

const BOUNDARY: &str = "----dot-test-boundary";

/// multipart/form-data with text fields and at most one file part.
pub fn multipart_request(
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((field, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Register and log in; returns (access token, login response body).
pub async fn signup_and_login(router: &Router, email: &str) -> (String, Value) {
    let (status, _) = send(
        router,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({ "email": email, "password": TEST_PASSWORD, "name": "민수" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        router,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["accessToken"].as_str().unwrap().to_string();
    (token, body)
}

/// Create a persona from `SAMPLE_EXPORT` with 엄마 as the confirmed speaker.
pub async fn create_mom_persona(router: &Router, token: &str) -> i64 {
    let (status, body) = send(
        router,
        multipart_request(
            "/api/personas",
            Some(token),
            &[("name", "엄마"), ("relationship", "엄마"), ("speakerName", "엄마")],
            Some(("kakaoFile", "chat.txt", SAMPLE_EXPORT.as_bytes())),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

/// Collects formatted log output for the current thread while the guard lives.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Install a thread-local subscriber at DEBUG. `#[tokio::test]` runs on a
    /// current-thread runtime, so awaited work logs into this buffer.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Lines at WARN level containing every given fragment.
    pub fn warnings_with(&self, fragments: &[&str]) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains("WARN"))
            .filter(|line| fragments.iter().all(|f| line.contains(f)))
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
