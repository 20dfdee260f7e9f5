// tests/auth_api_test.rs

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{StubGenerator, TEST_PASSWORD, count, empty_request, json_request, send, signup_and_login};

#[tokio::test]
async fn test_signup_validation_and_duplicates() {
    let app = common::test_app(StubGenerator::replying("ok")).await;

    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({ "email": "Minsu@Example.com", "password": TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "minsu@example.com");
    assert!(body["userId"].as_i64().is_some());

    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({ "email": "minsu@example.com", "password": TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "CONFLICT");

    for (email, password) in [("not-an-email", TEST_PASSWORD), ("jihun@example.com", "short1!"), ("jihun@example.com", "nospecial1")] {
        let (status, _) = send(
            &app.router,
            json_request("POST", "/api/auth/signup", None, json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} / {}", email, password);
    }
}

#[tokio::test]
async fn test_login_refresh_logout() {
    let app = common::test_app(StubGenerator::replying("ok")).await;
    let (access, login) = signup_and_login(&app.router, "minsu@example.com").await;

    assert_eq!(login["tokenType"], "Bearer");
    let refresh = login["refreshToken"].as_str().unwrap().to_string();

    // Wrong password
    let (status, _) = send(
        &app.router,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "minsu@example.com", "password": "wrong123!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Refresh token -> new access token
    let (status, body) = send(
        &app.router,
        json_request("POST", "/api/auth/refresh", None, json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["accessToken"].as_str().is_some());

    // An access token is not a refresh token
    let (status, _) = send(
        &app.router,
        json_request("POST", "/api/auth/refresh", None, json!({ "refreshToken": access })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logout revokes; repeating it is harmless
    for _ in 0..2 {
        let (status, _) = send(
            &app.router,
            json_request("POST", "/api/auth/logout", None, json!({ "refreshToken": refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, _) = send(
        &app.router,
        json_request("POST", "/api/auth/refresh", None, json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_need_bearer_token() {
    let app = common::test_app(StubGenerator::replying("ok")).await;

    let (status, body) = send(&app.router, empty_request("GET", "/api/personas", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);

    let (status, _) = send(&app.router, empty_request("GET", "/api/personas", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Refresh tokens do not authenticate requests
    let (_, login) = signup_and_login(&app.router, "minsu@example.com").await;
    let refresh = login["refreshToken"].as_str().unwrap();
    let (status, _) = send(&app.router, empty_request("GET", "/api/personas", Some(refresh))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_withdraw_cascades() {
    let app = common::test_app(StubGenerator::replying("# Role")).await;
    let (token, _) = signup_and_login(&app.router, "minsu@example.com").await;
    let persona_id = common::create_mom_persona(&app.router, &token).await;

    let (status, _) = send(
        &app.router,
        json_request(
            "POST",
            &format!("/api/chat-sessions?personaId={}", persona_id),
            Some(&token),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app.router,
        json_request("DELETE", "/api/auth/withdraw", Some(&token), json!({ "password": "wrong123!" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        json_request(
            "DELETE",
            "/api/auth/withdraw",
            Some(&token),
            json!({ "password": TEST_PASSWORD, "reason": "더 이상 사용하지 않아요" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for table in ["users", "refresh_tokens", "personas", "persona_traits", "conversation_samples", "chat_sessions"] {
        assert_eq!(count(&app.pool, &format!("SELECT COUNT(*) FROM {}", table)).await, 0, "{}", table);
    }

    // The still-unexpired access token no longer maps to an account
    let (status, _) = send(&app.router, empty_request("GET", "/api/personas", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = common::test_app(StubGenerator::replying("ok")).await;

    let (status, body) = send(&app.router, empty_request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["db"], "ok");

    let (status, body) = send(&app.router, empty_request("GET", "/ready", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["migrations"], "applied");
    assert_eq!(body["missing_tables"], json!([]));

    let (status, _) = send(&app.router, empty_request("GET", "/live", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_reports_missing_tables() {
    let app = common::test_app(StubGenerator::replying("ok")).await;
    sqlx::query("DROP TABLE chat_messages").execute(&app.pool).await.unwrap();

    let (status, body) = send(&app.router, empty_request("GET", "/ready", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["missing_tables"], json!(["chat_messages"]));

    // Liveness does not depend on the schema
    let (status, _) = send(&app.router, empty_request("GET", "/live", None)).await;
    assert_eq!(status, StatusCode::OK);
}
