// tests/persona_api_test.rs

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{
    NOTICES_ONLY, SAMPLE_EXPORT, StubGenerator, count, empty_request, json_request,
    multipart_request, send, signup_and_login,
};

#[tokio::test]
async fn test_create_persona_from_export() {
    let app = common::test_app(StubGenerator::replying("# Role\n엄마")).await;
    let (token, _) = signup_and_login(&app.router, "minsu@example.com").await;

    let (status, body) = send(
        &app.router,
        multipart_request(
            "/api/personas",
            Some(&token),
            &[
                ("name", "엄마"),
                ("phoneNumber", "010-1234-5678"),
                ("relationship", "엄마"),
                ("memo", "걱정이 많음"),
                ("speakerName", "엄마"),
            ],
            Some(("kakaoFile", "KakaoTalk_Chat.txt", SAMPLE_EXPORT.as_bytes())),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["name"], "엄마");
    assert_eq!(body["phoneNumber"], "010-1234-5678");
    assert_eq!(body["relationship"], "엄마");
    assert_eq!(body["memo"], "걱정이 많음");
    assert!(body["profileImageUrl"].is_null());
    assert!(body["createdAt"].as_i64().is_some());
    assert!(body["updatedAt"].as_i64().is_some());

    assert_eq!(count(&app.pool, "SELECT COUNT(*) FROM conversation_samples").await, 4);
    assert_eq!(count(&app.pool, "SELECT COUNT(*) FROM persona_traits").await, 1);
}

#[tokio::test]
async fn test_create_persona_rejections() {
    let app = common::test_app(StubGenerator::replying("# Role")).await;
    let (token, _) = signup_and_login(&app.router, "minsu@example.com").await;

    let cases = [
        // File without a speaker name
        (vec![("name", "엄마")], Some(("kakaoFile", "chat.txt", SAMPLE_EXPORT.as_bytes()))),
        // Not a .txt export
        (
            vec![("name", "엄마"), ("speakerName", "엄마")],
            Some(("kakaoFile", "chat.pdf", SAMPLE_EXPORT.as_bytes())),
        ),
        // Nothing parseable
        (
            vec![("name", "엄마"), ("speakerName", "엄마")],
            Some(("kakaoFile", "chat.txt", NOTICES_ONLY.as_bytes())),
        ),
        // No name
        (vec![("memo", "메모")], None),
    ];

    for (fields, file) in cases {
        let (status, body) = send(
            &app.router,
            multipart_request("/api/personas", Some(&token), &fields, file),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    }

    assert_eq!(count(&app.pool, "SELECT COUNT(*) FROM personas").await, 0);
}

#[tokio::test]
async fn test_create_persona_field_limits() {
    let app = common::test_app(StubGenerator::replying("# Role")).await;
    let (token, _) = signup_and_login(&app.router, "minsu@example.com").await;

    let long_name = "가".repeat(101);
    let long_relationship = "a".repeat(101);
    let long_memo = "a".repeat(5001);
    let cases: [Vec<(&str, &str)>; 4] = [
        vec![("name", long_name.as_str())],
        vec![("name", "엄마"), ("phoneNumber", "not-a-phone")],
        vec![("name", "엄마"), ("relationship", long_relationship.as_str())],
        vec![("name", "엄마"), ("memo", long_memo.as_str())],
    ];

    for fields in cases {
        let (status, body) = send(
            &app.router,
            multipart_request("/api/personas", Some(&token), &fields, None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(body["error_code"], "BAD_REQUEST");
    }
    assert_eq!(count(&app.pool, "SELECT COUNT(*) FROM personas").await, 0);

    let (status, body) = send(
        &app.router,
        multipart_request(
            "/api/personas",
            Some(&token),
            &[("name", "엄마"), ("phoneNumber", "011-123-4567")],
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["phoneNumber"], "011-123-4567");
}

#[tokio::test]
async fn test_update_persona_field_limits() {
    let app = common::test_app(StubGenerator::replying("# Role")).await;
    let (token, _) = signup_and_login(&app.router, "minsu@example.com").await;
    let persona_id = common::create_mom_persona(&app.router, &token).await;
    let uri = format!("/api/personas/{}", persona_id);

    let rejected = [
        json!({ "name": "가".repeat(101) }),
        json!({ "phoneNumber": "12345" }),
        json!({ "relationship": "a".repeat(101) }),
        json!({ "memo": "a".repeat(5001) }),
    ];
    for body in rejected {
        let (status, _) = send(&app.router, json_request("PUT", &uri, Some(&token), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // Nothing was written by the rejected updates
    let (status, body) = send(&app.router, empty_request("GET", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "엄마");
    assert_eq!(body["relationship"], "엄마");
    assert!(body["phoneNumber"].is_null());
}

#[tokio::test]
async fn test_oversized_export_is_bad_request() {
    let app = common::test_app(StubGenerator::replying("# Role")).await;
    let (token, _) = signup_and_login(&app.router, "minsu@example.com").await;

    let big = vec![b'a'; 1024 * 1024 + 1];
    let (status, _) = send(
        &app.router,
        multipart_request(
            "/api/personas",
            Some(&token),
            &[("name", "엄마"), ("speakerName", "엄마")],
            Some(("kakaoFile", "chat.txt", &big)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_speaker_preview() {
    let app = common::test_app(StubGenerator::replying("unused")).await;
    let (token, _) = signup_and_login(&app.router, "minsu@example.com").await;

    let (status, body) = send(
        &app.router,
        multipart_request(
            "/api/sessions/upload",
            Some(&token),
            &[],
            Some(("file", "chat.txt", SAMPLE_EXPORT.as_bytes())),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "speakers": ["엄마", "민수"] }));

    // Preview never persists anything
    assert_eq!(count(&app.pool, "SELECT COUNT(*) FROM personas").await, 0);

    let (status, _) = send(
        &app.router,
        multipart_request("/api/sessions/upload", Some(&token), &[], None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_persona_crud_is_owner_scoped() {
    let app = common::test_app(StubGenerator::replying("# Role")).await;
    let (token, _) = signup_and_login(&app.router, "minsu@example.com").await;
    let (other, _) = signup_and_login(&app.router, "jihun@example.com").await;
    let persona_id = common::create_mom_persona(&app.router, &token).await;
    let uri = format!("/api/personas/{}", persona_id);

    let (status, body) = send(&app.router, empty_request("GET", "/api/personas", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "엄마");
    assert!(body[0].get("memo").is_none());

    let (status, _) = send(&app.router, empty_request("GET", &uri, Some(&other))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Blank name keeps the old value; memo is replaced
    let (status, body) = send(
        &app.router,
        json_request("PUT", &uri, Some(&token), json!({ "name": " ", "memo": "요리를 잘함" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "엄마");
    assert_eq!(body["memo"], "요리를 잘함");

    let (status, _) = send(&app.router, empty_request("DELETE", &uri, Some(&other))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, empty_request("DELETE", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app.router, empty_request("GET", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app.router, empty_request("GET", "/api/personas", Some(&token))).await;
    assert!(body.as_array().unwrap().is_empty());

    // Soft delete keeps the row and its samples
    assert_eq!(count(&app.pool, "SELECT COUNT(*) FROM personas").await, 1);
    assert_eq!(count(&app.pool, "SELECT COUNT(*) FROM conversation_samples").await, 4);
}
