use std::sync::Arc;

use mockito::{Matcher, Server};
use palabra::backend::ContentBackend;
use palabra::content::ContentClient;
use palabra::error::{BackendError, ContentError};
use palabra::gemini::GeminiBackend;
use palabra::locale::Language;
use serde_json::json;

const PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn backend(server: &Server) -> GeminiBackend {
    GeminiBackend::new("test-key", "gemini-2.5-flash", &server.url(), None).unwrap()
}

fn text_response(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn structured_request_sends_schema_and_key() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_response("{\"ok\":true}"))
        .create_async()
        .await;

    let text = backend(&server)
        .generate_structured("prompt", &json!({ "type": "OBJECT" }))
        .await
        .unwrap();

    assert_eq!(text, "{\"ok\":true}");
    mock.assert_async().await;
}

#[tokio::test]
async fn grounded_request_enables_search_tool() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", PATH)
        .match_body(Matcher::PartialJson(json!({
            "tools": [{ "google_search": {} }],
            "contents": [{ "parts": [{ "text": "find the saint" }] }]
        })))
        .with_status(200)
        .with_body(text_response("```json\n{}\n```"))
        .create_async()
        .await;

    let text = backend(&server).generate_grounded("find the saint").await.unwrap();

    assert!(text.starts_with("```json"));
    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_carries_api_message() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", PATH)
        .with_status(429)
        .with_body(json!({ "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" } }).to_string())
        .create_async()
        .await;

    let err = backend(&server).generate_grounded("x").await.unwrap_err();

    match err {
        BackendError::Status { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "Resource has been exhausted");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn blocked_prompt_has_no_candidates() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string())
        .create_async()
        .await;

    let err = backend(&server).generate_structured("x", &json!({})).await.unwrap_err();

    assert!(matches!(err, BackendError::NoCandidates { ref block_reason } if block_reason == "SAFETY"));
}

#[tokio::test]
async fn content_client_over_http_fails_loud_for_readings_and_soft_for_context() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("POST", PATH)
        .with_status(503)
        .with_body("upstream unavailable")
        .expect(2)
        .create_async()
        .await;

    let client = ContentClient::new(Arc::new(backend(&server)));
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();

    let err = client.request_readings(date, Language::Fr).await.unwrap_err();
    assert!(matches!(err, ContentError::Backend(BackendError::Status { status: 503, .. })));

    let context = client.request_context(date, Language::Fr).await;
    assert!(context.news.is_empty());
    assert_eq!(context.saint.name, Language::Fr.strings().saint_placeholder_name);
}
