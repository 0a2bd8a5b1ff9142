//! Gateway router tests against a scripted upstream

mod helpers;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use helpers::FakeUpstream;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use vibe_gateway::{build_router, AppState};

fn app(upstream: &Arc<FakeUpstream>) -> Router {
    build_router(AppState {
        upstream: upstream.clone(),
        default_voice: "Arista-PlayAI".to_string(),
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, bytes)
}

async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn get(app: Router, path: &str) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(app, request).await
}

fn chat_body() -> Value {
    json!({
        "messages": [
            { "role": "assistant", "content": "Yo! I'm Vibe." },
            { "role": "user", "content": "what's an h1?" }
        ],
        "systemPrompt": "You are Vibe.",
        "currentCode": "<h1>hi</h1>"
    })
}

fn validate_body() -> Value {
    json!({
        "code": "<h1>Nova</h1>",
        "lesson": {
            "id": 1,
            "title": "The Hello World",
            "objective": "Create an <h1> tag with your name.",
            "validationCriteria": "Must contain an h1 element",
            "validationToken": "<h1",
            "xpReward": 100
        }
    })
}

#[tokio::test]
async fn test_health() {
    let upstream = FakeUpstream::new();
    let (status, _, bytes) = get(app(&upstream), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["module"], "vibe-gateway");
}

#[tokio::test]
async fn test_chat_prepends_persona_with_code() {
    let upstream = FakeUpstream::new();
    upstream.reply(Some("an h1 is the main headline, fr"));

    let (status, body) = post_json(app(&upstream), "/api/chat", chat_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "an h1 is the main headline, fr");

    let request = &upstream.completions()[0];
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[0].role, "system");
    assert_eq!(
        request.messages[0].content,
        "You are Vibe.\n[CURRENT CODE]:\n```html\n<h1>hi</h1>\n```"
    );
    assert_eq!(request.messages[2].content, "what's an h1?");
    assert_eq!(request.temperature, 1.0);
    assert_eq!(request.max_tokens, Some(150));
    assert!(!request.json_output);
}

#[tokio::test]
async fn test_chat_empty_reply_uses_fallback() {
    let upstream = FakeUpstream::new();
    upstream.reply(None);

    let (status, body) = post_json(app(&upstream), "/api/chat", chat_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "My brain glitched 💀 Try again?");
}

#[tokio::test]
async fn test_chat_upstream_failure_is_500() {
    let upstream = FakeUpstream::new();
    upstream.fail_completion("overloaded");

    let (status, body) = post_json(app(&upstream), "/api/chat", chat_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("overloaded"));
}

#[tokio::test]
async fn test_validate_returns_parsed_verdict() {
    let upstream = FakeUpstream::new();
    upstream.reply(Some(r#"{"passed": true, "feedback": "Clean h1, we love to see it."}"#));

    let (status, body) = post_json(app(&upstream), "/api/validate", validate_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["passed"], true);
    assert_eq!(body["feedback"], "Clean h1, we love to see it.");

    let request = &upstream.completions()[0];
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].role, "user");
    assert!(request.messages[0].content.contains("Create an <h1> tag with your name."));
    assert!(request.messages[0].content.contains("<h1>Nova</h1>"));
    assert_eq!(request.temperature, 0.5);
    assert!(request.json_output);
}

#[tokio::test]
async fn test_validate_garbage_is_verdict_shaped_500() {
    let upstream = FakeUpstream::new();
    upstream.reply(Some("looks good to me!"));

    let (status, body) = post_json(app(&upstream), "/api/validate", validate_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["passed"], false);
    assert_eq!(body["feedback"], "My brain glitched checking that. Try again?");
}

#[tokio::test]
async fn test_validate_upstream_failure_is_verdict_shaped_500() {
    let upstream = FakeUpstream::new();
    upstream.fail_completion("timeout");

    let (status, body) = post_json(app(&upstream), "/api/validate", validate_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["passed"], false);
}

#[tokio::test]
async fn test_tts_requires_text() {
    let upstream = FakeUpstream::new();
    let (status, _, bytes) = get(app(&upstream), "/api/tts").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Text is required");
    assert!(upstream.speech_calls().is_empty());
}

#[tokio::test]
async fn test_tts_returns_cacheable_audio() {
    let upstream = FakeUpstream::new();
    upstream.audio(b"ID3fake-mp3");

    let (status, headers, bytes) = get(app(&upstream), "/api/tts?text=yo%20fam").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=31536000, immutable");
    assert_eq!(&bytes[..], b"ID3fake-mp3");
    assert_eq!(
        upstream.speech_calls(),
        vec![("yo fam".to_string(), "Arista-PlayAI".to_string())]
    );
}

#[tokio::test]
async fn test_tts_honours_requested_voice() {
    let upstream = FakeUpstream::new();
    upstream.audio(b"mp3");

    get(app(&upstream), "/api/tts?text=hi&voice=Fritz-PlayAI").await;
    assert_eq!(upstream.speech_calls()[0].1, "Fritz-PlayAI");
}

#[tokio::test]
async fn test_tts_empty_audio_is_500() {
    let upstream = FakeUpstream::new();
    upstream.audio(b"");

    let (status, _, bytes) = get(app(&upstream), "/api/tts?text=hi").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "TTS produced no audio");
}

#[tokio::test]
async fn test_tts_upstream_failure_is_500() {
    let upstream = FakeUpstream::new();
    upstream.fail_speech("connection reset");

    let (status, _, _) = get(app(&upstream), "/api/tts?text=hi").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
