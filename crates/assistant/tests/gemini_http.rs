//! Gemini backend against a local stub of the generateContent endpoint.

use assistant::{AnnotationAssistant, AssistantConfig, AssistantError, GeminiAssistant};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use media_io::EncodedImage;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Captured {
    action: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn generate(
    State(stub): State<Stub>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.captured.lock().unwrap().push(Captured {
        action,
        api_key,
        body,
    });
    (stub.status, Json(stub.reply.clone()))
}

/// Serve the stub on an ephemeral port, returning its base URL.
async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        reply,
        captured: captured.clone(),
    };
    let app = Router::new()
        .route("/v1beta/models/:action", post(generate))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), captured)
}

fn assistant_for(base: String) -> GeminiAssistant {
    GeminiAssistant::new(AssistantConfig {
        api_key: "test-key".into(),
        vision_model: "vision-model".into(),
        text_model: "text-model".into(),
        api_base: base,
    })
}

fn reply_with(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
}

#[tokio::test]
async fn analyze_sends_image_and_instruction_to_vision_model() {
    let (base, captured) = spawn_stub(StatusCode::OK, reply_with("  A man opens a door.\n")).await;
    let assistant = assistant_for(base);
    let image = EncodedImage::from_bytes("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0]);

    let text = assistant.analyze_frame(&image).await.unwrap();
    assert_eq!(text, "A man opens a door.");

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let request = &captured[0];
    assert_eq!(request.action, "vision-model:generateContent");
    assert_eq!(request.api_key.as_deref(), Some("test-key"));

    let parts = &request.body["contents"][0]["parts"];
    assert_eq!(request.body["contents"][0]["role"], "user");
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[0]["inlineData"]["data"], image.data.as_str());
    assert_eq!(parts[1]["text"], assistant::DESCRIBE_FRAME_PROMPT);
}

#[tokio::test]
async fn refine_sends_draft_to_text_model() {
    let (base, captured) = spawn_stub(StatusCode::OK, reply_with("A man enters the room.")).await;
    let assistant = assistant_for(base);

    let refined = assistant.refine_note_text("guy come in room").await.unwrap();
    assert_eq!(refined, "A man enters the room.");

    let captured = captured.lock().unwrap();
    assert_eq!(captured[0].action, "text-model:generateContent");
    assert_eq!(
        captured[0].body["contents"][0]["parts"][0]["text"],
        assistant::refine_prompt("guy come in room").as_str()
    );
}

#[tokio::test]
async fn empty_replies_fall_back() {
    let (base, _) = spawn_stub(StatusCode::OK, json!({ "candidates": [] })).await;
    let assistant = assistant_for(base);

    let image = EncodedImage::from_bytes("image/jpeg", &[1]);
    assert_eq!(assistant.analyze_frame(&image).await.unwrap(), "");
    assert_eq!(
        assistant.refine_note_text("keep me").await.unwrap(),
        "keep me"
    );
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let (base, _) = spawn_stub(
        StatusCode::FORBIDDEN,
        json!({ "error": { "message": "API key not valid" } }),
    )
    .await;
    let assistant = assistant_for(base);

    match assistant.refine_note_text("note").await {
        Err(AssistantError::Status { status, body }) => {
            assert_eq!(status, 403);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let assistant = assistant_for(format!("http://{addr}"));
    let err = assistant.refine_note_text("note").await.unwrap_err();
    assert!(matches!(err, AssistantError::Transport(_)));
}
