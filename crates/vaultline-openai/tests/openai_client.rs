//! OpenAI client tests against an in-process mock of the chat-completions
//! endpoint.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use serde_json::{Value, json};
use vaultline_core::models::message::Message;
use vaultline_openai::client::{OpenAiClient, OpenAiConfig};
use vaultline_openai::completion::{CompletionEvent, CompletionService, collect_stream};
use vaultline_openai::error::CompletionError;
use vaultline_openai::request::GenerationRequest;

const GOOD_KEY: &str = "sk-test-good";
const FRAGMENTS: [&str; 4] = ["DeFi ", "means ", "decentralized ", "finance."];

async fn mock_completions(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match auth.strip_prefix("Bearer ") {
        Some(GOOD_KEY) => {}
        Some("sk-test-quota") => {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": { "message": "You exceeded your current quota" } })),
            )
                .into_response();
        }
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": { "message": "Incorrect API key provided" } })),
            )
                .into_response();
        }
    }

    if body["stream"] == true {
        let mut sse = String::new();
        for fragment in FRAGMENTS {
            let chunk = json!({ "choices": [{ "index": 0, "delta": { "content": fragment } }] });
            sse.push_str(&format!("data: {chunk}\n\n"));
        }
        let last = json!({ "choices": [{ "index": 0, "delta": {}, "finish_reason": "stop" }] });
        sse.push_str(&format!("data: {last}\n\n"));
        let usage = json!({
            "choices": [],
            "usage": { "prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16 }
        });
        sse.push_str(&format!("data: {usage}\n\ndata: [DONE]\n\n"));
        return ([("content-type", "text/event-stream")], sse).into_response();
    }

    Json(json!({
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": FRAGMENTS.concat() },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16 }
    }))
    .into_response()
}

async fn spawn_mock() -> SocketAddr {
    let app = Router::new().route("/v1/chat/completions", post(mock_completions));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> OpenAiClient {
    OpenAiClient::new(OpenAiConfig {
        base_url: format!("http://{addr}/v1/"),
        connect_timeout: Duration::from_secs(2),
        ..OpenAiConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn streams_deltas_in_order_then_finish() {
    let client = client_for(spawn_mock().await);
    let request = GenerationRequest::chat(vec![Message::user("What is DeFi?")]);

    let stream = client.stream_chat(GOOD_KEY, &request).await.unwrap();
    let events: Vec<_> = stream.map(|e| e.unwrap()).collect().await;

    let deltas: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            CompletionEvent::TextDelta(t) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(deltas, FRAGMENTS);

    match events.last().unwrap() {
        CompletionEvent::Finish {
            finish_reason,
            usage,
        } => {
            assert_eq!(finish_reason, "stop");
            assert_eq!(usage.unwrap().total_tokens, 16);
        }
        other => panic!("expected finish event, got {other:?}"),
    }
}

#[tokio::test]
async fn streamed_text_matches_non_streamed_text() {
    let client = client_for(spawn_mock().await);
    let request = GenerationRequest::chat(vec![Message::user("What is DeFi?")]);

    let streamed = collect_stream(client.stream_chat(GOOD_KEY, &request).await.unwrap())
        .await
        .unwrap();
    let full = client.generate(GOOD_KEY, &request).await.unwrap();

    assert_eq!(streamed.text, full.text);
    assert_eq!(streamed.usage, full.usage);
}

#[tokio::test]
async fn rejected_credential_fails_before_streaming() {
    let client = client_for(spawn_mock().await);
    let request = GenerationRequest::chat(vec![Message::user("hi")]);

    let err = match client.stream_chat("sk-test-wrong", &request).await {
        Ok(_) => panic!("stream should not open with a rejected credential"),
        Err(e) => e,
    };
    match &err {
        CompletionError::Status { status, message } => {
            assert_eq!(*status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn quota_error_carries_status_code() {
    let client = client_for(spawn_mock().await);

    let err = client
        .generate("sk-test-quota", &GenerationRequest::probe())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr)
        .generate(GOOD_KEY, &GenerationRequest::probe())
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::Transport(_)));
}
