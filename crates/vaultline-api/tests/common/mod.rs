//! Shared fixtures: a scripted completion service that counts outbound
//! calls, and helpers for driving the router in-process.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header::CONTENT_TYPE};
use futures::stream;
use serde_json::Value;
use tower::ServiceExt;
use vaultline_api::state::AppState;
use vaultline_core::credential::{CredentialSource, StaticCredential};
use vaultline_core::models::usage::TokenUsage;
use vaultline_openai::completion::{
    CompletionEvent, CompletionService, CompletionStream, Generation,
};
use vaultline_openai::error::CompletionError;
use vaultline_openai::request::GenerationRequest;

pub const TEST_KEY: &str = "sk-proj-test-0123456789abcdefghij";

/// What the fake completion service does when called.
#[derive(Clone)]
pub enum Script {
    /// Answer with these fragments, in order.
    Reply(Vec<String>),
    /// Fail before any fragment with this upstream error text.
    Reject { status: u16, message: String },
    /// Emit these fragments, then fail mid-stream.
    BreakAfter(Vec<String>, String),
}

#[derive(Clone)]
pub struct FakeCompletions {
    script: Script,
    calls: Arc<AtomicUsize>,
    last_request: Arc<std::sync::Mutex<Option<GenerationRequest>>>,
}

impl FakeCompletions {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    pub fn replying(fragments: &[&str]) -> Self {
        Self::new(Script::Reply(
            fragments.iter().map(|f| f.to_string()).collect(),
        ))
    }

    pub fn rejecting(status: u16, message: &str) -> Self {
        Self::new(Script::Reject {
            status,
            message: message.to_string(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn record(&self, request: &GenerationRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
    }

    fn usage() -> TokenUsage {
        TokenUsage::new(11, 7)
    }
}

#[async_trait]
impl CompletionService for FakeCompletions {
    async fn stream_chat(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<CompletionStream, CompletionError> {
        assert!(!credential.is_empty(), "outbound call without a credential");
        self.record(request);

        let events: Vec<Result<CompletionEvent, CompletionError>> = match &self.script {
            Script::Reply(fragments) => fragments
                .iter()
                .cloned()
                .map(|f| Ok(CompletionEvent::TextDelta(f)))
                .chain([Ok(CompletionEvent::Finish {
                    finish_reason: "stop".to_string(),
                    usage: Some(Self::usage()),
                })])
                .collect(),
            Script::Reject { status, message } => {
                return Err(CompletionError::Status {
                    status: *status,
                    message: message.clone(),
                });
            }
            Script::BreakAfter(fragments, message) => fragments
                .iter()
                .cloned()
                .map(|f| Ok(CompletionEvent::TextDelta(f)))
                .chain([Err(CompletionError::Decode(message.clone()))])
                .collect(),
        };
        Ok(Box::pin(stream::iter(events)))
    }

    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Generation, CompletionError> {
        assert!(!credential.is_empty(), "outbound call without a credential");
        self.record(request);

        match &self.script {
            Script::Reply(fragments) => Ok(Generation {
                text: fragments.concat(),
                finish_reason: Some("stop".to_string()),
                usage: Some(Self::usage()),
            }),
            Script::Reject { status, message } => Err(CompletionError::Status {
                status: *status,
                message: message.clone(),
            }),
            Script::BreakAfter(_, message) => Err(CompletionError::Decode(message.clone())),
        }
    }
}

pub fn app_with(fake: &FakeCompletions, credentials: impl CredentialSource + 'static) -> Router {
    vaultline_api::router(AppState::new(fake.clone(), credentials, "test"))
}

pub fn configured_app(fake: &FakeCompletions) -> Router {
    app_with(fake, StaticCredential::new(TEST_KEY))
}

pub fn unconfigured_app(fake: &FakeCompletions) -> Router {
    app_with(fake, StaticCredential::missing())
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Response<Body>) {
    let resp = app.oneshot(req).await.unwrap();
    (resp.status(), resp)
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response<Body>) -> Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}
