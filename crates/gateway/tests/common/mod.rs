//! Shared fixtures for gateway integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use ym_domain::agent::{Agent, AgentCategory, AgentPatch, NewAgent};
use ym_domain::chat::{Chat, NewChat};
use ym_domain::config::Config;
use ym_domain::error::{Error, Result};
use ym_domain::grounding::{GroundingDocument, GroundingUrl, NewDocument};
use ym_domain::message::Message;
use ym_domain::stream::{BoxStream, StreamEvent};
use ym_functions::default_registry;
use ym_gateway::api;
use ym_gateway::state::AppState;
use ym_providers::{ChatRequest, ChatResponse, LlmProvider};
use ym_store::{JsonStore, Store};

// ── Scripted provider ──────────────────────────────────────────────

/// Replays a fixed list of stream events and records every request.
#[derive(Default)]
pub struct ScriptedProvider {
    events: Vec<StreamEvent>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(events: Vec<StreamEvent>) -> Arc<Self> {
        Arc::new(Self {
            events,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().push(req.clone());
        let content = self
            .events
            .iter()
            .map(StreamEvent::content_delta)
            .collect::<String>();
        Ok(ChatResponse {
            content,
            usage: None,
            model: "scripted".into(),
            finish_reason: Some("stop".into()),
        })
    }

    async fn chat_stream(
        &self,
        req: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        self.requests.lock().push(req.clone());
        let events: Vec<Result<StreamEvent>> = self.events.iter().cloned().map(Ok).collect();
        Ok(Box::pin(futures_util::stream::iter(events)))
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}

pub fn token(text: &str) -> StreamEvent {
    StreamEvent::Token { text: text.into() }
}

pub fn call_fragment(
    index: u32,
    id: Option<&str>,
    name: Option<&str>,
    arguments: Option<&str>,
) -> StreamEvent {
    StreamEvent::ToolCallDelta {
        index,
        call_id: id.map(str::to_string),
        kind: id.map(|_| "function".to_string()),
        name: name.map(str::to_string),
        arguments: arguments.map(str::to_string),
    }
}

pub fn done(reason: &str) -> StreamEvent {
    StreamEvent::Done {
        usage: None,
        finish_reason: Some(reason.into()),
    }
}

// ── Store whose document listing always fails ──────────────────────

pub struct FailingDocuments {
    pub inner: JsonStore,
}

#[async_trait::async_trait]
impl Store for FailingDocuments {
    async fn list_agents(&self, category: Option<AgentCategory>) -> Result<Vec<Agent>> {
        self.inner.list_agents(category).await
    }
    async fn find_agent(&self, id: &str) -> Result<Agent> {
        self.inner.find_agent(id).await
    }
    async fn create_agent(&self, new: NewAgent) -> Result<Agent> {
        self.inner.create_agent(new).await
    }
    async fn update_agent(&self, id: &str, patch: AgentPatch) -> Result<Agent> {
        self.inner.update_agent(id, patch).await
    }
    async fn delete_agent(&self, id: &str) -> Result<()> {
        self.inner.delete_agent(id).await
    }
    async fn list_documents(&self, _agent_id: &str) -> Result<Vec<GroundingDocument>> {
        Err(Error::Store("documents collection unavailable".into()))
    }
    async fn find_document(&self, id: &str) -> Result<GroundingDocument> {
        self.inner.find_document(id).await
    }
    async fn create_document(&self, agent_id: &str, new: NewDocument) -> Result<GroundingDocument> {
        self.inner.create_document(agent_id, new).await
    }
    async fn delete_document(&self, agent_id: &str, id: &str) -> Result<()> {
        self.inner.delete_document(agent_id, id).await
    }
    async fn list_urls(&self, agent_id: &str) -> Result<Vec<GroundingUrl>> {
        self.inner.list_urls(agent_id).await
    }
    async fn find_url(&self, id: &str) -> Result<GroundingUrl> {
        self.inner.find_url(id).await
    }
    async fn create_url(&self, agent_id: &str, url: String, content: String) -> Result<GroundingUrl> {
        self.inner.create_url(agent_id, url, content).await
    }
    async fn delete_url(&self, agent_id: &str, id: &str) -> Result<()> {
        self.inner.delete_url(agent_id, id).await
    }
    async fn list_chats(&self) -> Result<Vec<Chat>> {
        self.inner.list_chats().await
    }
    async fn find_chat(&self, id: &str) -> Result<Chat> {
        self.inner.find_chat(id).await
    }
    async fn create_chat(&self, new: NewChat) -> Result<Chat> {
        self.inner.create_chat(new).await
    }
    async fn append_message(&self, chat_id: &str, message: Message) -> Result<Chat> {
        self.inner.append_message(chat_id, message).await
    }
    async fn delete_chat(&self, id: &str) -> Result<()> {
        self.inner.delete_chat(id).await
    }
}

// ── App wiring ─────────────────────────────────────────────────────

pub fn app_state(store: Arc<dyn Store>, provider: Arc<ScriptedProvider>) -> AppState {
    AppState::new(
        Arc::new(Config::default()),
        store,
        provider,
        Arc::new(default_registry()),
        CancellationToken::new(),
    )
    .unwrap()
}

pub fn app(state: AppState) -> Router {
    api::router().with_state(state)
}

pub fn new_agent(name: &str) -> NewAgent {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "description": "test agent",
        "systemPrompt": "You are a test agent.",
    }))
    .unwrap()
}

// ── Request helpers ────────────────────────────────────────────────

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>, Option<String>) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, bytes.to_vec(), content_type)
}

pub async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes, _) = send(app, method, uri, body).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
