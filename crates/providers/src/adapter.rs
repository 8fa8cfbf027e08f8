//! The layer every chat call goes through before reaching a provider.
//!
//! Orders messages (system first), appends the standing directives,
//! resolves agent function references against the registry, and fills in
//! generation defaults.

use std::collections::HashSet;
use std::sync::Arc;

use crate::directives;
use crate::traits::{ChatRequest, LlmProvider};
use ym_domain::config::LlmConfig;
use ym_domain::error::Result;
use ym_domain::message::{Message, Role};
use ym_domain::stream::{BoxStream, StreamEvent};
use ym_domain::temperature::Temperature;
use ym_domain::tool::ToolDefinition;
use ym_domain::trace::TraceEvent;
use ym_functions::FunctionRegistry;

/// Generation parameters used when a call does not override them.
#[derive(Debug, Clone)]
pub struct GenerationDefaults {
    pub model: String,
    pub temperature: Temperature,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl GenerationDefaults {
    pub fn from_config(cfg: &LlmConfig) -> Self {
        Self {
            model: cfg.default_model.clone(),
            temperature: Temperature::new(cfg.default_temperature).unwrap_or_default(),
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
        }
    }
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub temperature: Option<Temperature>,
    pub model: Option<String>,
    /// Functions the model may call, by name (inline schemas are replaced
    /// by the registry's definition).
    pub functions: Vec<ToolDefinition>,
}

pub struct ProviderAdapter {
    provider: Arc<dyn LlmProvider>,
    functions: Arc<FunctionRegistry>,
    defaults: GenerationDefaults,
}

impl ProviderAdapter {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        functions: Arc<FunctionRegistry>,
        defaults: GenerationDefaults,
    ) -> Self {
        Self {
            provider,
            functions,
            defaults,
        }
    }

    pub fn provider_id(&self) -> &str {
        self.provider.provider_id()
    }

    pub fn defaults(&self) -> &GenerationDefaults {
        &self.defaults
    }

    /// Build the provider request for `messages`.
    pub fn prepare(&self, messages: &[Message], opts: &CallOptions) -> ChatRequest {
        let (system, rest): (Vec<&Message>, Vec<&Message>) =
            messages.iter().partition(|m| m.role == Role::System);

        let mut ordered: Vec<Message> = Vec::with_capacity(messages.len() + 2);
        ordered.extend(system.into_iter().map(|m| Message::new(m.role, m.content.clone())));
        ordered.extend(
            directives::missing(messages)
                .into_iter()
                .map(|d| Message::system(d.text)),
        );
        ordered.extend(rest.into_iter().map(|m| Message::new(m.role, m.content.clone())));

        let temperature = opts.temperature.unwrap_or(self.defaults.temperature);
        let model = opts
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.defaults.model.clone());

        ChatRequest {
            messages: ordered,
            tools: self.resolve_tools(&opts.functions),
            temperature: Some(temperature.value()),
            top_p: Some(self.defaults.top_p),
            max_tokens: Some(self.defaults.max_tokens),
            model: Some(model),
        }
    }

    /// Look every reference up in the registry. Unknown names are dropped
    /// with a warning; duplicates collapse to their first occurrence.
    pub fn resolve_tools(&self, refs: &[ToolDefinition]) -> Vec<ToolDefinition> {
        let mut seen = HashSet::new();
        let mut tools = Vec::with_capacity(refs.len());
        for r in refs {
            if !seen.insert(r.name.as_str()) {
                continue;
            }
            match self.functions.get(&r.name) {
                Some(def) => tools.push(def.clone()),
                None => {
                    tracing::warn!(function = %r.name, "function not found in registry; dropping");
                    TraceEvent::FunctionDropped {
                        name: r.name.clone(),
                    }
                    .emit();
                }
            }
        }
        tools
    }

    fn trace_request(&self, req: &ChatRequest, streaming: bool) {
        TraceEvent::LlmRequest {
            provider: self.provider.provider_id().to_string(),
            model: req.model.clone().unwrap_or_default(),
            streaming,
            tools: req.tools.len(),
            messages: req.messages.len(),
        }
        .emit();
    }

    /// Buffered call: the first completion's text.
    pub async fn chat(&self, messages: &[Message], opts: &CallOptions) -> Result<String> {
        let req = self.prepare(messages, opts);
        self.trace_request(&req, false);
        let resp = self.provider.chat(&req).await.map_err(|e| {
            tracing::error!(provider = self.provider.provider_id(), error = %e, "chat call failed");
            e
        })?;
        Ok(resp.content)
    }

    /// Streaming call: raw provider events for the relay or dispatcher.
    pub async fn chat_stream(
        &self,
        messages: &[Message],
        opts: &CallOptions,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        let req = self.prepare(messages, opts);
        self.trace_request(&req, true);
        self.provider.chat_stream(&req).await.map_err(|e| {
            tracing::error!(provider = self.provider.provider_id(), error = %e, "stream call failed");
            e
        })
    }
}
