use serde::Serialize;

/// Structured trace events emitted across all ytmind crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ContextBuilt {
        agent_id: String,
        budget_chars: usize,
        total_chars: usize,
        documents_included: usize,
        documents_considered: usize,
        urls_included: usize,
        urls_considered: usize,
        truncated: bool,
    },
    GroundingFetchFailed {
        agent_id: String,
        kind: String,
        error: String,
    },
    LlmRequest {
        provider: String,
        model: String,
        streaming: bool,
        tools: usize,
        messages: usize,
    },
    FunctionDropped {
        name: String,
    },
    FunctionCallDispatched {
        name: String,
        ok: bool,
        duration_ms: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "ym_event");
    }
}
