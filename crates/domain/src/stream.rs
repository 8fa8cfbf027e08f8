use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A boxed async stream, used for LLM streaming responses.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// Events emitted during LLM streaming (provider-agnostic).
///
/// One provider chunk may expand into several events (e.g. a text delta
/// followed by a `Done` carrying the finish reason); their order always
/// matches the order of the fields in the upstream chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// A text token chunk.
    #[serde(rename = "token")]
    Token { text: String },

    /// A fragment of a tool call. Every field is optional: the provider
    /// sends the id/type/name on the first fragment and then streams the
    /// JSON-encoded arguments across many more.
    #[serde(rename = "tool_call_delta")]
    ToolCallDelta {
        index: u32,
        call_id: Option<String>,
        kind: Option<String>,
        name: Option<String>,
        arguments: Option<String>,
    },

    /// Stream is finished (or a choice reported its finish reason).
    #[serde(rename = "done")]
    Done {
        usage: Option<Usage>,
        finish_reason: Option<String>,
    },
}

impl StreamEvent {
    /// The incremental text this event carries; empty for non-text events.
    pub fn content_delta(&self) -> &str {
        match self {
            StreamEvent::Token { text } => text,
            _ => "",
        }
    }
}

/// Token usage for a completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
