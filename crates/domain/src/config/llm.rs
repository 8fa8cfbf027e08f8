use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat-completion provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings for the upstream OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider identifier used in logs and error messages.
    #[serde(default = "d_provider_id")]
    pub provider_id: String,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Plaintext API key (takes precedence over `api_key_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "d_model")]
    pub default_model: String,
    #[serde(default = "d_temperature")]
    pub default_temperature: f64,
    #[serde(default = "d_top_p")]
    pub top_p: f64,
    #[serde(default = "d_max_tokens")]
    pub max_tokens: u32,
    /// Connect + whole-response timeout for buffered calls.
    #[serde(default = "d_120")]
    pub request_timeout_secs: u64,
    /// Maximum silence between two streamed chunks.
    #[serde(default = "d_60")]
    pub stream_idle_timeout_secs: u64,
    /// Upper bound on a whole function-handling dispatch.
    #[serde(default = "d_300")]
    pub stream_total_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_id: d_provider_id(),
            base_url: d_base_url(),
            api_key_env: d_api_key_env(),
            api_key: None,
            default_model: d_model(),
            default_temperature: d_temperature(),
            top_p: d_top_p(),
            max_tokens: d_max_tokens(),
            request_timeout_secs: 120,
            stream_idle_timeout_secs: 60,
            stream_total_timeout_secs: 300,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_provider_id() -> String {
    "gemini".into()
}
fn d_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".into()
}
fn d_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn d_model() -> String {
    crate::agent::DEFAULT_MODEL.into()
}
fn d_temperature() -> f64 {
    crate::temperature::DEFAULT_TEMPERATURE
}
fn d_top_p() -> f64 {
    0.95
}
fn d_max_tokens() -> u32 {
    4096
}
fn d_120() -> u64 {
    120
}
fn d_60() -> u64 {
    60
}
fn d_300() -> u64 {
    300
}
