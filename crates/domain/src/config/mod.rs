mod context;
mod llm;
mod server;
mod store;
mod url_fetch;

pub use context::*;
pub use llm::*;
pub use server::*;
pub use store::*;
pub use url_fetch::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub url_fetch: UrlFetchConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }
        if self.server.cors.allowed_origins.len() == 1 && self.server.cors.allowed_origins[0] == "*" {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        if self.llm.base_url.is_empty() {
            errors.push(ConfigError::error("llm.base_url", "base_url must not be empty"));
        }
        if self.llm.api_key.is_none() && self.llm.api_key_env.is_empty() {
            errors.push(ConfigError::error(
                "llm.api_key_env",
                "set either api_key_env or api_key",
            ));
        }
        if self.llm.api_key.is_some() {
            errors.push(ConfigError::warning(
                "llm.api_key",
                "plaintext API key in config; prefer api_key_env",
            ));
        }
        if !(0.0..=1.0).contains(&self.llm.top_p) {
            errors.push(ConfigError::error("llm.top_p", "top_p must be within [0, 1]"));
        }
        if !(0.0..=2.0).contains(&self.llm.default_temperature) {
            errors.push(ConfigError::error(
                "llm.default_temperature",
                "default_temperature must be within [0, 2]",
            ));
        }
        if self.llm.stream_idle_timeout_secs == 0 {
            errors.push(ConfigError::error(
                "llm.stream_idle_timeout_secs",
                "idle timeout must be greater than 0",
            ));
        }

        if self.context.chat_max_chars == 0 || self.context.agent_context_max_chars == 0 {
            errors.push(ConfigError::error(
                "context",
                "context budgets must be greater than 0",
            ));
        }
        if self.context.truncation_reserve_chars >= self.context.agent_context_max_chars {
            errors.push(ConfigError::warning(
                "context.truncation_reserve_chars",
                "reserve is not smaller than the agent context budget; oversized items will be cut to nothing",
            ));
        }

        errors
    }
}
