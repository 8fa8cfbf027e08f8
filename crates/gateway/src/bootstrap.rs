//! AppState construction extracted from `main.rs`.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use ym_domain::agent::{AgentCategory, NewAgent};
use ym_domain::config::{Config, ConfigSeverity};
use ym_functions::default_registry;
use ym_providers::OpenAiCompatProvider;
use ym_store::JsonStore;

use crate::state::AppState;

/// Validate config, open the store, seed the built-in agents and return a
/// fully-wired [`AppState`].
pub async fn build_app_state(
    config: Arc<Config>,
    shutdown: CancellationToken,
) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Store ────────────────────────────────────────────────────────
    let store = JsonStore::open(&config.store.state_path).with_context(|| {
        format!("opening store at {}", config.store.state_path.display())
    })?;
    for agent in default_agents() {
        if let Some(seeded) = store.seed_agent(agent).context("seeding default agents")? {
            tracing::info!(agent_id = %seeded.id, name = %seeded.name, "default agent seeded");
        }
    }

    // ── Functions ────────────────────────────────────────────────────
    let functions = Arc::new(default_registry());
    tracing::info!(functions = ?functions.names(), "function registry ready");

    // ── LLM provider ─────────────────────────────────────────────────
    let provider = OpenAiCompatProvider::from_config(&config.llm)
        .context("initializing LLM provider")?;
    tracing::info!(
        provider = %config.llm.provider_id,
        base_url = %config.llm.base_url,
        model = %config.llm.default_model,
        "LLM provider ready"
    );

    AppState::new(
        config.clone(),
        Arc::new(store),
        Arc::new(provider),
        functions,
        shutdown,
    )
    .context("building app state")
}

/// Agents every installation starts with. They cannot be edited or
/// deleted through the API.
pub fn default_agents() -> Vec<NewAgent> {
    vec![NewAgent {
        name: "General Assistant".into(),
        description: "Answers general questions and can tell the current date and time.".into(),
        system_prompt: "You are a helpful assistant. Answer clearly and concisely, \
                        and say so when you do not know something."
            .into(),
        temperature: None,
        model: None,
        functions: vec![ym_domain::tool::ToolDefinition::named(ym_functions::date::NAME)],
        icon: None,
        category: Some(AgentCategory::General),
        is_default: true,
    }]
}
