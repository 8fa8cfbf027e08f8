use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use ym_contextpack::ContextAssembler;
use ym_domain::config::Config;
use ym_domain::error::Result;
use ym_functions::FunctionRegistry;
use ym_providers::{GenerationDefaults, LlmProvider, ProviderAdapter};
use ym_store::Store;

use crate::extract::UrlExtractor;

/// Shared application state passed to all API handlers.
///
/// Nothing in here is mutated per request: the registry and assemblers are
/// immutable, and the store does its own locking.
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub functions: Arc<FunctionRegistry>,
    pub llm: Arc<ProviderAdapter>,

    // ── Grounding ─────────────────────────────────────────────────────
    /// Budget used by the chat route.
    pub chat_context: Arc<ContextAssembler>,
    /// Budget used by the standalone context endpoint.
    pub agent_context: Arc<ContextAssembler>,
    pub extractor: Arc<UrlExtractor>,

    // ── Runtime ───────────────────────────────────────────────────────
    /// Cancelled on shutdown; every provider stream watches a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the state from already-built collaborators.
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn Store>,
        provider: Arc<dyn LlmProvider>,
        functions: Arc<FunctionRegistry>,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        let llm = ProviderAdapter::new(
            provider,
            functions.clone(),
            GenerationDefaults::from_config(&config.llm),
        );
        let ctx = &config.context;

        Ok(Self {
            store,
            functions,
            llm: Arc::new(llm),
            chat_context: Arc::new(ContextAssembler::new(
                ctx.chat_max_chars,
                ctx.truncation_reserve_chars,
            )),
            agent_context: Arc::new(ContextAssembler::new(
                ctx.agent_context_max_chars,
                ctx.truncation_reserve_chars,
            )),
            extractor: Arc::new(UrlExtractor::from_config(&config.url_fetch)?),
            shutdown,
            config,
        })
    }
}
