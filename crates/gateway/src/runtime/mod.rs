//! The chat pipeline: grounding, provider call, and either the stream
//! relay or the function-call dispatcher.

pub mod answer;
pub mod context;
pub mod dispatch;
pub mod guard;
pub mod relay;

use std::time::{Duration, Instant};

use futures_core::Stream;
use ym_domain::error::{Error, Result};
use ym_domain::message::{Message, Role};
use ym_domain::temperature::Temperature;
use ym_domain::trace::TraceEvent;
use ym_functions::FunctionExecutor;
use ym_providers::CallOptions;

use crate::state::AppState;
use dispatch::Outcome;
use guard::StreamGuard;

/// A validated chat request.
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    pub messages: Vec<Message>,
    pub agent_id: Option<String>,
    pub temperature: Option<Temperature>,
    pub model: Option<String>,
}

/// Messages and call options ready for the provider.
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    pub messages: Vec<Message>,
    pub options: CallOptions,
}

/// Resolve the agent (if any), ground the conversation and merge options.
///
/// Request-level temperature and model win over the agent's. An unknown
/// agent is `Error::NotFound`; grounding problems only degrade the context.
pub async fn prepare_turn(state: &AppState, req: TurnRequest) -> Result<PreparedTurn> {
    let mut messages = req.messages;
    let mut options = CallOptions {
        temperature: req.temperature,
        model: req.model.filter(|m| !m.trim().is_empty()),
        functions: Vec::new(),
    };

    if let Some(agent_id) = req.agent_id.as_deref() {
        let agent = state.store.find_agent(agent_id).await?;

        if !agent.system_prompt.trim().is_empty()
            && !messages.iter().any(|m| m.role == Role::System)
        {
            messages.insert(0, Message::system(agent.system_prompt.clone()));
        }

        let (block, report) = context::ground(
            state.store.as_ref(),
            &state.chat_context,
            &agent.id,
            &messages,
        )
        .await;
        tracing::debug!(
            agent_id = %agent.id,
            context_chars = report.context_chars,
            documents = report.documents_included(),
            urls = report.urls_included(),
            "conversation grounded"
        );
        context::inject(&mut messages, block);

        options.temperature = options.temperature.or(Some(agent.temperature));
        options.model = options.model.or(Some(agent.model));
        options.functions = agent.functions;
    }

    Ok(PreparedTurn { messages, options })
}

fn stream_guard(state: &AppState) -> StreamGuard {
    StreamGuard::new(
        state.shutdown.child_token(),
        Duration::from_secs(state.config.llm.stream_idle_timeout_secs),
    )
}

/// Streaming mode: text chunks in provider order.
pub async fn stream_turn(
    state: &AppState,
    turn: PreparedTurn,
) -> Result<impl Stream<Item = std::result::Result<String, Error>> + Send + 'static> {
    let upstream = state.llm.chat_stream(&turn.messages, &turn.options).await?;
    Ok(relay::relay(guard::spawn_pump(upstream, stream_guard(state))))
}

/// Function-handling mode: consume the whole stream, execute at most one
/// function call, and return the outcome. Bounded by the total timeout.
pub async fn dispatch_turn(state: &AppState, turn: PreparedTurn) -> Result<Outcome> {
    let total = Duration::from_secs(state.config.llm.stream_total_timeout_secs);

    let run = async {
        let upstream = state.llm.chat_stream(&turn.messages, &turn.options).await?;
        let rx = guard::spawn_pump(upstream, stream_guard(state));
        let functions = state.functions.clone();

        dispatch::dispatch(rx, |call| async move {
            let started = Instant::now();
            let result = functions.execute(&call.name, call.arguments.clone()).await;
            TraceEvent::FunctionCallDispatched {
                name: call.name.clone(),
                ok: result.is_ok(),
                duration_ms: started.elapsed().as_millis() as u64,
            }
            .emit();
            result
        })
        .await
    };

    match tokio::time::timeout(total, run).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(total_secs = total.as_secs(), "function dispatch timed out");
            Err(Error::Timeout(format!(
                "function dispatch exceeded {}s",
                total.as_secs()
            )))
        }
    }
}
