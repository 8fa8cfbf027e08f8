//! Agent endpoints: CRUD, function assignment and the standalone context
//! builder.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use ym_domain::agent::{Agent, AgentCategory, AgentPatch, NewAgent};
use ym_domain::message::Message;
use ym_domain::temperature::Temperature;
use ym_domain::tool::ToolDefinition;

use crate::api::error::{ApiError, ApiResult};
use crate::runtime::context;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/agents
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct ListAgentsQuery {
    #[serde(default)]
    pub category: Option<String>,
}

pub async fn list_agents(
    State(state): State<AppState>,
    Query(q): Query<ListAgentsQuery>,
) -> ApiResult<impl IntoResponse> {
    let category = match q.category.as_deref().filter(|c| !c.is_empty()) {
        Some(c) => Some(c.parse::<AgentCategory>()?),
        None => None,
    };
    let agents = state.store.list_agents(category).await?;
    Ok(Json(json!({ "agents": agents })))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CRUD by id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let agent = state.store.find_agent(&id).await?;
    Ok(Json(json!({ "agent": agent })))
}

pub async fn create_agent(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Response> {
    let mut body = into_object(body)?;
    let temperature = take_temperature(&mut body)?;
    let mut new: NewAgent = serde_json::from_value(Value::Object(body))
        .map_err(|e| ApiError::validation(format!("invalid agent: {e}")))?;
    new.temperature = temperature;
    new.is_default = false;

    if let Some(resp) = reject_unknown_functions(&state, &new.functions) {
        return Ok(resp);
    }

    let agent = state.store.create_agent(new).await?;
    tracing::info!(agent_id = %agent.id, name = %agent.name, "agent created");
    Ok((StatusCode::CREATED, Json(json!({ "agent": agent }))).into_response())
}

pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Response> {
    let mut body = into_object(body)?;
    let temperature = take_temperature(&mut body)?;
    let mut patch: AgentPatch = serde_json::from_value(Value::Object(body))
        .map_err(|e| ApiError::validation(format!("invalid agent update: {e}")))?;
    patch.temperature = temperature;

    if let Some(functions) = &patch.functions {
        if let Some(resp) = reject_unknown_functions(&state, functions) {
            return Ok(resp);
        }
    }

    let agent = state.store.update_agent(&id, patch).await?;
    tracing::info!(agent_id = %agent.id, "agent updated");
    Ok(Json(json!({ "agent": agent })).into_response())
}

pub async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.store.delete_agent(&id).await?;
    tracing::info!(agent_id = %id, "agent deleted");
    Ok(Json(json!({ "message": "Agent deleted successfully" })))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// /api/agents/:id/functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The agent's functions, resolved against the registry where possible.
pub async fn list_agent_functions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let agent = state.store.find_agent(&id).await?;
    let functions: Vec<ToolDefinition> = agent
        .functions
        .into_iter()
        .map(|f| state.functions.get(&f.name).cloned().unwrap_or(f))
        .collect();
    Ok(Json(json!({ "functions": functions })))
}

#[derive(Debug, Deserialize)]
pub struct AssignFunctionsBody {
    #[serde(default)]
    pub functions: Value,
}

pub async fn assign_agent_functions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AssignFunctionsBody>,
) -> ApiResult<Response> {
    let Value::Array(items) = body.functions else {
        return Err(ApiError::validation("functions must be an array"));
    };
    let names = items
        .iter()
        .map(|v| {
            v.as_str()
                .or_else(|| v.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .ok_or_else(|| ApiError::validation("functions must contain function names"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let definitions: Vec<ToolDefinition> = names.into_iter().map(ToolDefinition::named).collect();

    if let Some(resp) = reject_unknown_functions(&state, &definitions) {
        return Ok(resp);
    }

    let patch = AgentPatch {
        functions: Some(definitions),
        ..Default::default()
    };
    let agent = state.store.update_agent(&id, patch).await?;
    tracing::info!(agent_id = %agent.id, functions = ?agent.function_names(), "functions assigned");
    Ok(Json(json!({
        "message": "Functions assigned successfully",
        "agent": function_summary(&agent),
    }))
    .into_response())
}

pub async fn clear_agent_functions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let patch = AgentPatch {
        functions: Some(Vec::new()),
        ..Default::default()
    };
    let agent = state.store.update_agent(&id, patch).await?;
    tracing::info!(agent_id = %agent.id, "functions cleared");
    Ok(Json(json!({
        "message": "Functions removed successfully",
        "agent": function_summary(&agent),
    })))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/agents/:id/context
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct ContextQuery {
    /// Optional user query used for relevance ranking.
    #[serde(default)]
    pub query: Option<String>,
}

/// Run the standalone context builder (agent-context budget) and return
/// the block together with its build report.
pub async fn agent_context(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<ContextQuery>,
) -> ApiResult<impl IntoResponse> {
    let agent = state.store.find_agent(&id).await?;
    let messages: Vec<Message> = q
        .query
        .filter(|s| !s.trim().is_empty())
        .map(Message::user)
        .into_iter()
        .collect();

    let (context, report) =
        context::ground(state.store.as_ref(), &state.agent_context, &agent.id, &messages).await;
    Ok(Json(json!({ "context": context, "report": report })))
}

// ── Helpers ────────────────────────────────────────────────────────

fn into_object(body: Value) -> Result<Map<String, Value>, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::validation("request body must be a JSON object")),
    }
}

/// Pull `temperature` out of a raw body so numeric strings are accepted
/// and anything non-numeric is a 400 rather than a decode failure.
fn take_temperature(body: &mut Map<String, Value>) -> Result<Option<Temperature>, ApiError> {
    match body.remove("temperature") {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => Ok(Some(Temperature::from_json(&raw)?)),
    }
}

/// 400 `{ error, invalidFunctions }` when any requested function is not in
/// the registry.
fn reject_unknown_functions(state: &AppState, functions: &[ToolDefinition]) -> Option<Response> {
    let invalid = state
        .functions
        .unknown(functions.iter().map(|f| f.name.as_str()));
    if invalid.is_empty() {
        return None;
    }
    tracing::debug!(invalid = ?invalid, "rejecting unknown functions");
    Some(
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Some functions do not exist",
                "invalidFunctions": invalid,
            })),
        )
            .into_response(),
    )
}

fn function_summary(agent: &Agent) -> Value {
    json!({
        "id": agent.id,
        "name": agent.name,
        "functions": agent.function_names(),
    })
}
