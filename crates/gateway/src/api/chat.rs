//! POST /api/chat: the chat pipeline entry point.
//!
//! Two response modes:
//! - streaming (default): `text/plain; charset=utf-8`, chunked, one write per
//!   content delta in provider order
//! - `handleFunctions: true`: a single JSON body from the function-call
//!   dispatcher

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use ym_domain::error::Error;
use ym_domain::message::{Message, Role};
use ym_domain::temperature::Temperature;

use crate::api::error::{ApiError, ApiResult};
use crate::runtime::{self, answer, dispatch::Outcome, TurnRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default)]
    pub messages: Value,
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Kept raw so non-numeric input is rejected here, before the provider.
    #[serde(default)]
    pub temperature: Option<Value>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub handle_functions: bool,
}

pub async fn chat(State(state): State<AppState>, Json(body): Json<ChatBody>) -> ApiResult<Response> {
    let handle_functions = body.handle_functions;
    let request = validate(body)?;

    tracing::debug!(
        messages = request.messages.len(),
        agent_id = request.agent_id.as_deref().unwrap_or(""),
        handle_functions,
        "chat request"
    );

    let turn = runtime::prepare_turn(&state, request).await?;

    if !handle_functions {
        let stream = runtime::stream_turn(&state, turn).await?;
        return Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            Body::from_stream(stream),
        )
            .into_response());
    }

    let outcome = runtime::dispatch_turn(&state, turn).await?;
    Ok(function_response(outcome))
}

/// Turn the raw body into a pipeline request, rejecting bad input with 400.
fn validate(body: ChatBody) -> Result<TurnRequest, ApiError> {
    let items = match body.messages {
        Value::Array(items) if !items.is_empty() => items,
        _ => return Err(ApiError::validation("messages must be a non-empty array")),
    };

    let messages = items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_message(i, item))
        .collect::<Result<Vec<_>, _>>()?;

    let temperature = match body.temperature {
        None | Some(Value::Null) => None,
        Some(raw) => Some(Temperature::from_json(&raw)?),
    };

    Ok(TurnRequest {
        messages,
        agent_id: body.agent_id.filter(|id| !id.trim().is_empty()),
        temperature,
        model: body.model,
    })
}

fn parse_message(index: usize, item: &Value) -> Result<Message, ApiError> {
    let role = item
        .get("role")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::validation(format!("messages[{index}].role is required")))?;
    let role: Role = role.parse()?;
    let content = item
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ApiError::validation(format!("messages[{index}].content must be a string"))
        })?;
    Ok(Message::new(role, content))
}

fn function_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Content { content } => Json(json!({ "response": content })).into_response(),
        Outcome::Executed { call, result, .. } => Json(json!({
            "response": answer::synthesize(&call.name, &result),
            "functionCall": {
                "name": call.name,
                "arguments": call.arguments,
                "result": result,
            },
        }))
        .into_response(),
        Outcome::ExecutionFailed { call, error, .. } => {
            tracing::error!(function = %call.name, error = %error, "function execution failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": execution_error_message(&call.name, &error),
                    "functionCall": {
                        "name": call.name,
                        "arguments": call.arguments,
                    },
                })),
            )
                .into_response()
        }
    }
}

fn execution_error_message(name: &str, error: &Error) -> String {
    match error {
        Error::Function { message, .. } => format!("Error executing function {name}: {message}"),
        other => format!("Error executing function {name}: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(v: Value) -> ChatBody {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn rejects_empty_or_missing_messages() {
        assert!(validate(body(json!({}))).is_err());
        assert!(validate(body(json!({"messages": []}))).is_err());
        assert!(validate(body(json!({"messages": "hi"}))).is_err());
    }

    #[test]
    fn rejects_unknown_roles() {
        let err = validate(body(json!({"messages": [{"role": "tool", "content": "x"}]})))
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rejects_non_numeric_temperature() {
        let err = validate(body(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": "abc"
        })))
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn accepts_numeric_strings_and_clamps() {
        let req = validate(body(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": "3.5",
            "agentId": "  "
        })))
        .unwrap();
        assert_eq!(req.temperature.map(|t| t.value()), Some(2.0));
        assert!(req.agent_id.is_none());
    }
}
